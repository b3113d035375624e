//! Error types for the Daguerre gallery backend.
//!
//! This crate provides the foundation error types used by the storage layer and
//! the media-serving HTTP surface.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All errors use `#[track_caller]` for automatic location capture
//!
//! Absence of a file, prefix or bucket is always reported as
//! [`StorageErrorKind::NotFound`], whichever backend produced it. Callers test
//! for it with [`StorageError::is_not_found`] or [`DaguerreError::is_not_found`].
//!
//! # Examples
//!
//! ```
//! use daguerre_error::{DaguerreResult, StorageError, StorageErrorKind};
//!
//! fn lookup(path: &str) -> DaguerreResult<u64> {
//!     Err(StorageError::new(StorageErrorKind::NotFound(path.to_string())))?
//! }
//!
//! let err = lookup("/photos/missing.jpg").unwrap_err();
//! assert!(err.is_not_found());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod server;
mod storage;

pub use config::{ConfigError, ConfigErrorKind};
pub use error::{DaguerreError, DaguerreErrorKind, DaguerreResult};
pub use server::{ServerError, ServerErrorKind};
pub use storage::{StorageError, StorageErrorKind, StorageResult};
