//! Uniform file access over the host filesystem and S3-compatible object stores.
//!
//! The rest of the gallery reads media through [`RepositoryReader`] without
//! knowing which backend answers. The object-store backend synthesises
//! directory semantics (existence, listing, stat) from key prefixes.
//!
//! # Backends
//!
//! - [`FileSystemReader`]: direct pass-through to the host filesystem
//! - [`ObjectStoreReader`]: S3-compatible store reached through `object_store`
//!
//! [`Repositories`] decides which one answers a call.
//!
//! # Example
//!
//! ```rust
//! use daguerre_storage::{MemoryBuckets, ObjectStoreReader, RepositoryReader};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let buckets = Arc::new(MemoryBuckets::new());
//! buckets.put("photos", "2024/beach.jpg", b"jpeg bytes".to_vec()).await?;
//!
//! let reader = ObjectStoreReader::new(buckets);
//! let info = reader.stat("/photos/2024/beach.jpg").await?;
//! assert_eq!(info.size(), 10);
//!
//! let folder = reader.stat("/photos/2024").await?;
//! assert!(folder.is_dir());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use daguerre_error::StorageResult;

mod buckets;
mod config;
mod file;
mod filesystem;
mod metadata;
mod object;
mod path;
mod scanner;
mod selector;

pub use buckets::{BucketClient, MemoryBuckets, S3Buckets};
pub use config::{DEFAULT_ENDPOINT, StorageConfig, StorageConfigBuilder, THUMBNAIL_MARKER};
pub use daguerre_error::{StorageError, StorageErrorKind};
pub use file::MediaFile;
pub use filesystem::FileSystemReader;
pub use metadata::{DirEntry, FOLDER_SIZE, FileDescriptor, FileMode};
pub use object::ObjectStoreReader;
pub use path::{PathParts, SEPARATOR, looks_like_file, split, split_bucket};
pub use scanner::{file_exists, is_dir_symlink};
pub use selector::Repositories;

/// Kind of backend behind a [`RepositoryReader`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, derive_more::Display)]
pub enum BackendKind {
    /// Host filesystem
    #[display("filesystem")]
    Local,
    /// S3-compatible object store
    #[display("object-store")]
    ObjectStore,
}

/// POSIX-like read access to a storage backend.
///
/// Every backend reports absence as the not-found sentinel
/// ([`StorageError::is_not_found`]) and passes other failures through.
#[async_trait::async_trait]
pub trait RepositoryReader: Send + Sync + std::fmt::Debug {
    /// Describe the file or directory at `name`, following symlinks.
    async fn stat(&self, name: &str) -> StorageResult<FileDescriptor>;

    /// Describe `name` without following a final symlink.
    async fn lstat(&self, name: &str) -> StorageResult<FileDescriptor>;

    /// List the entries directly under `path`.
    ///
    /// The whole listing is collected before returning.
    async fn read_dir(&self, path: &str) -> StorageResult<Vec<DirEntry>>;

    /// Open `path` for forward-only reading.
    async fn open(&self, path: &str) -> StorageResult<MediaFile>;

    /// Whether `path` is absolute for this backend.
    fn is_abs(&self, path: &str) -> bool;

    /// Whether files can be handed to a native file server with range and
    /// conditional request support.
    fn serves_native_files(&self) -> bool;

    /// Which backend this is.
    fn backend(&self) -> BackendKind;
}
