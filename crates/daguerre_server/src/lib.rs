//! HTTP media server for the Daguerre photo gallery.
//!
//! Serves cached media artifacts (thumbnails, high-res variants) by name. A
//! missing artifact is regenerated once through a [`MediaProcessor`] before
//! the request fails.
//!
//! # Example
//!
//! ```rust,no_run
//! use daguerre_server::{ApiState, CacheFill, DisabledProcessor, ManifestCatalog, create_router};
//! use daguerre_storage::{MemoryBuckets, Repositories};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let repositories = Repositories::with_buckets(Arc::new(MemoryBuckets::new()), true, "thumbnail");
//!     let cache = CacheFill::new(repositories, Arc::new(DisabledProcessor));
//!     let catalog = ManifestCatalog::default();
//!     let app = create_router(ApiState::new(Arc::new(catalog), Arc::new(cache)));
//!
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:4001").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod api;
mod cache_fill;
mod catalog;
mod config;
mod observability;
mod processor;
mod single_flight;

pub use api::{ApiState, CACHE_CONTROL_VALUE, create_router};
pub use cache_fill::{CacheFill, CacheFillError, CachedArtifact};
pub use catalog::{Authorization, ManifestCatalog, ManifestEntry, MediaCatalog, MediaRef, MediaUrl};
pub use config::{CatalogSettings, GalleryConfig, LogSettings, ProcessorSettings, ServerSettings};
pub use daguerre_error::{ServerError, ServerErrorKind};
pub use observability::{ObservabilityConfig, init_observability};
pub use processor::{CommandProcessor, DisabledProcessor, MediaProcessor};
pub use single_flight::InFlight;
