//! Choosing the backend that answers a call.
//!
//! Two rules coexist:
//!
//! - [`Repositories::data_repository`] follows the global `object_store` flag.
//! - [`Repositories::for_cached_path`] ignores that flag: thumbnails are read
//!   from the host filesystem and every other cached artifact from the object
//!   store.

use crate::{
    BucketClient, FileSystemReader, ObjectStoreReader, RepositoryReader, StorageConfig,
};
use daguerre_error::{StorageError, StorageErrorKind, StorageResult};
use std::sync::Arc;

/// Process-wide set of backends and the rules for picking one.
#[derive(Debug, Clone)]
pub struct Repositories {
    local: Arc<FileSystemReader>,
    object_store: Arc<ObjectStoreReader>,
    use_object_store: bool,
    thumbnail_marker: String,
}

impl Repositories {
    /// Build the selector from configuration.
    ///
    /// # Errors
    ///
    /// Object-store construction failures are returned, never degraded to
    /// the filesystem backend.
    #[tracing::instrument(skip(config), fields(object_store = *config.object_store()))]
    pub fn from_config(config: &StorageConfig) -> StorageResult<Self> {
        if *config.object_store()
            && (config.access_key().is_empty() || config.secret_key().is_empty())
        {
            return Err(StorageError::new(StorageErrorKind::InvalidConfig(
                "object store enabled without access_key/secret_key".to_string(),
            )));
        }

        let object_store = ObjectStoreReader::connect(config)?;
        Ok(Self::new(
            Arc::new(object_store),
            *config.object_store(),
            config.thumbnail_marker().clone(),
        ))
    }

    /// Build the selector over an explicit bucket client.
    pub fn with_buckets(
        buckets: Arc<dyn BucketClient>,
        use_object_store: bool,
        thumbnail_marker: impl Into<String>,
    ) -> Self {
        Self::new(
            Arc::new(ObjectStoreReader::new(buckets)),
            use_object_store,
            thumbnail_marker,
        )
    }

    fn new(
        object_store: Arc<ObjectStoreReader>,
        use_object_store: bool,
        thumbnail_marker: impl Into<String>,
    ) -> Self {
        Self {
            local: Arc::new(FileSystemReader::new()),
            object_store,
            use_object_store,
            thumbnail_marker: thumbnail_marker.into(),
        }
    }

    /// Backend chosen by the global flag.
    pub fn data_repository(&self) -> Arc<dyn RepositoryReader> {
        if self.use_object_store {
            Arc::clone(&self.object_store) as Arc<dyn RepositoryReader>
        } else {
            Arc::clone(&self.local) as Arc<dyn RepositoryReader>
        }
    }

    /// Backend holding a cached artifact.
    ///
    /// Paths containing the thumbnail marker go to the filesystem; all others
    /// go to the object store even when the global flag is off.
    pub fn for_cached_path(&self, cached_path: &str) -> Arc<dyn RepositoryReader> {
        if cached_path.contains(self.thumbnail_marker.as_str()) {
            Arc::clone(&self.local) as Arc<dyn RepositoryReader>
        } else {
            Arc::clone(&self.object_store) as Arc<dyn RepositoryReader>
        }
    }

    /// The object-store backend, for operations beyond the common interface.
    pub fn object_store(&self) -> &ObjectStoreReader {
        &self.object_store
    }

    /// Whether the global flag selects the object store.
    pub fn uses_object_store(&self) -> bool {
        self.use_object_store
    }
}
