//! Bucket access for the object-store backend.
//!
//! `object_store` binds one client to one bucket, while virtual paths name the
//! bucket as their first segment. A [`BucketClient`] hands out per-bucket
//! stores and answers bucket existence.

use crate::StorageConfig;
use crate::object::object_path;
use bytes::Bytes;
use daguerre_error::{StorageError, StorageErrorKind, StorageResult};
use futures::StreamExt;
use object_store::aws::AmazonS3Builder;
use object_store::memory::InMemory;
use object_store::{ObjectStore, PutPayload};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Source of per-bucket object stores.
#[async_trait::async_trait]
pub trait BucketClient: Send + Sync + std::fmt::Debug {
    /// Store handle for the named bucket.
    ///
    /// Does not check that the bucket exists.
    fn bucket(&self, name: &str) -> StorageResult<Arc<dyn ObjectStore>>;

    /// Whether the named bucket exists.
    async fn bucket_exists(&self, name: &str) -> StorageResult<bool>;
}

/// Buckets on an S3-compatible endpoint (MinIO, Garage, AWS).
///
/// One client is built per bucket on first use and shared afterwards.
#[derive(Debug)]
pub struct S3Buckets {
    endpoint: String,
    access_key: String,
    secret_key: String,
    region: String,
    secure: bool,
    clients: RwLock<HashMap<String, Arc<dyn ObjectStore>>>,
}

impl S3Buckets {
    /// Connect to the endpoint described by `config`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` when the endpoint is empty or the client
    /// cannot be built from the settings.
    #[tracing::instrument(skip(config), fields(endpoint = %config.endpoint()))]
    pub fn connect(config: &StorageConfig) -> StorageResult<Self> {
        if config.endpoint().trim().is_empty() {
            return Err(StorageError::new(StorageErrorKind::InvalidConfig(
                "object store endpoint is empty".to_string(),
            )));
        }

        let buckets = Self {
            endpoint: config.endpoint().clone(),
            access_key: config.access_key().clone(),
            secret_key: config.secret_key().clone(),
            region: config.region().clone(),
            secure: *config.secure(),
            clients: RwLock::new(HashMap::new()),
        };

        // Building a throwaway client validates the endpoint and credentials shape.
        buckets.build("daguerre")?;
        tracing::info!(endpoint = %buckets.endpoint, secure = buckets.secure, "Connected object store");
        Ok(buckets)
    }

    fn url(&self) -> String {
        if self.endpoint.contains("://") {
            self.endpoint.clone()
        } else if self.secure {
            format!("https://{}", self.endpoint)
        } else {
            format!("http://{}", self.endpoint)
        }
    }

    fn build(&self, bucket: &str) -> StorageResult<Arc<dyn ObjectStore>> {
        let store = AmazonS3Builder::new()
            .with_endpoint(self.url())
            .with_region(&self.region)
            .with_bucket_name(bucket)
            .with_access_key_id(&self.access_key)
            .with_secret_access_key(&self.secret_key)
            .with_allow_http(!self.secure)
            .with_virtual_hosted_style_request(false)
            .build()
            .map_err(|e| {
                StorageError::new(StorageErrorKind::InvalidConfig(format!(
                    "object store client for bucket {}: {}",
                    bucket, e
                )))
            })?;
        Ok(Arc::new(store))
    }
}

fn is_missing_bucket(err: &object_store::Error) -> bool {
    matches!(err, object_store::Error::NotFound { .. }) || err.to_string().contains("NoSuchBucket")
}

#[async_trait::async_trait]
impl BucketClient for S3Buckets {
    fn bucket(&self, name: &str) -> StorageResult<Arc<dyn ObjectStore>> {
        if let Some(store) = self.clients.read().get(name) {
            return Ok(Arc::clone(store));
        }
        let store = self.build(name)?;
        let mut clients = self.clients.write();
        Ok(Arc::clone(clients.entry(name.to_string()).or_insert(store)))
    }

    #[tracing::instrument(skip(self))]
    async fn bucket_exists(&self, name: &str) -> StorageResult<bool> {
        if name.is_empty() {
            return Ok(false);
        }
        let store = self.bucket(name)?;
        let mut listing = store.list(None);
        match listing.next().await {
            None | Some(Ok(_)) => Ok(true),
            Some(Err(e)) if is_missing_bucket(&e) => Ok(false),
            Some(Err(e)) => Err(StorageError::new(StorageErrorKind::Backend(e.to_string()))),
        }
    }
}

/// In-process buckets backed by `object_store`'s memory store.
///
/// Used by tests and local development; a bucket exists once created.
#[derive(Debug, Default)]
pub struct MemoryBuckets {
    buckets: RwLock<HashMap<String, Arc<InMemory>>>,
}

impl MemoryBuckets {
    /// Create an empty set of buckets.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a bucket, or return it if it already exists.
    pub fn create_bucket(&self, name: &str) -> Arc<dyn ObjectStore> {
        let mut buckets = self.buckets.write();
        let store = buckets
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(InMemory::new()));
        Arc::clone(store) as Arc<dyn ObjectStore>
    }

    /// Write an object, creating its bucket if needed.
    pub async fn put(&self, bucket: &str, key: &str, data: impl Into<Bytes>) -> StorageResult<()> {
        let store = self.create_bucket(bucket);
        store
            .put(&object_path(key)?, PutPayload::from(data.into()))
            .await
            .map_err(|e| StorageError::new(StorageErrorKind::Backend(e.to_string())))?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl BucketClient for MemoryBuckets {
    fn bucket(&self, name: &str) -> StorageResult<Arc<dyn ObjectStore>> {
        match self.buckets.read().get(name) {
            Some(store) => Ok(Arc::clone(store) as Arc<dyn ObjectStore>),
            // Unknown buckets behave as empty ones.
            None => Ok(Arc::new(InMemory::new())),
        }
    }

    async fn bucket_exists(&self, name: &str) -> StorageResult<bool> {
        Ok(self.buckets.read().contains_key(name))
    }
}
