//! Object-store backend.
//!
//! Object stores have a flat key namespace. Directories are synthesised from
//! key prefixes: a prefix "exists" when listing it yields at least one key,
//! and a bucket "exists" when the store says so. Virtual paths have the shape
//! `/bucket/prefix.../file` (see [`crate::split`]).

use crate::path::{base_name, dir_prefix, split, split_bucket, SEPARATOR};
use crate::{
    BackendKind, BucketClient, DirEntry, FileDescriptor, FileMode, MediaFile, RepositoryReader,
    S3Buckets, StorageConfig,
};
use chrono::{DateTime, Utc};
use daguerre_error::{StorageError, StorageErrorKind, StorageResult};
use futures::stream::{BoxStream, StreamExt, TryStreamExt};
use object_store::path::Path as ObjectPath;
use object_store::ObjectMeta;
use std::sync::Arc;

/// Raw listing record: an object, or a sub-prefix reported as a key ending in `/`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ObjectInfo {
    key: String,
    size: u64,
    last_modified: Option<DateTime<Utc>>,
}

impl ObjectInfo {
    fn object(meta: &ObjectMeta) -> Self {
        Self {
            key: meta.location.to_string(),
            size: meta.size,
            last_modified: Some(meta.last_modified),
        }
    }

    fn common_prefix(prefix: &ObjectPath) -> Self {
        Self {
            key: format!("{}{}", prefix, SEPARATOR),
            size: 0,
            last_modified: None,
        }
    }

    fn is_dir(&self) -> bool {
        self.key.ends_with(SEPARATOR)
    }

    fn mode(&self) -> FileMode {
        if self.is_dir() {
            FileMode::DIR.union(FileMode::PERM)
        } else {
            FileMode::PERM
        }
    }

    /// Descriptor named by the full key, without a trailing separator.
    fn descriptor(&self) -> FileDescriptor {
        FileDescriptor::new(
            self.key.trim_end_matches(SEPARATOR),
            self.size,
            self.last_modified.unwrap_or_else(Utc::now),
            self.mode(),
        )
    }

    fn into_entry(self) -> DirEntry {
        let file_type = if self.is_dir() { FileMode::DIR } else { FileMode::PERM };
        DirEntry::new(base_name(&self.key), file_type, self.descriptor())
    }
}

#[track_caller]
fn object_error(path: &str, err: object_store::Error) -> StorageError {
    match err {
        object_store::Error::NotFound { .. } => StorageError::not_found(path),
        other => StorageError::new(StorageErrorKind::Backend(other.to_string())),
    }
}

/// Object location for a raw key, taken verbatim.
///
/// Keys with empty, `.` or `..` segments are rejected as `Invalid`.
#[track_caller]
pub(crate) fn object_path(key: &str) -> StorageResult<ObjectPath> {
    ObjectPath::parse(key).map_err(|e| {
        StorageError::new(StorageErrorKind::Invalid(format!(
            "invalid object key {}: {}",
            key, e
        )))
    })
}

fn prefix_path(prefix: &str) -> StorageResult<Option<ObjectPath>> {
    if prefix.trim_matches(SEPARATOR).is_empty() {
        Ok(None)
    } else {
        object_path(prefix).map(Some)
    }
}

/// Reader over an S3-compatible object store.
///
/// Holds one bucket client, built once and shared by all callers.
#[derive(Debug, Clone)]
pub struct ObjectStoreReader {
    buckets: Arc<dyn BucketClient>,
}

impl ObjectStoreReader {
    /// Create a reader over an existing bucket client.
    pub fn new(buckets: Arc<dyn BucketClient>) -> Self {
        Self { buckets }
    }

    /// Connect to the S3-compatible endpoint in `config`.
    ///
    /// # Errors
    ///
    /// Fails when the client cannot be constructed; callers treat this as fatal.
    pub fn connect(config: &StorageConfig) -> StorageResult<Self> {
        Ok(Self::new(Arc::new(S3Buckets::connect(config)?)))
    }

    #[tracing::instrument(skip(self))]
    async fn stat_file(&self, bucket: &str, key: &str) -> StorageResult<FileDescriptor> {
        let store = self.buckets.bucket(bucket)?;
        let meta = store
            .head(&object_path(key)?)
            .await
            .map_err(|e| object_error(key, e))?;
        Ok(ObjectInfo::object(&meta).descriptor())
    }

    #[tracing::instrument(skip(self))]
    async fn stat_prefix(&self, bucket: &str, prefix: &str) -> StorageResult<FileDescriptor> {
        let store = self.buckets.bucket(bucket)?;
        let location = prefix_path(prefix)?;
        let mut listing = store.list(location.as_ref());

        // The first listed key is taken as proof the prefix exists.
        match listing.next().await {
            Some(Ok(_)) => Ok(FileDescriptor::folder(prefix)),
            Some(Err(e)) => Err(object_error(prefix, e)),
            None => Err(StorageError::not_found(prefix)),
        }
    }

    #[tracing::instrument(skip(self))]
    async fn stat_bucket(&self, bucket: &str) -> StorageResult<FileDescriptor> {
        if self.buckets.bucket_exists(bucket).await? {
            Ok(FileDescriptor::folder(bucket))
        } else {
            Err(StorageError::not_found(bucket))
        }
    }

    /// Lazily list every key below `path`, recursively.
    ///
    /// Unlike [`RepositoryReader::read_dir`] nothing is buffered: keys are
    /// fetched page by page as the stream is polled. Each call starts a fresh
    /// listing. Sub-prefixes are not reported separately.
    pub fn walk(&self, path: &str) -> BoxStream<'static, StorageResult<DirEntry>> {
        let (bucket, prefix) = split_bucket(path);
        let buckets = Arc::clone(&self.buckets);

        Box::pin(async_stream::stream! {
            let store = match buckets.bucket(&bucket) {
                Ok(store) => store,
                Err(e) => {
                    yield Err(e);
                    return;
                }
            };
            let location = match prefix_path(&prefix) {
                Ok(location) => location,
                Err(e) => {
                    yield Err(e);
                    return;
                }
            };
            let mut listing = store.list(location.as_ref());
            while let Some(item) = listing.next().await {
                yield item
                    .map(|meta| ObjectInfo::object(&meta).into_entry())
                    .map_err(|e| object_error(&prefix, e));
            }
        })
    }
}

#[async_trait::async_trait]
impl RepositoryReader for ObjectStoreReader {
    #[tracing::instrument(skip(self))]
    async fn stat(&self, name: &str) -> StorageResult<FileDescriptor> {
        if name.is_empty() {
            return Err(StorageError::not_found(name));
        }

        let parts = split(name);
        match (parts.prefix.is_empty(), parts.file.is_empty()) {
            (_, false) => self.stat_file(&parts.bucket, &parts.key()).await,
            (false, true) => self.stat_prefix(&parts.bucket, &parts.prefix).await,
            (true, true) => self.stat_bucket(&parts.bucket).await,
        }
    }

    async fn lstat(&self, name: &str) -> StorageResult<FileDescriptor> {
        // No symlinks in an object store.
        self.stat(name).await
    }

    #[tracing::instrument(skip(self))]
    async fn read_dir(&self, path: &str) -> StorageResult<Vec<DirEntry>> {
        if path.is_empty() {
            return Err(StorageError::not_found(path));
        }

        let (bucket, prefix) = split_bucket(path);
        match self.buckets.bucket_exists(&bucket).await {
            Ok(true) => {}
            Ok(false) => return Err(StorageError::not_found(&bucket)),
            Err(e) => {
                return Err(StorageError::new(StorageErrorKind::Invalid(format!(
                    "bucket check for {} failed: {}",
                    bucket, e.kind
                ))));
            }
        }

        let prefix = dir_prefix(&prefix);
        let location = prefix_path(&prefix)?;
        let store = self.buckets.bucket(&bucket)?;
        let listing = store
            .list_with_delimiter(location.as_ref())
            .await
            .map_err(|e| StorageError::new(StorageErrorKind::Backend(e.to_string())))?;

        let mut infos: Vec<ObjectInfo> = listing
            .common_prefixes
            .iter()
            .map(ObjectInfo::common_prefix)
            .chain(listing.objects.iter().map(ObjectInfo::object))
            .collect();
        infos.sort_by(|a, b| a.key.cmp(&b.key));

        tracing::debug!(bucket = %bucket, prefix = %prefix, count = infos.len(), "Listed prefix");
        Ok(infos.into_iter().map(ObjectInfo::into_entry).collect())
    }

    #[tracing::instrument(skip(self))]
    async fn open(&self, path: &str) -> StorageResult<MediaFile> {
        let parts = split(path);
        let key = parts.key();
        let store = self.buckets.bucket(&parts.bucket)?;

        let result = store
            .get(&object_path(&key)?)
            .await
            .map_err(|e| object_error(path, e))?;
        let size = result.meta.size;
        let stream = result
            .into_stream()
            .map_err(std::io::Error::other)
            .boxed();

        tracing::debug!(bucket = %parts.bucket, key = %key, size, "Opened object");
        Ok(MediaFile::new(path, Some(size), stream))
    }

    fn is_abs(&self, _path: &str) -> bool {
        true
    }

    fn serves_native_files(&self) -> bool {
        false
    }

    fn backend(&self) -> BackendKind {
        BackendKind::ObjectStore
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_entry_is_directory() {
        let info = ObjectInfo::common_prefix(&ObjectPath::from("2024/summer"));
        assert_eq!(info.key, "2024/summer/");
        let entry = info.into_entry();
        assert!(entry.is_dir());
        assert_eq!(entry.name(), "summer");
        assert_eq!(entry.info().name(), "2024/summer");
    }

    #[test]
    fn object_entry_is_file() {
        let info = ObjectInfo {
            key: "2024/beach.jpg".to_string(),
            size: 42,
            last_modified: Some(Utc::now()),
        };
        let entry = info.into_entry();
        assert!(!entry.is_dir());
        assert_eq!(entry.name(), "beach.jpg");
        assert_eq!(entry.file_type(), FileMode::PERM);
        assert_eq!(entry.info().size(), 42);
    }
}
