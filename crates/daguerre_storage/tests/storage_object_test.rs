//! Tests for the object-store backend against in-memory buckets.

use daguerre_error::StorageResult;
use daguerre_storage::{
    BackendKind, BucketClient, FOLDER_SIZE, MemoryBuckets, ObjectStoreReader, RepositoryReader,
    StorageError, StorageErrorKind,
};
use futures::stream::{BoxStream, StreamExt, TryStreamExt};
use object_store::path::Path as ObjectPath;
use object_store::{
    GetOptions, GetResult, ListResult, MultipartUpload, ObjectMeta, ObjectStore,
    PutMultipartOptions, PutOptions, PutPayload, PutResult, Result as ObjectStoreResult,
};
use std::sync::Arc;

async fn gallery() -> (Arc<MemoryBuckets>, ObjectStoreReader) {
    let buckets = Arc::new(MemoryBuckets::new());
    buckets.put("photos", "cover.jpg", b"cover".to_vec()).await.unwrap();
    buckets
        .put("photos", "2024/summer/beach.jpg", b"beach bytes".to_vec())
        .await
        .unwrap();
    buckets
        .put("photos", "2024/summer/dunes.jpg", b"dunes".to_vec())
        .await
        .unwrap();
    buckets
        .put("photos", "2024/winter.png", b"snow".to_vec())
        .await
        .unwrap();
    buckets.create_bucket("empty");
    let reader = ObjectStoreReader::new(buckets.clone());
    (buckets, reader)
}

#[tokio::test]
async fn test_stat_existing_key() {
    let (_, reader) = gallery().await;

    let info = reader.stat("/photos/2024/summer/beach.jpg").await.unwrap();
    assert_eq!(info.size(), 11);
    assert!(!info.is_dir());
    assert_eq!(info.mode().perm(), 0o777);

    // Two segments with a dot name a file at the bucket root.
    let cover = reader.stat("/photos/cover.jpg").await.unwrap();
    assert_eq!(cover.size(), 5);
}

#[tokio::test]
async fn test_stat_existing_prefix_is_directory() {
    let (_, reader) = gallery().await;

    let info = reader.stat("/photos/2024").await.unwrap();
    assert!(info.is_dir());
    assert_eq!(info.name(), "2024");
    assert_eq!(info.size(), FOLDER_SIZE);
}

#[tokio::test]
async fn test_stat_bucket() {
    let (_, reader) = gallery().await;

    let info = reader.stat("/photos").await.unwrap();
    assert!(info.is_dir());
    assert_eq!(info.name(), "photos");

    // An empty bucket still exists.
    assert!(reader.stat("/empty").await.unwrap().is_dir());
}

#[tokio::test]
async fn test_stat_missing_is_not_found() {
    let (_, reader) = gallery().await;

    for path in ["/nope", "/photos/1999", "/photos/2024/summer/missing.jpg", ""] {
        let err = reader.stat(path).await.unwrap_err();
        assert!(err.is_not_found(), "{} should be not found", path);
    }
}

#[tokio::test]
async fn test_lstat_matches_stat() {
    let (_, reader) = gallery().await;

    let stat = reader.stat("/photos/2024/winter.png").await.unwrap();
    let lstat = reader.lstat("/photos/2024/winter.png").await.unwrap();
    assert_eq!(stat, lstat);
}

#[tokio::test]
async fn test_read_dir_lists_objects_and_prefixes() {
    let (_, reader) = gallery().await;

    let entries = reader.read_dir("/photos/2024").await.unwrap();
    let names: Vec<_> = entries.iter().map(|e| (e.name(), e.is_dir())).collect();
    assert_eq!(names, vec![("summer", true), ("winter.png", false)]);

    let winter = &entries[1];
    assert_eq!(winter.info().size(), 4);
    assert_eq!(winter.info().name(), "2024/winter.png");
}

#[tokio::test]
async fn test_read_dir_bucket_root() {
    let (_, reader) = gallery().await;

    let entries = reader.read_dir("/photos").await.unwrap();
    let names: Vec<_> = entries.iter().map(|e| e.name()).collect();
    assert_eq!(names, vec!["2024", "cover.jpg"]);
}

#[tokio::test]
async fn test_read_dir_empty_path_is_not_found() {
    let (_, reader) = gallery().await;

    let result = reader.read_dir("").await;
    assert!(result.as_ref().is_err_and(|e| e.is_not_found()));
}

#[tokio::test]
async fn test_read_dir_missing_bucket() {
    let (_, reader) = gallery().await;

    let err = reader.read_dir("/nope/2024").await.unwrap_err();
    assert!(matches!(err.kind, StorageErrorKind::NotFound(_)));
}

#[tokio::test]
async fn test_open_streams_exact_bytes() {
    let (buckets, reader) = gallery().await;
    let data: Vec<u8> = (0..=255u8).cycle().take(300_000).collect();
    buckets
        .put("photos", "2024/raw/big.cr2", data.clone())
        .await
        .unwrap();

    let file = reader.open("/photos/2024/raw/big.cr2").await.unwrap();
    assert_eq!(file.size(), Some(300_000));
    assert_eq!(file.read_to_end().await.unwrap(), data);
}

#[tokio::test]
async fn test_open_missing_is_not_found() {
    let (_, reader) = gallery().await;

    let err = reader.open("/photos/2024/missing.jpg").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_write_then_stat_and_open() {
    let (buckets, reader) = gallery().await;
    buckets
        .put("cache", "media/42/photo_highres.jpg", b"fresh".to_vec())
        .await
        .unwrap();

    let info = reader.stat("/cache/media/42/photo_highres.jpg").await.unwrap();
    assert_eq!(info.size(), 5);
    let bytes = reader
        .open("/cache/media/42/photo_highres.jpg")
        .await
        .unwrap()
        .read_to_end()
        .await
        .unwrap();
    assert_eq!(bytes, b"fresh");
}

#[tokio::test]
async fn test_walk_is_recursive_and_restartable() {
    let (_, reader) = gallery().await;

    let first: Vec<_> = reader.walk("/photos/2024").try_collect().await.unwrap();
    let second: Vec<_> = reader.walk("/photos/2024").try_collect().await.unwrap();

    let mut names: Vec<_> = first.iter().map(|e| e.info().name().to_string()).collect();
    names.sort();
    assert_eq!(
        names,
        vec!["2024/summer/beach.jpg", "2024/summer/dunes.jpg", "2024/winter.png"]
    );
    assert_eq!(first.len(), second.len());
}

#[test]
fn test_capabilities() {
    let reader = ObjectStoreReader::new(Arc::new(MemoryBuckets::new()));
    assert!(reader.is_abs("relative/looking/path"));
    assert!(!reader.serves_native_files());
    assert_eq!(reader.backend(), BackendKind::ObjectStore);
}

#[tokio::test]
async fn test_keys_with_reserved_characters_round_trip() {
    let (buckets, reader) = gallery().await;
    buckets
        .put("photos", "album/photo#1.jpg", b"abc".to_vec())
        .await
        .unwrap();

    let info = reader.stat("/photos/album/photo#1.jpg").await.unwrap();
    assert_eq!(info.size(), 3);
    assert_eq!(info.name(), "album/photo#1.jpg");

    let bytes = reader
        .open("/photos/album/photo#1.jpg")
        .await
        .unwrap()
        .read_to_end()
        .await
        .unwrap();
    assert_eq!(bytes, b"abc");

    let entries = reader.read_dir("/photos/album").await.unwrap();
    let names: Vec<_> = entries.iter().map(|e| e.name()).collect();
    assert_eq!(names, vec!["photo#1.jpg"]);
    assert_eq!(entries[0].info().name(), "album/photo#1.jpg");
}

#[tokio::test]
async fn test_stat_reports_object_modification_time() {
    let (buckets, reader) = gallery().await;
    let meta = buckets
        .bucket("photos")
        .unwrap()
        .head(&ObjectPath::parse("2024/winter.png").unwrap())
        .await
        .unwrap();

    let info = reader.stat("/photos/2024/winter.png").await.unwrap();
    assert_eq!(info.modified(), meta.last_modified);
    assert_eq!(info.size(), meta.size);
}

#[tokio::test]
async fn test_malformed_key_is_invalid() {
    let (_, reader) = gallery().await;

    let err = reader.stat("/photos/2024/../winter.png").await.unwrap_err();
    assert!(matches!(err.kind, StorageErrorKind::Invalid(_)));
}

/// Object store whose every call fails.
#[derive(Debug)]
struct BrokenStore;

impl std::fmt::Display for BrokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "BrokenStore")
    }
}

fn broken() -> object_store::Error {
    object_store::Error::Generic {
        store: "BrokenStore",
        source: "connection reset".into(),
    }
}

#[async_trait::async_trait]
impl ObjectStore for BrokenStore {
    async fn put_opts(
        &self,
        _location: &ObjectPath,
        _payload: PutPayload,
        _opts: PutOptions,
    ) -> ObjectStoreResult<PutResult> {
        Err(broken())
    }

    async fn put_multipart_opts(
        &self,
        _location: &ObjectPath,
        _opts: PutMultipartOptions,
    ) -> ObjectStoreResult<Box<dyn MultipartUpload>> {
        Err(broken())
    }

    async fn get_opts(
        &self,
        _location: &ObjectPath,
        _options: GetOptions,
    ) -> ObjectStoreResult<GetResult> {
        Err(broken())
    }

    async fn delete(&self, _location: &ObjectPath) -> ObjectStoreResult<()> {
        Err(broken())
    }

    fn list(&self, _prefix: Option<&ObjectPath>) -> BoxStream<'static, ObjectStoreResult<ObjectMeta>> {
        futures::stream::once(async { Err(broken()) }).boxed()
    }

    async fn list_with_delimiter(
        &self,
        _prefix: Option<&ObjectPath>,
    ) -> ObjectStoreResult<ListResult> {
        Err(broken())
    }

    async fn copy(&self, _from: &ObjectPath, _to: &ObjectPath) -> ObjectStoreResult<()> {
        Err(broken())
    }

    async fn copy_if_not_exists(
        &self,
        _from: &ObjectPath,
        _to: &ObjectPath,
    ) -> ObjectStoreResult<()> {
        Err(broken())
    }
}

/// Buckets on an endpoint that fails; the existence probe can be made to pass.
#[derive(Debug)]
struct BrokenBuckets {
    probe_ok: bool,
}

#[async_trait::async_trait]
impl BucketClient for BrokenBuckets {
    fn bucket(&self, _name: &str) -> StorageResult<Arc<dyn ObjectStore>> {
        Ok(Arc::new(BrokenStore))
    }

    async fn bucket_exists(&self, _name: &str) -> StorageResult<bool> {
        if self.probe_ok {
            Ok(true)
        } else {
            Err(StorageError::new(StorageErrorKind::Backend(
                "connection refused".to_string(),
            )))
        }
    }
}

#[tokio::test]
async fn test_read_dir_failed_bucket_check_is_invalid() {
    let reader = ObjectStoreReader::new(Arc::new(BrokenBuckets { probe_ok: false }));

    let err = reader.read_dir("/photos/2024").await.unwrap_err();
    assert!(matches!(err.kind, StorageErrorKind::Invalid(_)));
}

#[tokio::test]
async fn test_read_dir_listing_error_aborts() {
    let reader = ObjectStoreReader::new(Arc::new(BrokenBuckets { probe_ok: true }));

    let err = reader.read_dir("/photos/2024").await.unwrap_err();
    assert!(matches!(err.kind, StorageErrorKind::Backend(_)));
}

#[tokio::test]
async fn test_backend_failures_are_not_not_found() {
    let reader = ObjectStoreReader::new(Arc::new(BrokenBuckets { probe_ok: true }));

    for path in ["/photos/2024/winter.png", "/photos/2024"] {
        let err = reader.stat(path).await.unwrap_err();
        assert!(!err.is_not_found(), "{} should surface the backend error", path);
        assert!(matches!(err.kind, StorageErrorKind::Backend(_)));
    }
    let err = reader.open("/photos/2024/winter.png").await.unwrap_err();
    assert!(matches!(err.kind, StorageErrorKind::Backend(_)));
}
