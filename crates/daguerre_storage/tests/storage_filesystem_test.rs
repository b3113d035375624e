//! Tests for the host filesystem backend.

use daguerre_storage::{BackendKind, FileSystemReader, RepositoryReader, StorageErrorKind};
use tempfile::TempDir;

fn path_str(dir: &TempDir, name: &str) -> String {
    dir.path().join(name).to_string_lossy().to_string()
}

#[tokio::test]
async fn test_stat_file() {
    let temp_dir = TempDir::new().unwrap();
    let file = path_str(&temp_dir, "photo.jpg");
    tokio::fs::write(&file, b"Hello, world!").await.unwrap();

    let reader = FileSystemReader::new();
    let info = reader.stat(&file).await.unwrap();

    assert_eq!(info.name(), "photo.jpg");
    assert_eq!(info.size(), 13);
    assert!(!info.is_dir());
}

#[tokio::test]
async fn test_stat_directory() {
    let temp_dir = TempDir::new().unwrap();
    let reader = FileSystemReader::new();

    let info = reader
        .stat(&temp_dir.path().to_string_lossy())
        .await
        .unwrap();
    assert!(info.is_dir());
}

#[tokio::test]
async fn test_not_found() {
    let temp_dir = TempDir::new().unwrap();
    let reader = FileSystemReader::new();
    let missing = path_str(&temp_dir, "missing.jpg");

    let err = reader.stat(&missing).await.unwrap_err();
    assert!(err.is_not_found());

    let err = reader.open(&missing).await.unwrap_err();
    assert!(err.is_not_found());

    let err = reader.read_dir(&missing).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_read_dir_sorted() {
    let temp_dir = TempDir::new().unwrap();
    tokio::fs::write(path_str(&temp_dir, "b.jpg"), b"b").await.unwrap();
    tokio::fs::write(path_str(&temp_dir, "a.jpg"), b"aa").await.unwrap();
    tokio::fs::create_dir(path_str(&temp_dir, "album")).await.unwrap();

    let reader = FileSystemReader::new();
    let entries = reader
        .read_dir(&temp_dir.path().to_string_lossy())
        .await
        .unwrap();

    let names: Vec<_> = entries.iter().map(|e| e.name()).collect();
    assert_eq!(names, vec!["a.jpg", "album", "b.jpg"]);
    assert!(entries[1].is_dir());
    assert!(!entries[0].is_dir());
    assert_eq!(entries[0].info().size(), 2);
}

#[tokio::test]
async fn test_open_reads_bytes() {
    let temp_dir = TempDir::new().unwrap();
    let file = path_str(&temp_dir, "raw.cr2");
    let data: Vec<u8> = (0..=255u8).cycle().take(100_000).collect();
    tokio::fs::write(&file, &data).await.unwrap();

    let reader = FileSystemReader::new();
    let opened = reader.open(&file).await.unwrap();
    assert_eq!(opened.size(), Some(100_000));
    assert_eq!(opened.read_to_end().await.unwrap(), data);
}

#[cfg(unix)]
#[tokio::test]
async fn test_lstat_sees_symlink() {
    let temp_dir = TempDir::new().unwrap();
    let target = path_str(&temp_dir, "target.jpg");
    let link = path_str(&temp_dir, "link.jpg");
    tokio::fs::write(&target, b"x").await.unwrap();
    tokio::fs::symlink(&target, &link).await.unwrap();

    let reader = FileSystemReader::new();
    assert!(reader.lstat(&link).await.unwrap().mode().is_symlink());
    assert!(!reader.stat(&link).await.unwrap().mode().is_symlink());
}

#[cfg(unix)]
#[tokio::test]
async fn test_permission_error_keeps_native_kind() {
    let temp_dir = TempDir::new().unwrap();
    let file = path_str(&temp_dir, "not-a-dir.txt");
    tokio::fs::write(&file, b"x").await.unwrap();

    let reader = FileSystemReader::new();
    let err = reader.read_dir(&file).await.unwrap_err();
    assert!(!err.is_not_found());
    assert!(matches!(err.kind, StorageErrorKind::Io { .. }));
}

#[test]
fn test_capabilities() {
    let reader = FileSystemReader::new();
    assert!(reader.is_abs("/var/cache/photos"));
    assert!(!reader.is_abs("cache/photos"));
    assert!(reader.serves_native_files());
    assert_eq!(reader.backend(), BackendKind::Local);
}
