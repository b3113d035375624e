//! Host filesystem backend.
//!
//! A thin pass-through: paths go to the host untranslated. Absence is folded
//! into the not-found sentinel; every other host error keeps its native kind.

use crate::{BackendKind, DirEntry, FileDescriptor, FileMode, MediaFile, RepositoryReader};
use chrono::{DateTime, Utc};
use daguerre_error::{StorageError, StorageResult};
use futures::StreamExt;
use std::path::Path;
use tokio_util::io::ReaderStream;

/// Filesystem reader.
///
/// Always used for thumbnails, whatever the global backend choice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct FileSystemReader;

impl FileSystemReader {
    /// Create a filesystem reader.
    pub fn new() -> Self {
        Self
    }

    fn descriptor(path: &str, meta: &std::fs::Metadata) -> FileDescriptor {
        let name = Path::new(path)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string());
        let modified = meta
            .modified()
            .map(DateTime::<Utc>::from)
            .unwrap_or_else(|_| Utc::now());
        FileDescriptor::new(name, meta.len(), modified, mode_of(meta))
    }
}

fn mode_of(meta: &std::fs::Metadata) -> FileMode {
    let file_type = meta.file_type();
    let mut mode = FileMode::from_bits(permission_bits(meta));
    if file_type.is_dir() {
        mode = mode.union(FileMode::DIR);
    }
    if file_type.is_symlink() {
        mode = mode.union(FileMode::SYMLINK);
    }
    mode
}

#[cfg(unix)]
fn permission_bits(meta: &std::fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    meta.permissions().mode() & 0o777
}

#[cfg(not(unix))]
fn permission_bits(meta: &std::fs::Metadata) -> u32 {
    if meta.permissions().readonly() {
        0o444
    } else {
        0o666
    }
}

#[async_trait::async_trait]
impl RepositoryReader for FileSystemReader {
    #[tracing::instrument(skip(self))]
    async fn stat(&self, name: &str) -> StorageResult<FileDescriptor> {
        let meta = tokio::fs::metadata(name)
            .await
            .map_err(|e| StorageError::from_io(name, &e))?;
        Ok(Self::descriptor(name, &meta))
    }

    #[tracing::instrument(skip(self))]
    async fn lstat(&self, name: &str) -> StorageResult<FileDescriptor> {
        let meta = tokio::fs::symlink_metadata(name)
            .await
            .map_err(|e| StorageError::from_io(name, &e))?;
        Ok(Self::descriptor(name, &meta))
    }

    #[tracing::instrument(skip(self))]
    async fn read_dir(&self, path: &str) -> StorageResult<Vec<DirEntry>> {
        let mut dir = tokio::fs::read_dir(path)
            .await
            .map_err(|e| StorageError::from_io(path, &e))?;

        let mut entries = Vec::new();
        while let Some(entry) = dir
            .next_entry()
            .await
            .map_err(|e| StorageError::from_io(path, &e))?
        {
            let entry_path = entry.path();
            let entry_path = entry_path.to_string_lossy();
            let meta = entry
                .metadata()
                .await
                .map_err(|e| StorageError::from_io(&entry_path, &e))?;
            let info = Self::descriptor(&entry_path, &meta);
            let file_type = if meta.is_dir() {
                FileMode::DIR
            } else if meta.file_type().is_symlink() {
                FileMode::SYMLINK
            } else {
                FileMode::from_bits(0)
            };
            entries.push(DirEntry::new(info.name().to_string(), file_type, info));
        }

        entries.sort_by(|a, b| a.name().cmp(b.name()));
        tracing::debug!(path, count = entries.len(), "Read directory");
        Ok(entries)
    }

    #[tracing::instrument(skip(self))]
    async fn open(&self, path: &str) -> StorageResult<MediaFile> {
        let file = tokio::fs::File::open(path)
            .await
            .map_err(|e| StorageError::from_io(path, &e))?;
        let size = file.metadata().await.ok().map(|m| m.len());
        Ok(MediaFile::new(path, size, ReaderStream::new(file).boxed()))
    }

    fn is_abs(&self, path: &str) -> bool {
        Path::new(path).is_absolute()
    }

    fn serves_native_files(&self) -> bool {
        true
    }

    fn backend(&self) -> BackendKind {
        BackendKind::Local
    }
}
