//! Helpers used while scanning albums.

use crate::RepositoryReader;
use daguerre_error::{StorageError, StorageErrorKind, StorageResult};

/// Whether `path` exists on `reader`.
///
/// Errors other than absence are logged and reported as "does not exist".
pub async fn file_exists(reader: &dyn RepositoryReader, path: &str) -> bool {
    match reader.stat(path).await {
        Ok(_) => true,
        Err(e) if e.is_not_found() => false,
        Err(e) => {
            tracing::error!(path, error = %e, "Checking for file existence failed");
            false
        }
    }
}

/// Whether `path` is a symlink that resolves to a directory.
///
/// Symlinks are resolved on the host filesystem; object-store paths are never
/// symlinks.
pub async fn is_dir_symlink(reader: &dyn RepositoryReader, path: &str) -> StorageResult<bool> {
    let info = reader
        .lstat(path)
        .await
        .map_err(|e| context(e, format!("could not stat {}", path)))?;

    if !info.mode().is_symlink() {
        return Ok(false);
    }

    let resolved = tokio::fs::canonicalize(path).await.map_err(|e| {
        context(
            StorageError::from_io(path, &e),
            format!("cannot resolve link target of {}, ignoring it", path),
        )
    })?;
    let target = tokio::fs::metadata(&resolved).await.map_err(|e| {
        context(
            StorageError::from_io(&resolved.to_string_lossy(), &e),
            format!(
                "cannot get file info of link target {} of symlink {}, ignoring it",
                resolved.display(),
                path
            ),
        )
    })?;

    Ok(target.is_dir())
}

/// Prefix the error message with `message`, keeping the kind.
#[track_caller]
fn context(err: StorageError, message: String) -> StorageError {
    let kind = match err.kind {
        StorageErrorKind::NotFound(p) => StorageErrorKind::NotFound(format!("{}: {}", message, p)),
        StorageErrorKind::Invalid(m) => StorageErrorKind::Invalid(format!("{}: {}", message, m)),
        StorageErrorKind::Io { kind, message: m } => StorageErrorKind::Io {
            kind,
            message: format!("{}: {}", message, m),
        },
        StorageErrorKind::Backend(m) => StorageErrorKind::Backend(format!("{}: {}", message, m)),
        StorageErrorKind::InvalidConfig(m) => {
            StorageErrorKind::InvalidConfig(format!("{}: {}", message, m))
        }
    };
    StorageError::new(kind)
}
