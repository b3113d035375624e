//! Top-level error wrapper types.

use crate::{ConfigError, ServerError, StorageError};

/// Every error a Daguerre crate can surface.
///
/// # Examples
///
/// ```
/// use daguerre_error::{ConfigError, ConfigErrorKind, DaguerreError};
///
/// let err: DaguerreError = ConfigError::new(ConfigErrorKind::Load("missing file".into())).into();
/// assert!(format!("{}", err).contains("Configuration Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum DaguerreErrorKind {
    /// Storage backend error
    #[from(StorageError)]
    Storage(StorageError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// HTTP serving or collaborator error
    #[from(ServerError)]
    Server(ServerError),
}

/// Daguerre error with kind discrimination.
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Daguerre Error: {}", _0)]
pub struct DaguerreError(Box<DaguerreErrorKind>);

impl DaguerreError {
    /// Create a new error from a kind.
    pub fn new(kind: DaguerreErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &DaguerreErrorKind {
        &self.0
    }

    /// True when this is the storage not-found sentinel.
    pub fn is_not_found(&self) -> bool {
        matches!(self.kind(), DaguerreErrorKind::Storage(e) if e.is_not_found())
    }
}

// Generic From implementation for any type that converts to DaguerreErrorKind
impl<T> From<T> for DaguerreError
where
    T: Into<DaguerreErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Daguerre operations.
pub type DaguerreResult<T> = std::result::Result<T, DaguerreError>;
