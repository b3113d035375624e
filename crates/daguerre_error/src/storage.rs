//! Storage error types.

/// Kinds of storage errors.
///
/// `NotFound` is the uniform absence sentinel. `Io` and `Backend` carry the
/// native failure of the host filesystem or object store untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum StorageErrorKind {
    /// File, prefix or bucket does not exist
    #[display("Not found: {}", _0)]
    NotFound(String),
    /// Malformed input or a failed existence probe
    #[display("Invalid argument: {}", _0)]
    Invalid(String),
    /// Host filesystem error other than absence
    #[display("I/O error ({:?}): {}", kind, message)]
    Io {
        /// Native error kind reported by the host
        kind: std::io::ErrorKind,
        /// Native error message
        message: String,
    },
    /// Object store error other than absence
    #[display("Object store error: {}", _0)]
    Backend(String),
    /// Backend could not be constructed from its settings
    #[display("Invalid configuration: {}", _0)]
    InvalidConfig(String),
}

/// Storage error with location tracking.
///
/// # Examples
///
/// ```
/// use daguerre_error::{StorageError, StorageErrorKind};
///
/// let err = StorageError::new(StorageErrorKind::NotFound("/bucket/a.jpg".to_string()));
/// assert!(err.is_not_found());
/// assert!(format!("{}", err).contains("Not found"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Storage Error: {} at line {} in {}", kind, line, file)]
pub struct StorageError {
    /// The kind of error that occurred
    pub kind: StorageErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl StorageError {
    /// Create a new storage error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: StorageErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Shorthand for the not-found sentinel.
    #[track_caller]
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::new(StorageErrorKind::NotFound(path.into()))
    }

    /// Map a host I/O error, folding `NotFound` into the sentinel.
    #[track_caller]
    pub fn from_io(path: &str, err: &std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => Self::not_found(path),
            kind => Self::new(StorageErrorKind::Io {
                kind,
                message: format!("{}: {}", path, err),
            }),
        }
    }

    /// True when this is the not-found sentinel.
    pub fn is_not_found(&self) -> bool {
        matches!(self.kind, StorageErrorKind::NotFound(_))
    }
}

/// Result type for storage backend operations.
pub type StorageResult<T> = std::result::Result<T, StorageError>;
