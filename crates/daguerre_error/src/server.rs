//! Error types for the media-serving HTTP layer.

/// Error kinds for server operations.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, derive_more::Display)]
pub enum ServerErrorKind {
    /// Could not bind or run the listener
    #[display("Server failed: {}", _0)]
    Bind(String),

    /// Media catalog lookup failed
    #[display("Catalog error: {}", _0)]
    Catalog(String),

    /// Regenerating a derived artifact failed
    #[display("Media processing failed: {}", _0)]
    Processing(String),

    /// Authorization could not be evaluated
    #[display("Authorization error: {}", _0)]
    Authorization(String),
}

/// Error wrapper with location tracking.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Server Error: {} at line {} in {}", kind, line, file)]
pub struct ServerError {
    /// The error kind
    pub kind: ServerErrorKind,
    /// Line number where error occurred
    pub line: u32,
    /// File where error occurred
    pub file: &'static str,
}

impl ServerError {
    /// Create a new ServerError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: ServerErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
