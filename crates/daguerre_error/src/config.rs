//! Configuration error types.

/// Stage of configuration loading that failed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::Display)]
pub enum ConfigErrorKind {
    /// A source could not be read or merged (missing explicit file, bad syntax)
    #[display("cannot load configuration: {}", _0)]
    Load(String),
    /// Merged values do not fit the settings types
    #[display("cannot interpret configuration: {}", _0)]
    Parse(String),
    /// A value is well-formed but unusable
    #[display("invalid setting {}: {}", key, reason)]
    Invalid {
        /// Dotted key, e.g. `server.listen`
        key: String,
        /// What is wrong with it
        reason: String,
    },
}

/// Configuration error with source location.
///
/// # Examples
///
/// ```
/// use daguerre_error::{ConfigError, ConfigErrorKind};
///
/// let err = ConfigError::new(ConfigErrorKind::Invalid {
///     key: "storage.endpoint".to_string(),
///     reason: "empty".to_string(),
/// });
/// assert!(err.to_string().contains("storage.endpoint"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Configuration Error: {} at line {} in {}", kind, line, file)]
pub struct ConfigError {
    /// What went wrong
    pub kind: ConfigErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// File where the error occurred
    pub file: &'static str,
}

impl ConfigError {
    /// Create a new ConfigError at the current location.
    #[track_caller]
    pub fn new(kind: ConfigErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}
