//! Storage settings.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};

/// Default S3-compatible endpoint.
pub const DEFAULT_ENDPOINT: &str = "localhost:9000";

/// Default substring that marks a cached path as a thumbnail.
pub const THUMBNAIL_MARKER: &str = "thumbnail";

/// Storage backend configuration.
///
/// Read once when the [`crate::Repositories`] selector is built.
///
/// # Example
///
/// ```toml
/// [storage]
/// object_store = true
/// endpoint = "minio.internal:9000"
/// access_key = "gallery"
/// secret_key = "change-me"
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Getters,
    derive_setters::Setters,
    derive_builder::Builder,
)]
#[setters(prefix = "with_")]
#[builder(setter(into), default)]
#[serde(default)]
pub struct StorageConfig {
    /// Serve data from the object store instead of the host filesystem
    object_store: bool,
    /// Endpoint host, optionally with scheme
    endpoint: String,
    /// Access key id
    access_key: String,
    /// Secret access key
    secret_key: String,
    /// Signing region
    region: String,
    /// Use HTTPS when the endpoint carries no scheme
    secure: bool,
    /// Cached paths containing this substring are read from the host filesystem
    thumbnail_marker: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            object_store: false,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            access_key: String::new(),
            secret_key: String::new(),
            region: "us-east-1".to_string(),
            secure: false,
            thumbnail_marker: THUMBNAIL_MARKER.to_string(),
        }
    }
}
