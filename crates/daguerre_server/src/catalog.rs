//! Media lookup and authorization.
//!
//! The relational data model lives outside this crate; the HTTP layer only
//! needs to turn a media name into a cached artifact path and decide whether
//! the caller may see it.

use axum::http::{HeaderMap, StatusCode, header::AUTHORIZATION};
use daguerre_error::{DaguerreResult, ServerError, ServerErrorKind};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// A media item that owns derived artifacts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MediaRef {
    /// Stable identifier
    pub id: String,
    /// Path of the original file
    pub source_path: String,
}

/// One served URL of a media item, e.g. its thumbnail or high-res variant.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MediaUrl {
    /// Name requested over HTTP
    pub media_name: String,
    /// Owning media item
    pub media: MediaRef,
}

/// Outcome of an authorization check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Authorization {
    /// Caller may read the media
    Granted,
    /// Caller may not; answer with this status and body
    Denied {
        /// Response status
        status: StatusCode,
        /// Response body
        message: String,
    },
}

/// Data and authorization collaborator.
#[async_trait::async_trait]
pub trait MediaCatalog: Send + Sync {
    /// Resolve a requested name. Any error is answered with 404.
    async fn lookup(&self, media_name: &str) -> DaguerreResult<MediaUrl>;

    /// Decide whether the request may read `media`.
    async fn authorize(&self, media: &MediaRef, headers: &HeaderMap)
    -> DaguerreResult<Authorization>;

    /// Path of the cached artifact behind `url`.
    fn cached_path(&self, url: &MediaUrl) -> DaguerreResult<String>;
}

/// One manifest entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Media identifier
    pub id: String,
    /// Original file
    pub source: String,
    /// Cached artifact path (filesystem path or `/bucket/key`)
    #[serde(default)]
    pub cached: String,
    /// Share token required as `Authorization: Bearer <token>`
    #[serde(default)]
    pub token: Option<String>,
}

/// Static catalog read from a TOML manifest.
///
/// ```toml
/// [media."beach_highres.jpg"]
/// id = "42"
/// source = "/photos/2024/beach.jpg"
/// cached = "/cache/42/beach_highres.jpg"
///
/// [media."beach_thumbnail.jpg"]
/// id = "42"
/// source = "/photos/2024/beach.jpg"
/// cached = "/var/cache/daguerre/thumbnail/42.jpg"
/// token = "s3cret"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestCatalog {
    #[serde(default)]
    media: HashMap<String, ManifestEntry>,
}

impl ManifestCatalog {
    /// Parse a manifest from TOML text.
    pub fn from_toml(text: &str) -> DaguerreResult<Self> {
        toml::from_str(text).map_err(|e| {
            ServerError::new(ServerErrorKind::Catalog(format!("invalid manifest: {}", e))).into()
        })
    }

    /// Read a manifest file.
    #[tracing::instrument]
    pub async fn load(path: &Path) -> DaguerreResult<Self> {
        let text = tokio::fs::read_to_string(path).await.map_err(|e| {
            ServerError::new(ServerErrorKind::Catalog(format!(
                "reading {}: {}",
                path.display(),
                e
            )))
        })?;
        let catalog = Self::from_toml(&text)?;
        tracing::info!(entries = catalog.media.len(), "Loaded media manifest");
        Ok(catalog)
    }

    fn entry(&self, media_name: &str) -> DaguerreResult<&ManifestEntry> {
        self.media.get(media_name).ok_or_else(|| {
            ServerError::new(ServerErrorKind::Catalog(format!(
                "unknown media {}",
                media_name
            )))
            .into()
        })
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

#[async_trait::async_trait]
impl MediaCatalog for ManifestCatalog {
    async fn lookup(&self, media_name: &str) -> DaguerreResult<MediaUrl> {
        let entry = self.entry(media_name)?;
        Ok(MediaUrl {
            media_name: media_name.to_string(),
            media: MediaRef {
                id: entry.id.clone(),
                source_path: entry.source.clone(),
            },
        })
    }

    async fn authorize(
        &self,
        media: &MediaRef,
        headers: &HeaderMap,
    ) -> DaguerreResult<Authorization> {
        let required = self
            .media
            .values()
            .filter(|entry| entry.id == media.id)
            .find_map(|entry| entry.token.as_deref());

        match required {
            None => Ok(Authorization::Granted),
            Some(token) if bearer_token(headers) == Some(token) => Ok(Authorization::Granted),
            // Denials look like absence.
            Some(_) => Ok(Authorization::Denied {
                status: StatusCode::NOT_FOUND,
                message: "404".to_string(),
            }),
        }
    }

    fn cached_path(&self, url: &MediaUrl) -> DaguerreResult<String> {
        let entry = self.entry(&url.media_name)?;
        if entry.cached.is_empty() {
            return Err(ServerError::new(ServerErrorKind::Catalog(format!(
                "no cached path for {}",
                url.media_name
            )))
            .into());
        }
        Ok(entry.cached.clone())
    }
}
