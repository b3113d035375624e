//! Regenerate-and-retry around reading a cached artifact.
//!
//! One request moves through:
//!
//! ```text
//! STAT ─ found ───────────────────────────────► serve
//!   └─ missing ─► REGENERATE ─ ok ─► RESTAT ─ found ─► serve
//!                     │                 └─ missing ─► fail
//!                     └─ error ─► fail
//! ```
//!
//! Regeneration runs inline and is attempted at most once per request. By
//! default two concurrent misses on one artifact regenerate it twice; with
//! single-flight enabled the second request waits for the first and re-stats
//! instead.

use crate::{InFlight, MediaProcessor, MediaRef};
use daguerre_error::{DaguerreError, StorageError};
use daguerre_storage::{RepositoryReader, Repositories};
use std::sync::Arc;

/// Why a cached artifact could not be made available.
#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum CacheFillError {
    /// Stat failed with something other than not-found
    #[display("stat of cached media failed ({}): {}", path, source)]
    Stat {
        /// Cached path
        path: String,
        /// Backend error
        source: StorageError,
    },
    /// The media processor failed
    #[display("processing media not found in cache ({}): {}", path, source)]
    Regenerate {
        /// Cached path
        path: String,
        /// Processor error
        source: DaguerreError,
    },
    /// Processing succeeded but the artifact is still absent
    #[display("after reprocessing media not found in cache ({}): {}", path, source)]
    StillMissing {
        /// Cached path
        path: String,
        /// Result of the second stat
        source: StorageError,
    },
}

/// A cached artifact known to exist, with the backend that holds it.
#[derive(Debug, Clone)]
pub struct CachedArtifact {
    /// Backend chosen for the cached path
    pub reader: Arc<dyn RepositoryReader>,
    /// Whether this request regenerated it
    pub regenerated: bool,
}

/// Cache-fill orchestrator.
pub struct CacheFill {
    repositories: Repositories,
    processor: Arc<dyn MediaProcessor>,
    in_flight: Option<InFlight>,
}

impl CacheFill {
    /// Create an orchestrator without single-flight.
    pub fn new(repositories: Repositories, processor: Arc<dyn MediaProcessor>) -> Self {
        Self {
            repositories,
            processor,
            in_flight: None,
        }
    }

    /// Let concurrent misses on one path share a single regeneration.
    ///
    /// This changes behaviour: without it every miss regenerates.
    pub fn with_single_flight(mut self, enabled: bool) -> Self {
        self.in_flight = enabled.then(InFlight::new);
        self
    }

    /// Backend selector used for cached paths.
    pub fn repositories(&self) -> &Repositories {
        &self.repositories
    }

    /// Make sure `cached_path` exists, regenerating `media` once if it does not.
    #[tracing::instrument(skip(self, media), fields(media = %media.id))]
    pub async fn ensure(
        &self,
        media: &MediaRef,
        cached_path: &str,
    ) -> Result<CachedArtifact, CacheFillError> {
        let reader = self.repositories.for_cached_path(cached_path);
        if Self::present(reader.as_ref(), cached_path).await? {
            return Ok(CachedArtifact {
                reader,
                regenerated: false,
            });
        }

        match &self.in_flight {
            None => self.regenerate(reader, media, cached_path).await,
            Some(in_flight) => {
                let _guard = in_flight.acquire(cached_path).await;
                // Another request may have filled it while we waited.
                if Self::present(reader.as_ref(), cached_path).await? {
                    tracing::debug!(backend = %reader.backend(), "Cache filled by concurrent request");
                    return Ok(CachedArtifact {
                        reader,
                        regenerated: false,
                    });
                }
                self.regenerate(reader, media, cached_path).await
            }
        }
    }

    async fn present(reader: &dyn RepositoryReader, cached_path: &str) -> Result<bool, CacheFillError> {
        match reader.stat(cached_path).await {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(source) => Err(CacheFillError::Stat {
                path: cached_path.to_string(),
                source,
            }),
        }
    }

    async fn regenerate(
        &self,
        reader: Arc<dyn RepositoryReader>,
        media: &MediaRef,
        cached_path: &str,
    ) -> Result<CachedArtifact, CacheFillError> {
        tracing::info!(backend = %reader.backend(), "Cached media missing, reprocessing");

        self.processor
            .reprocess(media)
            .await
            .map_err(|source| CacheFillError::Regenerate {
                path: cached_path.to_string(),
                source,
            })?;

        match reader.stat(cached_path).await {
            Ok(_) => Ok(CachedArtifact {
                reader,
                regenerated: true,
            }),
            Err(source) => Err(CacheFillError::StillMissing {
                path: cached_path.to_string(),
                source,
            }),
        }
    }
}

impl std::fmt::Debug for CacheFill {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheFill")
            .field("repositories", &self.repositories)
            .field("single_flight", &self.in_flight.is_some())
            .finish_non_exhaustive()
    }
}
