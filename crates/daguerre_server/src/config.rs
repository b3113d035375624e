//! Server configuration.
//!
//! Sources, later ones overriding earlier ones:
//! 1. Built-in defaults
//! 2. `./daguerre.toml` (optional)
//! 3. An explicit file passed on the command line
//! 4. Environment variables: `DAGUERRE_STORAGE__OBJECT_STORE=true`,
//!    `DAGUERRE_SERVER__LISTEN=0.0.0.0:8080`, ...

use config::{Config, Environment, File, FileFormat};
use daguerre_error::{ConfigError, ConfigErrorKind, DaguerreResult};
use daguerre_storage::StorageConfig;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
#[serde(default)]
pub struct ServerSettings {
    /// Socket address to bind
    listen: String,
    /// Share one regeneration between concurrent misses on the same artifact
    single_flight: bool,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            listen: "0.0.0.0:4001".to_string(),
            single_flight: false,
        }
    }
}

/// Media catalog settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
#[serde(default)]
pub struct CatalogSettings {
    /// TOML manifest of served media
    manifest: PathBuf,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            manifest: PathBuf::from("media.toml"),
        }
    }
}

/// External regeneration command.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Getters)]
#[serde(default)]
pub struct ProcessorSettings {
    /// Program to run; regeneration always fails when unset
    program: Option<String>,
    /// Arguments placed before the media id and source path
    args: Vec<String>,
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
#[serde(default)]
pub struct LogSettings {
    /// Filter directive used when `RUST_LOG` is unset
    level: String,
    /// Emit JSON lines
    json: bool,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Complete server configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Getters)]
#[serde(default)]
pub struct GalleryConfig {
    /// Storage backends
    storage: StorageConfig,
    /// HTTP listener
    server: ServerSettings,
    /// Media catalog
    catalog: CatalogSettings,
    /// Regeneration command
    processor: ProcessorSettings,
    /// Logging
    log: LogSettings,
}

impl GalleryConfig {
    /// Load configuration from the default sources plus an optional file.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicit file is missing or any source fails to parse.
    pub fn load(path: Option<&Path>) -> DaguerreResult<Self> {
        let mut builder = Config::builder().add_source(File::with_name("daguerre").required(false));

        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }

        builder = builder.add_source(
            Environment::with_prefix("DAGUERRE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        Self::finish(builder)
    }

    /// Parse configuration from TOML text alone.
    pub fn from_toml(text: &str) -> DaguerreResult<Self> {
        Self::finish(Config::builder().add_source(File::from_str(text, FileFormat::Toml)))
    }

    fn finish(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> DaguerreResult<Self> {
        let config: Self = builder
            .build()
            .map_err(|e| ConfigError::new(ConfigErrorKind::Load(e.to_string())))?
            .try_deserialize()
            .map_err(|e| ConfigError::new(ConfigErrorKind::Parse(e.to_string())))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        // An empty marker is contained in every path and would send all reads to disk.
        if self.storage.thumbnail_marker().is_empty() {
            return Err(ConfigError::new(ConfigErrorKind::Invalid {
                key: "storage.thumbnail_marker".to_string(),
                reason: "must not be empty".to_string(),
            }));
        }
        if self.server.listen.trim().is_empty() {
            return Err(ConfigError::new(ConfigErrorKind::Invalid {
                key: "server.listen".to_string(),
                reason: "must not be empty".to_string(),
            }));
        }
        Ok(())
    }

    /// Replace the listen address.
    pub fn with_listen(mut self, listen: impl Into<String>) -> Self {
        self.server.listen = listen.into();
        self
    }
}
