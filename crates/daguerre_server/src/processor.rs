//! Regenerating derived artifacts.

use crate::MediaRef;
use daguerre_error::{DaguerreResult, ServerError, ServerErrorKind};

/// Media-processing collaborator.
///
/// Called synchronously on a cache miss; the request waits for it.
#[async_trait::async_trait]
pub trait MediaProcessor: Send + Sync {
    /// Regenerate every derived artifact of `media`.
    async fn reprocess(&self, media: &MediaRef) -> DaguerreResult<()>;
}

/// Runs an external program as `program [args...] <media id> <source path>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandProcessor {
    program: String,
    args: Vec<String>,
}

impl CommandProcessor {
    /// Create a processor for `program` with leading `args`.
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }
}

#[async_trait::async_trait]
impl MediaProcessor for CommandProcessor {
    #[tracing::instrument(skip(self), fields(program = %self.program, media = %media.id))]
    async fn reprocess(&self, media: &MediaRef) -> DaguerreResult<()> {
        let status = tokio::process::Command::new(&self.program)
            .args(&self.args)
            .arg(&media.id)
            .arg(&media.source_path)
            .status()
            .await
            .map_err(|e| {
                ServerError::new(ServerErrorKind::Processing(format!(
                    "failed to run {}: {}",
                    self.program, e
                )))
            })?;

        if !status.success() {
            return Err(ServerError::new(ServerErrorKind::Processing(format!(
                "{} exited with {}",
                self.program, status
            )))
            .into());
        }

        tracing::info!("Reprocessed media");
        Ok(())
    }
}

/// Stand-in used when no processing command is configured. Always fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DisabledProcessor;

#[async_trait::async_trait]
impl MediaProcessor for DisabledProcessor {
    async fn reprocess(&self, media: &MediaRef) -> DaguerreResult<()> {
        Err(ServerError::new(ServerErrorKind::Processing(format!(
            "no media processor configured, cannot regenerate {}",
            media.id
        )))
        .into())
    }
}
