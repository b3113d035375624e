use anyhow::{Context, Result};
use clap::Parser;
use daguerre_server::{
    ApiState, CacheFill, CommandProcessor, DisabledProcessor, GalleryConfig, ManifestCatalog,
    MediaProcessor, ObservabilityConfig, create_router, init_observability,
};
use daguerre_storage::Repositories;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "Daguerre photo gallery media server", long_about = None)]
struct Args {
    /// Configuration file (merged over ./daguerre.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Socket address to listen on, overriding server.listen
    #[arg(short, long)]
    listen: Option<String>,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let mut config = GalleryConfig::load(args.config.as_deref())?;
    if let Some(listen) = args.listen {
        config = config.with_listen(listen);
    }

    let mut observability = ObservabilityConfig::from(config.log());
    if args.verbose {
        observability = observability.with_log_level("debug");
    }
    init_observability(&observability).map_err(|e| anyhow::anyhow!("{}", e))?;

    // A misconfigured object store is fatal.
    let repositories = Repositories::from_config(config.storage())?;

    let catalog = ManifestCatalog::load(config.catalog().manifest()).await?;

    let processor: Arc<dyn MediaProcessor> = match config.processor().program() {
        Some(program) => Arc::new(CommandProcessor::new(
            program.clone(),
            config.processor().args().clone(),
        )),
        None => {
            tracing::warn!("No media processor configured; missing artifacts cannot be regenerated");
            Arc::new(DisabledProcessor)
        }
    };

    let cache = CacheFill::new(repositories, processor)
        .with_single_flight(*config.server().single_flight());
    let app = create_router(ApiState::new(Arc::new(catalog), Arc::new(cache)));

    let listener = tokio::net::TcpListener::bind(config.server().listen())
        .await
        .with_context(|| format!("failed to bind {}", config.server().listen()))?;

    info!(
        listen = %config.server().listen(),
        object_store = *config.storage().object_store(),
        single_flight = *config.server().single_flight(),
        "Starting Daguerre media server"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    info!("Shutdown signal received");
}
