use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use book_tracker::books::service::BookTrackerService;
use book_tracker::modules;
use tracker_kernel::settings::{LoadOptions, Settings};
use tracker_kernel::{InitCtx, ModuleRegistry};

/// Book tracking HTTP service
#[derive(Debug, Parser)]
#[command(name = "book-tracker", version, about)]
struct Cli {
    /// Directory holding `base.toml` and the per-environment overlays
    #[arg(long, env = "BOOK_TRACKER_CONFIG_DIR")]
    config_dir: Option<PathBuf>,

    /// Deployment environment: local, staging or production
    #[arg(long = "env", env = "BOOK_TRACKER_ENV")]
    environment: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load_with(LoadOptions {
        config_dir: cli.config_dir,
        environment: cli.environment,
    })
    .context("failed to load book tracker settings")?;

    tracker_telemetry::init(&settings.telemetry)?;

    tracing::info!(
        env = ?settings.environment,
        db = %settings.database.endpoint,
        "book-tracker bootstrap starting"
    );

    let storage = tracker_db::connect(&settings.database).await?;
    let tracker = BookTrackerService::new(storage, tracing::info_span!("book_tracker"));

    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, Arc::new(tracker));

    let ctx = InitCtx {
        settings: &settings,
    };
    registry.init_all(&ctx).await?;
    registry.start_all(&ctx).await?;

    tracing::info!("book-tracker bootstrap complete");

    let served = tracker_http::start_server(&registry, &settings).await;
    registry.stop_all().await?;
    served
}
