use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tvh_iptv_config::{
    config::Config,
    database::{Database, repositories::SeaOrmCatalogStore},
    job_scheduling::SyncScheduler,
    services::ChannelSyncService,
    sources::PlaylistCache,
    tvheadend::TvheadendClient,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Parser)]
#[command(name = "tvh-iptv-config")]
#[command(version)]
#[command(about = "Keeps Tvheadend IPTV muxes in step with a channel catalog")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Database URL (overrides config file)
    #[arg(short = 'd', long, value_name = "URL")]
    database_url: Option<String>,

    /// Tvheadend base URL (overrides config file)
    #[arg(short = 't', long, value_name = "URL")]
    tvheadend_url: Option<String>,

    /// Log level
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,

    #[arg(long, value_enum, default_value = "text")]
    log_format: LogFormat,

    /// Run one reconciliation, service mapping and cleanup, then exit
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("tvh_iptv_config={}", cli.log_level).into());
    let registry = tracing_subscriber::registry().with(filter);
    match cli.log_format {
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
    }

    info!("Starting tvh-iptv-config v{}", env!("CARGO_PKG_VERSION"));

    let mut config = Config::load_from_file(&cli.config)?;
    info!("Configuration loaded from: {}", cli.config);

    if let Some(database_url) = cli.database_url {
        config.database.url = database_url;
    }
    if let Some(tvheadend_url) = cli.tvheadend_url {
        config.tvheadend.url = tvheadend_url;
    }
    config.validate()?;

    let database = Database::new(&config.database).await?;
    database.migrate().await?;
    info!("Database connection established and migrations applied");

    let store = Arc::new(SeaOrmCatalogStore::new(database.connection()));
    let tuner = Arc::new(TvheadendClient::new(&config.tvheadend)?);
    let cache = Arc::new(PlaylistCache::new());
    info!("Using Tvheadend at {}", config.tvheadend.url);

    let sync = Arc::new(ChannelSyncService::new(
        store,
        tuner,
        cache.clone(),
        &config,
    )?);
    let scheduler = SyncScheduler::new(sync, cache, &config)?;

    if cli.once {
        scheduler.run_once().await;
        info!("Single run complete");
        return Ok(());
    }

    let cancellation_token = CancellationToken::new();
    let shutdown_token = cancellation_token.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Received shutdown signal");
                shutdown_token.cancel();
            }
            Err(e) => warn!("Failed to listen for shutdown signal: {}", e),
        }
    });

    scheduler.run(cancellation_token).await?;
    info!("Shutdown complete");
    Ok(())
}
