use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::errors::AppResult;
use crate::services::ChannelSyncService;
use crate::sources::PlaylistCache;

/// Runs mux publishing and service mapping on their own intervals
pub struct SyncScheduler {
    sync: Arc<ChannelSyncService>,
    cache: Arc<PlaylistCache>,
    cache_path: PathBuf,
    mux_publish_interval: Duration,
    service_map_interval: Duration,
}

impl SyncScheduler {
    pub fn new(
        sync: Arc<ChannelSyncService>,
        cache: Arc<PlaylistCache>,
        config: &Config,
    ) -> AppResult<Self> {
        Ok(Self {
            sync,
            cache,
            cache_path: config.playlists.cache_path.clone(),
            mux_publish_interval: config.reconciliation.mux_publish_interval()?,
            service_map_interval: config.reconciliation.service_map_interval()?,
        })
    }

    /// Tick both timers until cancelled. Both fire once right away.
    pub async fn run(&self, cancellation_token: CancellationToken) -> AppResult<()> {
        info!(
            "Starting sync scheduler (mux publish every {}, service map every {})",
            humantime::format_duration(self.mux_publish_interval),
            humantime::format_duration(self.service_map_interval)
        );

        let mut mux_publish = interval(self.mux_publish_interval);
        mux_publish.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut service_map = interval(self.service_map_interval);
        service_map.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = cancellation_token.cancelled() => {
                    info!("Sync scheduler received cancellation signal, shutting down");
                    break;
                }
                _ = mux_publish.tick() => self.publish_muxes().await,
                _ = service_map.tick() => self.map_services().await,
            }
        }

        info!("Sync scheduler stopped");
        Ok(())
    }

    /// One mux publish followed by one service map
    pub async fn run_once(&self) {
        self.publish_muxes().await;
        self.map_services().await;
    }

    /// Reload playlist listings and run a reconciliation pass. Failures are logged.
    pub async fn publish_muxes(&self) {
        if let Err(e) = self.cache.reload_from_dir(&self.cache_path).await {
            warn!("Failed to reload playlist cache, using previous listings: {}", e);
        }

        match self.sync.run_reconciliation_pass().await {
            Ok(report) => debug!("Mux publish finished: {:?}", report),
            Err(e) => error!("Mux reconciliation pass failed: {}", e),
        }
    }

    /// Map services to channels, then clean up unnamed channels. Failures are logged.
    pub async fn map_services(&self) {
        if let Err(e) = self.sync.map_all_services().await {
            error!("Service mapping failed: {}", e);
        }
        if let Err(e) = self.sync.cleanup_sentinel_channels().await {
            error!("Unnamed channel cleanup failed: {}", e);
        }
    }
}
