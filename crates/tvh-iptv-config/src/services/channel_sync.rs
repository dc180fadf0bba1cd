//! Entry point the API layer and the scheduler drive the core through
//!
//! All passes that write a source's mux uuid, or delete what it points at,
//! run one at a time behind a single lock.

use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

use super::{ChannelService, MuxReconciler, ReconciliationReport, SentinelCleanup};
use crate::config::Config;
use crate::database::repositories::CatalogStore;
use crate::errors::AppResult;
use crate::models::{Channel, ChannelSettleRequest};
use crate::sources::SourceResolver;
use crate::tvheadend::TunerClient;
use crate::utils::RetryConfig;

pub struct ChannelSyncService {
    channels: ChannelService,
    reconciler: MuxReconciler,
    cleanup: SentinelCleanup,
    tuner: Arc<dyn TunerClient>,
    lock: Mutex<()>,
}

impl ChannelSyncService {
    pub fn new(
        store: Arc<dyn CatalogStore>,
        tuner: Arc<dyn TunerClient>,
        resolver: Arc<dyn SourceResolver>,
        config: &Config,
    ) -> AppResult<Self> {
        let retry = RetryConfig::from_settings(&config.retry)?;
        let source_timeout = config.reconciliation.source_timeout()?;

        Ok(Self {
            channels: ChannelService::new(store.clone(), tuner.clone(), resolver.clone(), retry),
            reconciler: MuxReconciler::new(
                store,
                tuner.clone(),
                resolver,
                config.stream_buffer.clone(),
                source_timeout,
            ),
            cleanup: SentinelCleanup::new(tuner.clone()),
            tuner,
            lock: Mutex::new(()),
        })
    }

    pub async fn list_channels(&self) -> AppResult<Vec<Channel>> {
        self.channels.list_channels().await
    }

    pub async fn get_channel(&self, id: i32) -> AppResult<Channel> {
        self.channels.get_channel(id).await
    }

    pub async fn settle_channel(&self, request: ChannelSettleRequest) -> AppResult<Channel> {
        let _guard = self.lock.lock().await;
        self.channels.settle_channel(request).await
    }

    pub async fn delete_channel(&self, id: i32) -> AppResult<()> {
        let _guard = self.lock.lock().await;
        self.channels.delete_channel(id).await
    }

    pub async fn run_reconciliation_pass(&self) -> AppResult<ReconciliationReport> {
        let _guard = self.lock.lock().await;
        self.reconciler.run().await
    }

    pub async fn cleanup_sentinel_channels(&self) -> AppResult<usize> {
        let _guard = self.lock.lock().await;
        self.cleanup.run().await
    }

    /// Trigger Tvheadend's bulk service to channel mapping
    pub async fn map_all_services(&self) -> AppResult<()> {
        self.tuner.map_all_services_to_channels().await?;
        info!("Requested mapping of all services to channels");
        Ok(())
    }
}
