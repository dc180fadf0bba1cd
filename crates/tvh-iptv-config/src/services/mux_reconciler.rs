//! Mux reconciliation
//!
//! Walks every enabled channel and each of its sources in stored order and
//! makes sure a Tvheadend mux exists, carries the current configuration and
//! is linked back to the source. Progress is durable per source: a new mux
//! uuid is committed as soon as Tvheadend hands it out, so an interrupted or
//! timed out pass resumes without provisioning a second mux. A linked mux
//! stays scan-pending in the catalog until its first save succeeds.
//!
//! The per-source timeout bounds the existence check and the save. Mux
//! creation is bounded by the HTTP client alone, and store writes are never
//! cancelled.
//!
//! The pass never deletes muxes. Disabled channels are left alone, and muxes
//! no source tracks are not touched.

use serde::Serialize;
use std::sync::Arc;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::config::StreamBufferConfig;
use crate::database::repositories::CatalogStore;
use crate::errors::{AppResult, TunerError, TunerResult};
use crate::models::{Channel, ChannelSource};
use crate::sources::{SourceResolver, generate_iptv_url};
use crate::tvheadend::{MuxConfig, SCAN_STATE_PENDING, TunerClient};

/// Counters describing one reconciliation pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconciliationReport {
    pub channels_visited: usize,
    pub channels_disabled: usize,
    /// Sources whose mux configuration was pushed
    pub sources_linked: usize,
    pub muxes_created: usize,
    /// Stored mux uuids that no longer existed on Tvheadend
    pub drift_repaired: usize,
    /// Sources skipped for a missing prerequisite
    pub sources_skipped: usize,
    /// Sources that hit an error or timed out
    pub sources_failed: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SourceOutcome {
    Skipped,
    Linked { created: bool, drift_repaired: bool },
}

impl ReconciliationReport {
    fn record(&mut self, outcome: SourceOutcome) {
        match outcome {
            SourceOutcome::Skipped => self.sources_skipped += 1,
            SourceOutcome::Linked {
                created,
                drift_repaired,
            } => {
                self.sources_linked += 1;
                if created {
                    self.muxes_created += 1;
                }
                if drift_repaired {
                    self.drift_repaired += 1;
                }
            }
        }
    }
}

pub struct MuxReconciler {
    store: Arc<dyn CatalogStore>,
    tuner: Arc<dyn TunerClient>,
    resolver: Arc<dyn SourceResolver>,
    stream_buffer: StreamBufferConfig,
    source_timeout: Duration,
}

impl MuxReconciler {
    pub fn new(
        store: Arc<dyn CatalogStore>,
        tuner: Arc<dyn TunerClient>,
        resolver: Arc<dyn SourceResolver>,
        stream_buffer: StreamBufferConfig,
        source_timeout: Duration,
    ) -> Self {
        Self {
            store,
            tuner,
            resolver,
            stream_buffer,
            source_timeout,
        }
    }

    /// Run one pass over the whole catalog.
    ///
    /// Only failing to read the catalog fails the pass; per-source errors
    /// and timeouts are logged and counted.
    pub async fn run(&self) -> AppResult<ReconciliationReport> {
        let channels = self.store.list_channels().await?;
        let mut report = ReconciliationReport::default();

        for channel in &channels {
            if !channel.enabled {
                debug!("Skipping disabled channel {} '{}'", channel.id, channel.name);
                report.channels_disabled += 1;
                continue;
            }
            report.channels_visited += 1;

            for source in &channel.sources {
                let deadline = Instant::now() + self.source_timeout;
                match self.reconcile_source(channel, source, deadline).await {
                    Ok(outcome) => report.record(outcome),
                    Err(e) => {
                        warn!(
                            "Failed to reconcile source {} of channel '{}': {}",
                            source.key(),
                            channel.name,
                            e
                        );
                        report.sources_failed += 1;
                    }
                }
            }
        }

        info!(
            "Mux reconciliation finished: {} channels ({} disabled), {} sources linked, {} muxes created, {} drift repairs, {} skipped, {} failed",
            report.channels_visited,
            report.channels_disabled,
            report.sources_linked,
            report.muxes_created,
            report.drift_repaired,
            report.sources_skipped,
            report.sources_failed
        );
        Ok(report)
    }

    async fn reconcile_source(
        &self,
        channel: &Channel,
        source: &ChannelSource,
        deadline: Instant,
    ) -> AppResult<SourceOutcome> {
        let Some(listing) = self.resolver.listing(source.playlist.id) else {
            warn!(
                "Playlist {} has no cached listing, skipping source {}",
                source.playlist.id,
                source.key()
            );
            return Ok(SourceOutcome::Skipped);
        };
        let Some(entry) = listing.get(&source.stream_name) else {
            warn!(
                "Stream '{}' is no longer listed by playlist {}, skipping",
                source.stream_name, source.playlist.id
            );
            return Ok(SourceOutcome::Skipped);
        };

        let Some(network_uuid) = source
            .playlist
            .tvh_uuid
            .as_deref()
            .filter(|uuid| !uuid.is_empty())
        else {
            warn!(
                "Playlist {} '{}' has no Tvheadend network yet, skipping source {}",
                source.playlist.id,
                source.playlist.name,
                source.key()
            );
            return Ok(SourceOutcome::Skipped);
        };

        let mut mux_uuid = source
            .tvh_uuid
            .clone()
            .filter(|uuid| !uuid.is_empty());
        let mut drift_repaired = false;
        if let Some(uuid) = &mux_uuid {
            if !bounded(deadline, "mux_exists", self.tuner.mux_exists(uuid)).await? {
                warn!(
                    "Mux {} of source {} is gone from Tvheadend, provisioning a new one",
                    uuid,
                    source.key()
                );
                mux_uuid = None;
                drift_repaired = true;
            }
        }

        let created = mux_uuid.is_none();
        let (mux_uuid, scan_pending) = match mux_uuid {
            Some(uuid) => (uuid, source.tvh_scan_pending),
            None => {
                let uuid = self.tuner.network_mux_create(network_uuid).await?;
                info!("Created mux {} for source {}", uuid, source.key());
                self.store.link_source_mux(source.id, &uuid).await?;
                debug!("Linked source {} to mux {}", source.key(), uuid);
                (uuid, true)
            }
        };

        let service_name = source.service_name();
        let config = MuxConfig {
            enabled: channel.enabled,
            uuid: mux_uuid,
            iptv_url: generate_iptv_url(&self.stream_buffer, &entry.url, &service_name),
            iptv_icon: entry.icon_url().to_string(),
            iptv_sname: channel.name.clone(),
            iptv_muxname: service_name,
            channel_number: channel.number,
            iptv_epgid: channel.number.to_string(),
            scan_state: scan_pending.then_some(SCAN_STATE_PENDING),
        };
        bounded(deadline, "idnode_save", self.tuner.idnode_save(&config)).await?;

        if scan_pending {
            self.store.mark_mux_saved(source.id).await?;
        }

        Ok(SourceOutcome::Linked {
            created,
            drift_repaired,
        })
    }
}

/// Run a tuner call, giving up once the source's deadline has passed
async fn bounded<T>(
    deadline: Instant,
    operation: &'static str,
    call: impl Future<Output = TunerResult<T>>,
) -> TunerResult<T> {
    tokio::time::timeout_at(deadline, call)
        .await
        .unwrap_or(Err(TunerError::Timeout { operation }))
}
