//! Operator-facing channel mutations: settle (create or update) and delete

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::source_diff::plan_sources;
use crate::database::repositories::CatalogStore;
use crate::errors::{AppError, AppResult};
use crate::models::{Channel, ChannelCommit, ChannelSettleRequest, ChannelSource};
use crate::sources::SourceResolver;
use crate::tvheadend::TunerClient;
use crate::utils::{RetryConfig, with_retry};

/// Settles channels in the catalog and releases the muxes of dropped sources
pub struct ChannelService {
    store: Arc<dyn CatalogStore>,
    tuner: Arc<dyn TunerClient>,
    resolver: Arc<dyn SourceResolver>,
    retry: RetryConfig,
}

impl ChannelService {
    pub fn new(
        store: Arc<dyn CatalogStore>,
        tuner: Arc<dyn TunerClient>,
        resolver: Arc<dyn SourceResolver>,
        retry: RetryConfig,
    ) -> Self {
        Self {
            store,
            tuner,
            resolver,
            retry,
        }
    }

    pub async fn list_channels(&self) -> AppResult<Vec<Channel>> {
        self.store.list_channels().await
    }

    pub async fn get_channel(&self, id: i32) -> AppResult<Channel> {
        self.store
            .find_channel(id)
            .await?
            .ok_or_else(|| AppError::not_found("Channel", id))
    }

    /// Create or update a channel and replace its sources.
    ///
    /// Every check that can reject the request runs before anything is
    /// changed. Muxes of orphaned sources are then deleted on Tvheadend, and
    /// only when all of them are gone is the new channel state committed.
    pub async fn settle_channel(&self, request: ChannelSettleRequest) -> AppResult<Channel> {
        let name = request.name.trim();
        if name.is_empty() {
            return Err(AppError::validation("channel name must not be empty"));
        }

        let existing_sources = match request.id {
            Some(id) => self.get_channel(id).await?.sources,
            None => Vec::new(),
        };

        let guide = request.guide.as_ref().and_then(|guide| guide.binding());
        if let Some(guide) = &guide {
            if self.store.find_epg(guide.epg_id).await?.is_none() {
                return Err(AppError::not_found("Epg", guide.epg_id));
            }
        }

        let playlist_ids: BTreeSet<i32> = request.sources.iter().map(|s| s.playlist_id).collect();
        for playlist_id in playlist_ids {
            if self.store.find_playlist(playlist_id).await?.is_none() {
                return Err(AppError::not_found("Playlist", playlist_id));
            }
        }

        let diff = plan_sources(&existing_sources, &request.sources, self.resolver.as_ref())?;
        debug!(
            "Channel '{}': {} sources reused, {} created, {} orphaned",
            name,
            diff.reused().count(),
            diff.created().count(),
            diff.orphaned.len()
        );

        self.release_muxes(&diff.orphaned).await?;

        let commit = ChannelCommit {
            channel_id: request.id,
            enabled: request.enabled,
            name: name.to_string(),
            logo_url: request.logo_url.clone(),
            number: request.number,
            tags: dedupe_tags(&request.tags),
            guide,
            orphaned_source_ids: diff.orphaned_ids(),
            sources: diff.planned,
        };

        let channel = self.store.commit_channel(commit).await?;
        info!(
            "Settled channel {} '{}' with {} sources",
            channel.id,
            channel.name,
            channel.sources.len()
        );
        Ok(channel)
    }

    /// Delete a channel, releasing the muxes of all its sources first
    pub async fn delete_channel(&self, id: i32) -> AppResult<()> {
        let channel = self.get_channel(id).await?;
        self.release_muxes(&channel.sources).await?;
        self.store.delete_channel(id).await?;
        info!("Deleted channel {} '{}'", channel.id, channel.name);
        Ok(())
    }

    /// Delete the Tvheadend mux of each source that has one, retrying
    /// transient failures. Stops at the first definitive failure.
    ///
    /// A mux Tvheadend no longer knows counts as released.
    async fn release_muxes(&self, sources: &[ChannelSource]) -> AppResult<()> {
        for source in sources {
            let Some(uuid) = source.tvh_uuid.as_deref().filter(|uuid| !uuid.is_empty()) else {
                continue;
            };
            let released = with_retry(
                &self.retry,
                || self.tuner.delete_mux(uuid),
                "delete_mux",
                |e| e.is_transient(),
            )
            .await;
            match released {
                Ok(()) => debug!("Released mux {} of source {}", uuid, source.key()),
                Err(e) if e.is_not_found() => warn!(
                    "Mux {} of source {} was already gone from Tvheadend",
                    uuid,
                    source.key()
                ),
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }
}

/// Trimmed, non-empty tag names, first occurrence wins
fn dedupe_tags(tags: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    tags.iter()
        .map(|tag| tag.trim())
        .filter(|tag| !tag.is_empty() && seen.insert(tag.to_string()))
        .map(str::to_string)
        .collect()
}
