//! The catalog store seam between the reconciliation core and persistence

use async_trait::async_trait;

use crate::errors::AppResult;
use crate::models::{Channel, ChannelCommit, Epg, Playlist};

/// Durable storage for channels, their sources and tags, playlists and EPGs.
///
/// Channel reads are eager: tags, guide binding and sources (with their
/// playlist) come back together, sources in declaration order.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// All channels ordered by id
    async fn list_channels(&self) -> AppResult<Vec<Channel>>;

    async fn find_channel(&self, id: i32) -> AppResult<Option<Channel>>;

    async fn find_playlist(&self, id: i32) -> AppResult<Option<Playlist>>;

    async fn find_epg(&self, id: i32) -> AppResult<Option<Epg>>;

    /// Write channel fields, tags and the full source list in one transaction
    async fn commit_channel(&self, commit: ChannelCommit) -> AppResult<Channel>;

    /// Delete a channel together with its sources and tag links
    async fn delete_channel(&self, id: i32) -> AppResult<()>;

    /// Record the uuid of a mux just created for a source and flag it as
    /// awaiting its first save; committed immediately
    async fn link_source_mux(&self, source_id: i32, mux_uuid: &str) -> AppResult<()>;

    /// Clear the awaiting-first-save flag once the mux configuration is saved
    async fn mark_mux_saved(&self, source_id: i32) -> AppResult<()>;
}
