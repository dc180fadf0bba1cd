//! `CatalogStore` backed by the SeaORM repositories

use async_trait::async_trait;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

use super::{ChannelSeaOrmRepository, EpgSeaOrmRepository, PlaylistSeaOrmRepository};
use crate::database::repositories::traits::CatalogStore;
use crate::errors::AppResult;
use crate::models::{Channel, ChannelCommit, Epg, Playlist};

#[derive(Clone)]
pub struct SeaOrmCatalogStore {
    channels: ChannelSeaOrmRepository,
    playlists: PlaylistSeaOrmRepository,
    epgs: EpgSeaOrmRepository,
}

impl SeaOrmCatalogStore {
    pub fn new(connection: Arc<DatabaseConnection>) -> Self {
        Self {
            channels: ChannelSeaOrmRepository::new(connection.clone()),
            playlists: PlaylistSeaOrmRepository::new(connection.clone()),
            epgs: EpgSeaOrmRepository::new(connection),
        }
    }

    pub fn playlists(&self) -> &PlaylistSeaOrmRepository {
        &self.playlists
    }

    pub fn epgs(&self) -> &EpgSeaOrmRepository {
        &self.epgs
    }
}

#[async_trait]
impl CatalogStore for SeaOrmCatalogStore {
    async fn list_channels(&self) -> AppResult<Vec<Channel>> {
        self.channels.find_all().await
    }

    async fn find_channel(&self, id: i32) -> AppResult<Option<Channel>> {
        self.channels.find_by_id(id).await
    }

    async fn find_playlist(&self, id: i32) -> AppResult<Option<Playlist>> {
        self.playlists.find_by_id(id).await
    }

    async fn find_epg(&self, id: i32) -> AppResult<Option<Epg>> {
        self.epgs.find_by_id(id).await
    }

    async fn commit_channel(&self, commit: ChannelCommit) -> AppResult<Channel> {
        self.channels.commit(commit).await
    }

    async fn delete_channel(&self, id: i32) -> AppResult<()> {
        self.channels.delete(id).await
    }

    async fn link_source_mux(&self, source_id: i32, mux_uuid: &str) -> AppResult<()> {
        self.channels.link_source_mux(source_id, mux_uuid).await
    }

    async fn mark_mux_saved(&self, source_id: i32) -> AppResult<()> {
        self.channels.mark_mux_saved(source_id).await
    }
}
