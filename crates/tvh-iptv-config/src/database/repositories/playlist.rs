//! SeaORM-based Playlist repository implementation

use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use std::sync::Arc;

use crate::entities::{playlists, prelude::Playlists};
use crate::errors::{AppError, AppResult};
use crate::models::{Playlist, PlaylistCreateRequest};

/// SeaORM-based repository for Playlist operations
#[derive(Clone)]
pub struct PlaylistSeaOrmRepository {
    connection: Arc<DatabaseConnection>,
}

impl PlaylistSeaOrmRepository {
    pub fn new(connection: Arc<DatabaseConnection>) -> Self {
        Self { connection }
    }

    pub async fn create(&self, request: PlaylistCreateRequest) -> AppResult<Playlist> {
        let active_model = playlists::ActiveModel {
            enabled: Set(request.enabled),
            name: Set(request.name),
            url: Set(request.url),
            tvh_uuid: Set(request.tvh_uuid),
            ..Default::default()
        };

        let model = active_model.insert(&*self.connection).await?;
        Ok(Self::model_to_domain(model))
    }

    pub async fn find_by_id(&self, id: i32) -> AppResult<Option<Playlist>> {
        let model = Playlists::find_by_id(id).one(&*self.connection).await?;
        Ok(model.map(Self::model_to_domain))
    }

    /// Record (or clear) the Tvheadend network uuid of a playlist
    pub async fn set_network_uuid(&self, id: i32, network_uuid: Option<String>) -> AppResult<()> {
        let model = Playlists::find_by_id(id)
            .one(&*self.connection)
            .await?
            .ok_or_else(|| AppError::not_found("Playlist", id))?;

        let mut active_model: playlists::ActiveModel = model.into();
        active_model.tvh_uuid = Set(network_uuid);
        active_model.update(&*self.connection).await?;
        Ok(())
    }

    fn model_to_domain(model: playlists::Model) -> Playlist {
        Playlist {
            id: model.id,
            enabled: model.enabled,
            name: model.name,
            url: model.url,
            tvh_uuid: model.tvh_uuid,
        }
    }
}
