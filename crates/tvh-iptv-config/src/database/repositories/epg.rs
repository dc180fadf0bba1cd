//! SeaORM-based EPG repository implementation

use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use std::sync::Arc;

use crate::entities::{epgs, prelude::Epgs};
use crate::errors::AppResult;
use crate::models::{Epg, EpgCreateRequest};

#[derive(Clone)]
pub struct EpgSeaOrmRepository {
    connection: Arc<DatabaseConnection>,
}

impl EpgSeaOrmRepository {
    pub fn new(connection: Arc<DatabaseConnection>) -> Self {
        Self { connection }
    }

    pub async fn create(&self, request: EpgCreateRequest) -> AppResult<Epg> {
        let active_model = epgs::ActiveModel {
            enabled: Set(true),
            name: Set(request.name),
            url: Set(request.url),
            ..Default::default()
        };

        let model = active_model.insert(&*self.connection).await?;
        Ok(Self::model_to_domain(model))
    }

    pub async fn find_by_id(&self, id: i32) -> AppResult<Option<Epg>> {
        let model = Epgs::find_by_id(id).one(&*self.connection).await?;
        Ok(model.map(Self::model_to_domain))
    }

    fn model_to_domain(model: epgs::Model) -> Epg {
        Epg {
            id: model.id,
            enabled: model.enabled,
            name: model.name,
            url: model.url,
        }
    }
}
