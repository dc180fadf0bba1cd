use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "playlists")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub enabled: bool,
    pub name: String,
    pub url: String,
    /// Tvheadend network uuid, set once the playlist is provisioned as a network
    pub tvh_uuid: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::channel_sources::Entity")]
    ChannelSources,
}

impl Related<super::channel_sources::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ChannelSources.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
