use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "channels")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub enabled: bool,
    pub name: String,
    pub logo_url: Option<String>,
    pub number: i32,
    pub guide_id: Option<i32>,
    pub guide_name: Option<String>,
    pub guide_channel_id: Option<String>,
    pub created_at: ChronoDateTimeUtc,
    pub updated_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::channel_sources::Entity")]
    ChannelSources,
    #[sea_orm(has_many = "super::channels_tags_group::Entity")]
    ChannelsTagsGroup,
    #[sea_orm(
        belongs_to = "super::epgs::Entity",
        from = "Column::GuideId",
        to = "super::epgs::Column::Id",
        on_delete = "SetNull"
    )]
    Epgs,
}

impl Related<super::channel_sources::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ChannelSources.def()
    }
}

impl Related<super::channels_tags_group::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ChannelsTagsGroup.def()
    }
}

impl Related<super::channel_tags::Entity> for Entity {
    fn to() -> RelationDef {
        super::channels_tags_group::Relation::ChannelTags.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::channels_tags_group::Relation::Channels.def().rev())
    }
}

impl Related<super::epgs::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Epgs.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
