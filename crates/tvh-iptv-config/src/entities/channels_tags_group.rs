use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Junction between channels and their tags
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "channels_tags_group")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub channel_id: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub tag_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::channels::Entity",
        from = "Column::ChannelId",
        to = "super::channels::Column::Id",
        on_delete = "Cascade"
    )]
    Channels,
    #[sea_orm(
        belongs_to = "super::channel_tags::Entity",
        from = "Column::TagId",
        to = "super::channel_tags::Column::Id",
        on_delete = "Cascade"
    )]
    ChannelTags,
}

impl Related<super::channels::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Channels.def()
    }
}

impl Related<super::channel_tags::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ChannelTags.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
