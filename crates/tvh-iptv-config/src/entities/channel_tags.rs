use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "channel_tags")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::channels_tags_group::Entity")]
    ChannelsTagsGroup,
}

impl Related<super::channels_tags_group::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ChannelsTagsGroup.def()
    }
}

impl Related<super::channels::Entity> for Entity {
    fn to() -> RelationDef {
        super::channels_tags_group::Relation::Channels.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::channels_tags_group::Relation::ChannelTags.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
