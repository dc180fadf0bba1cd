//! SeaORM-based Channel repository implementation
//!
//! A channel is an aggregate: the channel row, its tag links and its sources
//! are always read together and written together in one transaction.

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

use crate::entities::{
    channel_sources, channel_tags, channels, channels_tags_group, playlists,
    prelude::{ChannelSources, ChannelTags, Channels, ChannelsTagsGroup, Playlists},
};
use crate::errors::{AppError, AppResult};
use crate::models::{
    Channel, ChannelCommit, ChannelGuide, ChannelSource, PlannedSource, SourcePlaylist,
};

/// SeaORM-based repository for Channel operations
#[derive(Clone)]
pub struct ChannelSeaOrmRepository {
    connection: Arc<DatabaseConnection>,
}

impl ChannelSeaOrmRepository {
    /// Create a new repository instance
    pub fn new(connection: Arc<DatabaseConnection>) -> Self {
        Self { connection }
    }

    /// Find all channels with tags and sources
    pub async fn find_all(&self) -> AppResult<Vec<Channel>> {
        let models = Channels::find()
            .order_by_asc(channels::Column::Id)
            .all(&*self.connection)
            .await?;
        Self::hydrate(&*self.connection, models).await
    }

    /// Find a channel by ID with tags and sources
    pub async fn find_by_id(&self, id: i32) -> AppResult<Option<Channel>> {
        let Some(model) = Channels::find_by_id(id).one(&*self.connection).await? else {
            return Ok(None);
        };
        Ok(Self::hydrate(&*self.connection, vec![model]).await?.pop())
    }

    /// Write a channel aggregate atomically
    ///
    /// Orphaned sources are deleted, reused sources keep their row (and mux
    /// uuid) with an updated priority, new sources are inserted. Nothing is
    /// visible to other readers until the transaction commits.
    pub async fn commit(&self, commit: ChannelCommit) -> AppResult<Channel> {
        let txn = self.connection.begin().await?;
        let now = Utc::now();

        let channel_id = match commit.channel_id {
            Some(id) => {
                let existing = Channels::find_by_id(id)
                    .one(&txn)
                    .await?
                    .ok_or_else(|| AppError::not_found("Channel", id))?;
                let mut active_model: channels::ActiveModel = existing.into();
                active_model.enabled = Set(commit.enabled);
                active_model.name = Set(commit.name.clone());
                active_model.logo_url = Set(commit.logo_url.clone());
                active_model.number = Set(commit.number);
                if let Some(guide) = &commit.guide {
                    active_model.guide_id = Set(Some(guide.epg_id));
                    active_model.guide_name = Set(guide.epg_name.clone());
                    active_model.guide_channel_id = Set(guide.channel_id.clone());
                }
                active_model.updated_at = Set(now);
                active_model.update(&txn).await?;
                id
            }
            None => {
                let guide = commit.guide.as_ref();
                let active_model = channels::ActiveModel {
                    enabled: Set(commit.enabled),
                    name: Set(commit.name.clone()),
                    logo_url: Set(commit.logo_url.clone()),
                    number: Set(commit.number),
                    guide_id: Set(guide.map(|g| g.epg_id)),
                    guide_name: Set(guide.and_then(|g| g.epg_name.clone())),
                    guide_channel_id: Set(guide.and_then(|g| g.channel_id.clone())),
                    created_at: Set(now),
                    updated_at: Set(now),
                    ..Default::default()
                };
                active_model.insert(&txn).await?.id
            }
        };

        Self::replace_tags(&txn, channel_id, &commit.tags).await?;
        Self::replace_sources(
            &txn,
            channel_id,
            &commit.sources,
            &commit.orphaned_source_ids,
        )
        .await?;

        txn.commit().await?;
        debug!(
            "Committed channel {} with {} sources ({} orphaned rows removed)",
            channel_id,
            commit.sources.len(),
            commit.orphaned_source_ids.len()
        );

        self.find_by_id(channel_id)
            .await?
            .ok_or_else(|| AppError::not_found("Channel", channel_id))
    }

    /// Delete a channel, its sources and its tag links
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let txn = self.connection.begin().await?;

        if Channels::find_by_id(id).one(&txn).await?.is_none() {
            return Err(AppError::not_found("Channel", id));
        }

        ChannelSources::delete_many()
            .filter(channel_sources::Column::ChannelId.eq(id))
            .exec(&txn)
            .await?;
        ChannelsTagsGroup::delete_many()
            .filter(channels_tags_group::Column::ChannelId.eq(id))
            .exec(&txn)
            .await?;
        Channels::delete_by_id(id).exec(&txn).await?;

        txn.commit().await?;
        Ok(())
    }

    /// Store the uuid of a freshly created mux; it stays scan-pending until
    /// [`Self::mark_mux_saved`]
    pub async fn link_source_mux(&self, source_id: i32, mux_uuid: &str) -> AppResult<()> {
        let result = ChannelSources::update_many()
            .col_expr(channel_sources::Column::TvhUuid, Expr::value(mux_uuid))
            .col_expr(channel_sources::Column::TvhScanPending, Expr::value(true))
            .filter(channel_sources::Column::Id.eq(source_id))
            .exec(&*self.connection)
            .await?;

        if result.rows_affected == 0 {
            return Err(AppError::not_found("ChannelSource", source_id));
        }
        Ok(())
    }

    pub async fn mark_mux_saved(&self, source_id: i32) -> AppResult<()> {
        let result = ChannelSources::update_many()
            .col_expr(channel_sources::Column::TvhScanPending, Expr::value(false))
            .filter(channel_sources::Column::Id.eq(source_id))
            .exec(&*self.connection)
            .await?;

        if result.rows_affected == 0 {
            return Err(AppError::not_found("ChannelSource", source_id));
        }
        Ok(())
    }

    async fn replace_tags(
        txn: &DatabaseTransaction,
        channel_id: i32,
        tags: &[String],
    ) -> AppResult<()> {
        ChannelsTagsGroup::delete_many()
            .filter(channels_tags_group::Column::ChannelId.eq(channel_id))
            .exec(txn)
            .await?;

        for name in tags {
            let existing = ChannelTags::find()
                .filter(channel_tags::Column::Name.eq(name.as_str()))
                .one(txn)
                .await?;
            let tag_id = match existing {
                Some(tag) => tag.id,
                None => {
                    let tag = channel_tags::ActiveModel {
                        name: Set(name.clone()),
                        ..Default::default()
                    };
                    tag.insert(txn).await?.id
                }
            };

            ChannelsTagsGroup::insert(channels_tags_group::ActiveModel {
                channel_id: Set(channel_id),
                tag_id: Set(tag_id),
            })
            .exec_without_returning(txn)
            .await?;
        }
        Ok(())
    }

    async fn replace_sources(
        txn: &DatabaseTransaction,
        channel_id: i32,
        sources: &[PlannedSource],
        orphaned_source_ids: &[i32],
    ) -> AppResult<()> {
        // Orphans go first so the identity index never sees a transient duplicate
        if !orphaned_source_ids.is_empty() {
            ChannelSources::delete_many()
                .filter(channel_sources::Column::ChannelId.eq(channel_id))
                .filter(channel_sources::Column::Id.is_in(orphaned_source_ids.to_vec()))
                .exec(txn)
                .await?;
        }

        for (position, planned) in sources.iter().enumerate() {
            let priority = position as i32;
            match planned {
                PlannedSource::Reuse(source) => {
                    ChannelSources::update_many()
                        .col_expr(channel_sources::Column::Priority, Expr::value(priority))
                        .filter(channel_sources::Column::Id.eq(source.id))
                        .filter(channel_sources::Column::ChannelId.eq(channel_id))
                        .exec(txn)
                        .await?;
                }
                PlannedSource::Create(source) => {
                    let active_model = channel_sources::ActiveModel {
                        channel_id: Set(channel_id),
                        playlist_id: Set(source.playlist_id),
                        playlist_stream_name: Set(source.stream_name.clone()),
                        playlist_stream_url: Set(source.stream_url.clone()),
                        priority: Set(priority),
                        tvh_uuid: Set(None),
                        tvh_scan_pending: Set(false),
                        ..Default::default()
                    };
                    active_model.insert(txn).await?;
                }
            }
        }
        Ok(())
    }

    /// Load tags and sources for a batch of channel rows
    async fn hydrate<C: ConnectionTrait>(
        conn: &C,
        models: Vec<channels::Model>,
    ) -> AppResult<Vec<Channel>> {
        if models.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<i32> = models.iter().map(|m| m.id).collect();

        let source_rows = ChannelSources::find()
            .filter(channel_sources::Column::ChannelId.is_in(ids.clone()))
            .order_by_asc(channel_sources::Column::Priority)
            .order_by_asc(channel_sources::Column::Id)
            .find_also_related(Playlists)
            .all(conn)
            .await?;

        let mut sources_by_channel: HashMap<i32, Vec<ChannelSource>> = HashMap::new();
        for (source, playlist) in source_rows {
            let playlist = playlist.ok_or_else(|| {
                AppError::internal(format!(
                    "channel source {} references missing playlist {}",
                    source.id, source.playlist_id
                ))
            })?;
            sources_by_channel
                .entry(source.channel_id)
                .or_default()
                .push(Self::source_to_domain(source, playlist));
        }

        let tag_rows = ChannelsTagsGroup::find()
            .filter(channels_tags_group::Column::ChannelId.is_in(ids))
            .find_also_related(ChannelTags)
            .order_by_asc(channel_tags::Column::Name)
            .all(conn)
            .await?;

        let mut tags_by_channel: HashMap<i32, Vec<String>> = HashMap::new();
        for (link, tag) in tag_rows {
            if let Some(tag) = tag {
                tags_by_channel
                    .entry(link.channel_id)
                    .or_default()
                    .push(tag.name);
            }
        }

        Ok(models
            .into_iter()
            .map(|model| {
                let sources = sources_by_channel.remove(&model.id).unwrap_or_default();
                let tags = tags_by_channel.remove(&model.id).unwrap_or_default();
                Self::model_to_domain(model, tags, sources)
            })
            .collect())
    }

    fn source_to_domain(
        model: channel_sources::Model,
        playlist: playlists::Model,
    ) -> ChannelSource {
        ChannelSource {
            id: model.id,
            channel_id: model.channel_id,
            playlist: SourcePlaylist {
                id: playlist.id,
                name: playlist.name,
                tvh_uuid: playlist.tvh_uuid,
            },
            stream_name: model.playlist_stream_name,
            stream_url: model.playlist_stream_url,
            priority: model.priority,
            tvh_uuid: model.tvh_uuid,
            tvh_scan_pending: model.tvh_scan_pending,
        }
    }

    /// Convert SeaORM model to domain model
    fn model_to_domain(
        model: channels::Model,
        tags: Vec<String>,
        sources: Vec<ChannelSource>,
    ) -> Channel {
        let guide = model.guide_id.map(|epg_id| ChannelGuide {
            epg_id,
            epg_name: model.guide_name,
            channel_id: model.guide_channel_id,
        });

        Channel {
            id: model.id,
            enabled: model.enabled,
            name: model.name,
            logo_url: model.logo_url,
            number: model.number,
            tags,
            guide,
            sources,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
