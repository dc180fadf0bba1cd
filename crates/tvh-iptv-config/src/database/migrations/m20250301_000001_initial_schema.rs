use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create tables in order of dependencies
        self.create_playlists_table(manager).await?;
        self.create_epgs_table(manager).await?;
        self.create_channel_tags_table(manager).await?;
        self.create_channels_table(manager).await?;
        self.create_channels_tags_group_table(manager).await?;
        self.create_channel_sources_table(manager).await?;

        self.create_indexes(manager).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop tables in reverse order
        manager
            .drop_table(Table::drop().table(ChannelSources::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ChannelsTagsGroup::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Channels::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ChannelTags::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Epgs::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Playlists::Table).to_owned())
            .await?;

        Ok(())
    }
}

impl Migration {
    fn create_id_column(&self, column: impl IntoIden) -> ColumnDef {
        let mut col = ColumnDef::new(column);
        col.integer().not_null().auto_increment().primary_key();
        col
    }

    async fn create_playlists_table(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Playlists::Table)
                    .if_not_exists()
                    .col(self.create_id_column(Playlists::Id))
                    .col(
                        ColumnDef::new(Playlists::Enabled)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Playlists::Name).string().not_null())
                    .col(ColumnDef::new(Playlists::Url).string().not_null())
                    .col(ColumnDef::new(Playlists::TvhUuid).string())
                    .to_owned(),
            )
            .await
    }

    async fn create_epgs_table(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Epgs::Table)
                    .if_not_exists()
                    .col(self.create_id_column(Epgs::Id))
                    .col(
                        ColumnDef::new(Epgs::Enabled)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Epgs::Name).string().not_null())
                    .col(ColumnDef::new(Epgs::Url).string().not_null())
                    .to_owned(),
            )
            .await
    }

    async fn create_channel_tags_table(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ChannelTags::Table)
                    .if_not_exists()
                    .col(self.create_id_column(ChannelTags::Id))
                    .col(
                        ColumnDef::new(ChannelTags::Name)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn create_channels_table(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Channels::Table)
                    .if_not_exists()
                    .col(self.create_id_column(Channels::Id))
                    .col(
                        ColumnDef::new(Channels::Enabled)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Channels::Name).string().not_null())
                    .col(ColumnDef::new(Channels::LogoUrl).string())
                    .col(ColumnDef::new(Channels::Number).integer().not_null())
                    .col(ColumnDef::new(Channels::GuideId).integer())
                    .col(ColumnDef::new(Channels::GuideName).string())
                    .col(ColumnDef::new(Channels::GuideChannelId).string())
                    .col(
                        ColumnDef::new(Channels::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Channels::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_channels_guide_id")
                            .from(Channels::Table, Channels::GuideId)
                            .to(Epgs::Table, Epgs::Id)
                            .on_delete(ForeignKeyAction::SetNull)
                            .on_update(ForeignKeyAction::NoAction),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn create_channels_tags_group_table(
        &self,
        manager: &SchemaManager<'_>,
    ) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ChannelsTagsGroup::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ChannelsTagsGroup::ChannelId)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ChannelsTagsGroup::TagId).integer().not_null())
                    .primary_key(
                        Index::create()
                            .col(ChannelsTagsGroup::ChannelId)
                            .col(ChannelsTagsGroup::TagId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_channels_tags_group_channel_id")
                            .from(ChannelsTagsGroup::Table, ChannelsTagsGroup::ChannelId)
                            .to(Channels::Table, Channels::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::NoAction),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_channels_tags_group_tag_id")
                            .from(ChannelsTagsGroup::Table, ChannelsTagsGroup::TagId)
                            .to(ChannelTags::Table, ChannelTags::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::NoAction),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn create_channel_sources_table(
        &self,
        manager: &SchemaManager<'_>,
    ) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ChannelSources::Table)
                    .if_not_exists()
                    .col(self.create_id_column(ChannelSources::Id))
                    .col(ColumnDef::new(ChannelSources::ChannelId).integer().not_null())
                    .col(ColumnDef::new(ChannelSources::PlaylistId).integer().not_null())
                    .col(
                        ColumnDef::new(ChannelSources::PlaylistStreamName)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ChannelSources::PlaylistStreamUrl)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ChannelSources::Priority)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(ChannelSources::TvhUuid).string())
                    .col(
                        ColumnDef::new(ChannelSources::TvhScanPending)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_channel_sources_channel_id")
                            .from(ChannelSources::Table, ChannelSources::ChannelId)
                            .to(Channels::Table, Channels::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::NoAction),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_channel_sources_playlist_id")
                            .from(ChannelSources::Table, ChannelSources::PlaylistId)
                            .to(Playlists::Table, Playlists::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::NoAction),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn create_indexes(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        // One row per (channel, playlist, stream)
        manager
            .create_index(
                Index::create()
                    .name("idx_channel_sources_identity")
                    .table(ChannelSources::Table)
                    .col(ChannelSources::ChannelId)
                    .col(ChannelSources::PlaylistId)
                    .col(ChannelSources::PlaylistStreamName)
                    .unique()
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_channel_sources_tvh_uuid")
                    .table(ChannelSources::Table)
                    .col(ChannelSources::TvhUuid)
                    .if_not_exists()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_channels_number")
                    .table(Channels::Table)
                    .col(Channels::Number)
                    .if_not_exists()
                    .to_owned(),
            )
            .await
    }
}

#[derive(DeriveIden)]
enum Playlists {
    Table,
    Id,
    Enabled,
    Name,
    Url,
    TvhUuid,
}

#[derive(DeriveIden)]
enum Epgs {
    Table,
    Id,
    Enabled,
    Name,
    Url,
}

#[derive(DeriveIden)]
enum ChannelTags {
    Table,
    Id,
    Name,
}

#[derive(DeriveIden)]
enum Channels {
    Table,
    Id,
    Enabled,
    Name,
    LogoUrl,
    Number,
    GuideId,
    GuideName,
    GuideChannelId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ChannelsTagsGroup {
    Table,
    ChannelId,
    TagId,
}

#[derive(DeriveIden)]
enum ChannelSources {
    Table,
    Id,
    ChannelId,
    PlaylistId,
    PlaylistStreamName,
    PlaylistStreamUrl,
    Priority,
    TvhUuid,
    TvhScanPending,
}
