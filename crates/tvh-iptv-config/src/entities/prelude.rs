pub use super::channel_sources::Entity as ChannelSources;
pub use super::channel_tags::Entity as ChannelTags;
pub use super::channels::Entity as Channels;
pub use super::channels_tags_group::Entity as ChannelsTagsGroup;
pub use super::epgs::Entity as Epgs;
pub use super::playlists::Entity as Playlists;
