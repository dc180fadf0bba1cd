//! SeaORM entity definitions for the channel catalog

pub mod prelude;

pub mod channel_sources;
pub mod channel_tags;
pub mod channels;
pub mod channels_tags_group;
pub mod epgs;
pub mod playlists;
