//! Domain types for the channel catalog
//!
//! These are the shapes the services work with; the SeaORM entities in
//! `crate::entities` are converted at the repository boundary.

use serde::{Deserialize, Serialize};

pub mod channel;
pub mod playlist;

pub use channel::*;
pub use playlist::*;

/// Identity of a channel source within its channel: `(playlist id, stream name)`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SourceKey {
    pub playlist_id: i32,
    pub stream_name: String,
}

impl SourceKey {
    pub fn new<S: Into<String>>(playlist_id: i32, stream_name: S) -> Self {
        Self {
            playlist_id,
            stream_name: stream_name.into(),
        }
    }
}

impl std::fmt::Display for SourceKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.playlist_id, self.stream_name)
    }
}
