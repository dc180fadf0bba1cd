//! Stream source resolution
//!
//! The resolver answers "what is the current URL and display metadata of
//! stream X in playlist Y" from a cached provider listing. It never fetches
//! anything itself.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

pub mod iptv_url;
pub mod playlist_cache;

pub use iptv_url::generate_iptv_url;
pub use playlist_cache::PlaylistCache;

/// Attribute key carrying the stream's logo in M3U listings
pub const LOGO_ATTRIBUTE: &str = "tvg-logo";

/// One stream in a provider listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamEntry {
    pub url: String,
    #[serde(default)]
    pub attributes: HashMap<String, String>,
}

impl StreamEntry {
    pub fn icon_url(&self) -> &str {
        self.attributes
            .get(LOGO_ATTRIBUTE)
            .map(String::as_str)
            .unwrap_or("")
    }
}

/// Stream name to entry, as last cached for a playlist
pub type PlaylistListing = HashMap<String, StreamEntry>;

/// Read-only lookup of cached provider listings
pub trait SourceResolver: Send + Sync {
    /// The cached listing of a playlist, `None` when nothing is cached
    fn listing(&self, playlist_id: i32) -> Option<Arc<PlaylistListing>>;

    fn lookup(&self, playlist_id: i32, stream_name: &str) -> Option<StreamEntry> {
        self.listing(playlist_id)
            .and_then(|listing| listing.get(stream_name).cloned())
    }
}
