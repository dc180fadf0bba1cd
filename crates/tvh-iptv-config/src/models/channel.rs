use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{SourceKey, SourcePlaylist};

/// A logical channel with its tags, guide binding and ordered sources
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub id: i32,
    pub enabled: bool,
    pub name: String,
    pub logo_url: Option<String>,
    /// UI ordering and the EPG id pushed to Tvheadend
    pub number: i32,
    pub tags: Vec<String>,
    pub guide: Option<ChannelGuide>,
    pub sources: Vec<ChannelSource>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelGuide {
    pub epg_id: i32,
    pub epg_name: Option<String>,
    pub channel_id: Option<String>,
}

/// A stored stream source of a channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelSource {
    pub id: i32,
    pub channel_id: i32,
    pub playlist: SourcePlaylist,
    pub stream_name: String,
    /// Stream URL captured when the source was created
    pub stream_url: String,
    pub priority: i32,
    /// Tvheadend mux uuid once provisioned
    pub tvh_uuid: Option<String>,
    /// Set while the linked mux still needs its first save and scan
    pub tvh_scan_pending: bool,
}

impl ChannelSource {
    pub fn key(&self) -> SourceKey {
        SourceKey::new(self.playlist.id, self.stream_name.clone())
    }

    /// Name of the Tvheadend service/mux for this source
    pub fn service_name(&self) -> String {
        format!("{} - {}", self.playlist.name, self.stream_name)
    }
}

/// A source that does not exist yet; its URL has just been resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewChannelSource {
    pub playlist_id: i32,
    pub stream_name: String,
    pub stream_url: String,
}

/// One requested source in an operator's settle request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRequest {
    pub playlist_id: i32,
    pub stream_name: String,
}

impl SourceRequest {
    pub fn key(&self) -> SourceKey {
        SourceKey::new(self.playlist_id, self.stream_name.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelGuideRequest {
    pub epg_id: Option<i32>,
    pub epg_name: Option<String>,
    pub channel_id: Option<String>,
}

/// Create (no `id`) or update (with `id`) a channel and settle its sources
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelSettleRequest {
    #[serde(default)]
    pub id: Option<i32>,
    pub enabled: bool,
    pub name: String,
    pub logo_url: Option<String>,
    pub number: i32,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub guide: Option<ChannelGuideRequest>,
    #[serde(default)]
    pub sources: Vec<SourceRequest>,
}

impl ChannelGuideRequest {
    /// The binding to store, if the request names an EPG
    pub fn binding(&self) -> Option<ChannelGuide> {
        self.epg_id.map(|epg_id| ChannelGuide {
            epg_id,
            epg_name: self.epg_name.clone(),
            channel_id: self.channel_id.clone(),
        })
    }
}

/// A source position in the committed list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlannedSource {
    /// Keep the stored row (and its mux uuid)
    Reuse(ChannelSource),
    /// Insert a new row
    Create(NewChannelSource),
}

impl PlannedSource {
    pub fn key(&self) -> SourceKey {
        match self {
            Self::Reuse(source) => source.key(),
            Self::Create(source) => SourceKey::new(source.playlist_id, source.stream_name.clone()),
        }
    }
}

/// Everything the store writes for one channel in a single transaction
#[derive(Debug, Clone)]
pub struct ChannelCommit {
    /// `None` inserts a new channel
    pub channel_id: Option<i32>,
    pub enabled: bool,
    pub name: String,
    pub logo_url: Option<String>,
    pub number: i32,
    /// De-duplicated tag names; the stored set is replaced
    pub tags: Vec<String>,
    /// `Some` replaces the guide binding, `None` leaves it alone
    pub guide: Option<ChannelGuide>,
    /// Final source list in declaration order
    pub sources: Vec<PlannedSource>,
    /// Stored rows to delete; their muxes are already released
    pub orphaned_source_ids: Vec<i32>,
}
