use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playlist {
    pub id: i32,
    pub enabled: bool,
    pub name: String,
    pub url: String,
    /// Tvheadend network uuid
    pub tvh_uuid: Option<String>,
}

/// The slice of a playlist a channel source needs for reconciliation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourcePlaylist {
    pub id: i32,
    pub name: String,
    pub tvh_uuid: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistCreateRequest {
    pub name: String,
    pub url: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    pub tvh_uuid: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Epg {
    pub id: i32,
    pub enabled: bool,
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpgCreateRequest {
    pub name: String,
    pub url: String,
}

fn default_enabled() -> bool {
    true
}
