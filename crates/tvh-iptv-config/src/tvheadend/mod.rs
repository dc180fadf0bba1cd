//! External tuner boundary
//!
//! [`TunerClient`] is the capability set the reconciliation core consumes
//! from Tvheadend; [`TvheadendClient`] implements it over the Tvheadend JSON
//! API. Tests substitute fakes or the generated `MockTunerClient`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::TunerResult;

pub mod client;

pub use client::TvheadendClient;

/// Display name Tvheadend gives channels it created without a name
pub const SENTINEL_CHANNEL_NAME: &str = "{name-not-set}";

/// Scan state value asking Tvheadend to scan a mux as soon as possible
pub const SCAN_STATE_PENDING: u8 = 1;

/// A multiplex as listed by Tvheadend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MuxEntry {
    pub uuid: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub network_uuid: Option<String>,
}

/// A channel entity as listed by Tvheadend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TunerChannel {
    pub uuid: String,
    #[serde(default)]
    pub name: String,
}

/// Mux configuration pushed through `idnode/save`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MuxConfig {
    pub enabled: bool,
    pub uuid: String,
    pub iptv_url: String,
    pub iptv_icon: String,
    /// Channel display name
    pub iptv_sname: String,
    /// "<playlist name> - <stream name>"
    pub iptv_muxname: String,
    pub channel_number: i32,
    pub iptv_epgid: String,
    /// Only present on first provisioning
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scan_state: Option<u8>,
}

/// Operations the reconciliation core needs from the tuner backend
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TunerClient: Send + Sync {
    async fn list_all_muxes(&self) -> TunerResult<Vec<MuxEntry>>;

    /// Whether a mux with this uuid currently exists.
    ///
    /// Scans the full mux list; implementations with a direct lookup should
    /// override it.
    async fn mux_exists(&self, uuid: &str) -> TunerResult<bool> {
        Ok(self
            .list_all_muxes()
            .await?
            .iter()
            .any(|mux| mux.uuid == uuid))
    }

    /// Create an empty mux under a network, returning the new mux uuid
    async fn network_mux_create(&self, network_uuid: &str) -> TunerResult<String>;

    /// Idempotent upsert of a mux's configuration
    async fn idnode_save(&self, config: &MuxConfig) -> TunerResult<()>;

    async fn delete_mux(&self, uuid: &str) -> TunerResult<()>;

    /// Ask Tvheadend to map every known service to a channel
    async fn map_all_services_to_channels(&self) -> TunerResult<()>;

    async fn list_all_channels(&self) -> TunerResult<Vec<TunerChannel>>;

    async fn delete_channels(&self, uuid: &str) -> TunerResult<()>;
}
