//! Shared fixtures for integration tests
//!
//! The catalog is the real SeaORM store on in-memory SQLite. Tvheadend is a
//! [`RecordingTuner`] that keeps a set of muxes and channels in memory and
//! records every call. Store writes and tuner calls can share one
//! [`EventLog`] to assert their relative order.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tvh_iptv_config::config::{Config, DatabaseConfig};
use tvh_iptv_config::database::Database;
use tvh_iptv_config::database::repositories::{CatalogStore, SeaOrmCatalogStore};
use tvh_iptv_config::errors::{AppError, AppResult, TunerError, TunerResult};
use tvh_iptv_config::models::{
    Channel, ChannelCommit, ChannelSettleRequest, Epg, Playlist, PlaylistCreateRequest,
    SourceRequest,
};
use tvh_iptv_config::services::ChannelSyncService;
use tvh_iptv_config::sources::{PlaylistCache, PlaylistListing, StreamEntry};
use tvh_iptv_config::tvheadend::{MuxConfig, MuxEntry, TunerChannel, TunerClient};

pub type EventLog = Arc<Mutex<Vec<String>>>;

fn push(events: &EventLog, event: String) {
    events.lock().unwrap().push(event);
}

pub async fn test_database() -> Database {
    let database = Database::new(&DatabaseConfig {
        url: "sqlite::memory:".to_string(),
        max_connections: Some(1),
    })
    .await
    .expect("in-memory database");
    database.migrate().await.expect("migrations");
    database
}

/// Default config with millisecond retry delays
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.retry.initial_delay = "1ms".to_string();
    config.retry.max_delay = "2ms".to_string();
    config
}

pub fn stream(url: &str, logo: Option<&str>) -> StreamEntry {
    let mut attributes = HashMap::new();
    if let Some(logo) = logo {
        attributes.insert("tvg-logo".to_string(), logo.to_string());
    }
    StreamEntry {
        url: url.to_string(),
        attributes,
    }
}

pub fn source(playlist_id: i32, stream_name: &str) -> SourceRequest {
    SourceRequest {
        playlist_id,
        stream_name: stream_name.to_string(),
    }
}

pub fn settle_request(name: &str, number: i32, sources: Vec<SourceRequest>) -> ChannelSettleRequest {
    ChannelSettleRequest {
        id: None,
        enabled: true,
        name: name.to_string(),
        logo_url: None,
        number,
        tags: Vec::new(),
        guide: None,
        sources,
    }
}

/// Recorded Tvheadend call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TunerCall {
    ListMuxes,
    CreateMux { network_uuid: String },
    Save(MuxConfig),
    DeleteMux(String),
    MapServices,
    ListChannels,
    DeleteChannel(String),
}

#[derive(Default)]
struct TunerState {
    muxes: Vec<String>,
    channels: Vec<TunerChannel>,
    calls: Vec<TunerCall>,
    delete_failures: usize,
    delete_failure_status: u16,
    save_delay: Option<Duration>,
}

/// In-memory Tvheadend that records every call
pub struct RecordingTuner {
    state: Mutex<TunerState>,
    next_mux: AtomicUsize,
    events: EventLog,
}

impl RecordingTuner {
    pub fn new(events: EventLog) -> Self {
        Self {
            state: Mutex::new(TunerState::default()),
            next_mux: AtomicUsize::new(1),
            events,
        }
    }

    pub fn add_mux(&self, uuid: &str) {
        self.state.lock().unwrap().muxes.push(uuid.to_string());
    }

    /// Drop a mux as if deleted by hand in the Tvheadend UI
    pub fn remove_mux(&self, uuid: &str) {
        self.state.lock().unwrap().muxes.retain(|m| m != uuid);
    }

    pub fn muxes(&self) -> Vec<String> {
        self.state.lock().unwrap().muxes.clone()
    }

    pub fn set_channels(&self, channels: Vec<TunerChannel>) {
        self.state.lock().unwrap().channels = channels;
    }

    pub fn channels(&self) -> Vec<TunerChannel> {
        self.state.lock().unwrap().channels.clone()
    }

    /// Fail the next `times` mux deletes with the given HTTP status
    pub fn fail_deletes(&self, times: usize, status: u16) {
        let mut state = self.state.lock().unwrap();
        state.delete_failures = times;
        state.delete_failure_status = status;
    }

    pub fn delay_saves(&self, delay: Duration) {
        self.state.lock().unwrap().save_delay = Some(delay);
    }

    pub fn clear_save_delay(&self) {
        self.state.lock().unwrap().save_delay = None;
    }

    pub fn calls(&self) -> Vec<TunerCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    pub fn creates(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, TunerCall::CreateMux { .. }))
            .count()
    }

    pub fn saves(&self) -> Vec<MuxConfig> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                TunerCall::Save(config) => Some(config),
                _ => None,
            })
            .collect()
    }

    pub fn deletes(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                TunerCall::DeleteMux(uuid) => Some(uuid),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: TunerCall) {
        self.state.lock().unwrap().calls.push(call);
    }
}

#[async_trait]
impl TunerClient for RecordingTuner {
    async fn list_all_muxes(&self) -> TunerResult<Vec<MuxEntry>> {
        self.record(TunerCall::ListMuxes);
        Ok(self
            .muxes()
            .into_iter()
            .map(|uuid| MuxEntry {
                uuid,
                name: None,
                network_uuid: None,
            })
            .collect())
    }

    async fn network_mux_create(&self, network_uuid: &str) -> TunerResult<String> {
        self.record(TunerCall::CreateMux {
            network_uuid: network_uuid.to_string(),
        });
        let uuid = format!("mux-{}", self.next_mux.fetch_add(1, Ordering::SeqCst));
        self.add_mux(&uuid);
        push(&self.events, format!("tuner:create:{uuid}"));
        Ok(uuid)
    }

    async fn idnode_save(&self, config: &MuxConfig) -> TunerResult<()> {
        let delay = self.state.lock().unwrap().save_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.record(TunerCall::Save(config.clone()));
        Ok(())
    }

    async fn delete_mux(&self, uuid: &str) -> TunerResult<()> {
        self.record(TunerCall::DeleteMux(uuid.to_string()));
        {
            let mut state = self.state.lock().unwrap();
            if state.delete_failures > 0 {
                state.delete_failures -= 1;
                return Err(TunerError::Status {
                    operation: "delete_mux",
                    status: state.delete_failure_status,
                    body: "simulated failure".to_string(),
                });
            }
            if !state.muxes.iter().any(|m| m == uuid) {
                return Err(TunerError::Status {
                    operation: "delete_mux",
                    status: 404,
                    body: format!("mux {uuid} not found"),
                });
            }
            state.muxes.retain(|m| m != uuid);
        }
        push(&self.events, format!("tuner:delete_mux:{uuid}"));
        Ok(())
    }

    async fn map_all_services_to_channels(&self) -> TunerResult<()> {
        self.record(TunerCall::MapServices);
        Ok(())
    }

    async fn list_all_channels(&self) -> TunerResult<Vec<TunerChannel>> {
        self.record(TunerCall::ListChannels);
        Ok(self.channels())
    }

    async fn delete_channels(&self, uuid: &str) -> TunerResult<()> {
        self.record(TunerCall::DeleteChannel(uuid.to_string()));
        self.state
            .lock()
            .unwrap()
            .channels
            .retain(|channel| channel.uuid != uuid);
        Ok(())
    }
}

/// Catalog store wrapper that logs writes and can fail links after a budget
pub struct RecordingStore {
    inner: Arc<SeaOrmCatalogStore>,
    events: EventLog,
    link_budget: Mutex<Option<usize>>,
}

impl RecordingStore {
    pub fn new(inner: Arc<SeaOrmCatalogStore>, events: EventLog) -> Self {
        Self {
            inner,
            events,
            link_budget: Mutex::new(None),
        }
    }

    /// Allow `links` more source links, then fail every further one
    pub fn crash_after_links(&self, links: usize) {
        *self.link_budget.lock().unwrap() = Some(links);
    }

    pub fn recover(&self) {
        *self.link_budget.lock().unwrap() = None;
    }
}

#[async_trait]
impl CatalogStore for RecordingStore {
    async fn list_channels(&self) -> AppResult<Vec<Channel>> {
        self.inner.list_channels().await
    }

    async fn find_channel(&self, id: i32) -> AppResult<Option<Channel>> {
        self.inner.find_channel(id).await
    }

    async fn find_playlist(&self, id: i32) -> AppResult<Option<Playlist>> {
        self.inner.find_playlist(id).await
    }

    async fn find_epg(&self, id: i32) -> AppResult<Option<Epg>> {
        self.inner.find_epg(id).await
    }

    async fn commit_channel(&self, commit: ChannelCommit) -> AppResult<Channel> {
        let channel = self.inner.commit_channel(commit).await?;
        push(&self.events, format!("store:commit:{}", channel.id));
        Ok(channel)
    }

    async fn delete_channel(&self, id: i32) -> AppResult<()> {
        self.inner.delete_channel(id).await?;
        push(&self.events, format!("store:delete:{id}"));
        Ok(())
    }

    async fn link_source_mux(&self, source_id: i32, mux_uuid: &str) -> AppResult<()> {
        {
            let mut budget = self.link_budget.lock().unwrap();
            if let Some(remaining) = budget.as_mut() {
                if *remaining == 0 {
                    return Err(AppError::internal("simulated crash"));
                }
                *remaining -= 1;
            }
        }
        self.inner.link_source_mux(source_id, mux_uuid).await?;
        push(&self.events, format!("store:link:{source_id}:{mux_uuid}"));
        Ok(())
    }

    async fn mark_mux_saved(&self, source_id: i32) -> AppResult<()> {
        self.inner.mark_mux_saved(source_id).await?;
        push(&self.events, format!("store:saved:{source_id}"));
        Ok(())
    }
}

/// Everything a core test needs, wired together
pub struct Harness {
    pub database: Database,
    pub catalog: Arc<SeaOrmCatalogStore>,
    pub store: Arc<RecordingStore>,
    pub tuner: Arc<RecordingTuner>,
    pub cache: Arc<PlaylistCache>,
    pub events: EventLog,
    pub sync: ChannelSyncService,
}

impl Harness {
    pub async fn new() -> Self {
        Self::with_config(test_config()).await
    }

    pub async fn with_config(config: Config) -> Self {
        let database = test_database().await;
        let events: EventLog = Arc::new(Mutex::new(Vec::new()));
        let catalog = Arc::new(SeaOrmCatalogStore::new(database.connection()));
        let store = Arc::new(RecordingStore::new(catalog.clone(), events.clone()));
        let tuner = Arc::new(RecordingTuner::new(events.clone()));
        let cache = Arc::new(PlaylistCache::new());
        let sync = ChannelSyncService::new(store.clone(), tuner.clone(), cache.clone(), &config)
            .expect("sync service");

        Self {
            database,
            catalog,
            store,
            tuner,
            cache,
            events,
            sync,
        }
    }

    /// A playlist with a Tvheadend network and a cached listing of `streams`
    pub async fn playlist(&self, name: &str, network_uuid: Option<&str>, streams: &[&str]) -> Playlist {
        let playlist = self
            .catalog
            .playlists()
            .create(PlaylistCreateRequest {
                name: name.to_string(),
                url: format!("http://provider/{name}.m3u"),
                enabled: true,
                tvh_uuid: network_uuid.map(str::to_string),
            })
            .await
            .expect("playlist");

        let mut listing = PlaylistListing::new();
        for stream_name in streams {
            listing.insert(
                stream_name.to_string(),
                stream(
                    &format!("http://provider/{name}/{stream_name}.ts"),
                    Some(&format!("http://logos/{stream_name}.png")),
                ),
            );
        }
        self.cache.insert(playlist.id, listing);
        playlist
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    pub async fn channel(&self, id: i32) -> Channel {
        self.sync.get_channel(id).await.expect("channel")
    }
}
