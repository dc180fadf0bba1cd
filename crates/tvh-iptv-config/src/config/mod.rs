use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use crate::errors::{AppError, AppResult};

pub mod defaults;

use defaults::*;

/// Environment variable prefix for configuration overrides, e.g.
/// `TVH_IPTV_TVHEADEND__URL=http://tvh:9981`
pub const ENV_PREFIX: &str = "TVH_IPTV_";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub tvheadend: TvheadendConfig,
    #[serde(default)]
    pub playlists: PlaylistCacheConfig,
    #[serde(default)]
    pub stream_buffer: StreamBufferConfig,
    #[serde(default)]
    pub reconciliation: ReconciliationConfig,
    #[serde(default)]
    pub retry: RetrySettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TvheadendConfig {
    /// Base URL of the Tvheadend web interface, e.g. http://localhost:9981
    pub url: String,
    pub username: Option<String>,
    pub password: Option<String>,
    #[serde(default = "default_request_timeout")]
    pub request_timeout: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistCacheConfig {
    /// Directory holding `playlist_<id>.json` listing snapshots
    #[serde(default = "default_playlist_cache_path")]
    pub cache_path: PathBuf,
}

/// Settings for wrapping stream URLs in an ffmpeg pipe before handing them to Tvheadend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamBufferConfig {
    #[serde(default = "default_stream_buffer_enabled")]
    pub enabled: bool,
    /// Argument template; `[URL]` and `[SERVICE_NAME]` are substituted
    #[serde(default = "default_ffmpeg_pipe_args")]
    pub ffmpeg_args: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconciliationConfig {
    #[serde(default = "default_mux_publish_interval")]
    pub mux_publish_interval: String,
    #[serde(default = "default_service_map_interval")]
    pub service_map_interval: String,
    /// Upper bound for reconciling a single channel source
    #[serde(default = "default_source_timeout")]
    pub source_timeout: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrySettings {
    #[serde(default = "default_retry_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_retry_initial_delay")]
    pub initial_delay: String,
    #[serde(default = "default_retry_max_delay")]
    pub max_delay: String,
}

fn default_request_timeout() -> String {
    DEFAULT_REQUEST_TIMEOUT.to_string()
}

fn default_playlist_cache_path() -> PathBuf {
    PathBuf::from(DEFAULT_PLAYLIST_CACHE_PATH)
}

fn default_stream_buffer_enabled() -> bool {
    DEFAULT_STREAM_BUFFER_ENABLED
}

fn default_ffmpeg_pipe_args() -> String {
    DEFAULT_FFMPEG_PIPE_ARGS.to_string()
}

fn default_mux_publish_interval() -> String {
    DEFAULT_MUX_PUBLISH_INTERVAL.to_string()
}

fn default_service_map_interval() -> String {
    DEFAULT_SERVICE_MAP_INTERVAL.to_string()
}

fn default_source_timeout() -> String {
    DEFAULT_SOURCE_TIMEOUT.to_string()
}

fn default_retry_max_attempts() -> u32 {
    DEFAULT_RETRY_MAX_ATTEMPTS
}

fn default_retry_initial_delay() -> String {
    DEFAULT_RETRY_INITIAL_DELAY.to_string()
}

fn default_retry_max_delay() -> String {
    DEFAULT_RETRY_MAX_DELAY.to_string()
}

/// Parse a humantime duration string, naming the offending field on failure
pub fn parse_duration(value: &str, field: &str) -> AppResult<Duration> {
    humantime::parse_duration(value)
        .map_err(|e| AppError::configuration(format!("{field}: invalid duration '{value}': {e}")))
}

impl Default for PlaylistCacheConfig {
    fn default() -> Self {
        Self {
            cache_path: default_playlist_cache_path(),
        }
    }
}

impl Default for StreamBufferConfig {
    fn default() -> Self {
        Self {
            enabled: default_stream_buffer_enabled(),
            ffmpeg_args: default_ffmpeg_pipe_args(),
        }
    }
}

impl Default for ReconciliationConfig {
    fn default() -> Self {
        Self {
            mux_publish_interval: default_mux_publish_interval(),
            service_map_interval: default_service_map_interval(),
            source_timeout: default_source_timeout(),
        }
    }
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: default_retry_max_attempts(),
            initial_delay: default_retry_initial_delay(),
            max_delay: default_retry_max_delay(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: DEFAULT_DATABASE_URL.to_string(),
                max_connections: Some(DEFAULT_MAX_CONNECTIONS),
            },
            tvheadend: TvheadendConfig {
                url: DEFAULT_TVHEADEND_URL.to_string(),
                username: None,
                password: None,
                request_timeout: default_request_timeout(),
            },
            playlists: PlaylistCacheConfig::default(),
            stream_buffer: StreamBufferConfig::default(),
            reconciliation: ReconciliationConfig::default(),
            retry: RetrySettings::default(),
        }
    }
}

impl TvheadendConfig {
    pub fn request_timeout(&self) -> AppResult<Duration> {
        parse_duration(&self.request_timeout, "tvheadend.request_timeout")
    }
}

impl ReconciliationConfig {
    pub fn mux_publish_interval(&self) -> AppResult<Duration> {
        parse_duration(&self.mux_publish_interval, "reconciliation.mux_publish_interval")
    }

    pub fn service_map_interval(&self) -> AppResult<Duration> {
        parse_duration(&self.service_map_interval, "reconciliation.service_map_interval")
    }

    pub fn source_timeout(&self) -> AppResult<Duration> {
        parse_duration(&self.source_timeout, "reconciliation.source_timeout")
    }
}

impl Config {
    pub fn load() -> AppResult<Self> {
        let config_file =
            std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".to_string());
        Self::load_from_file(&config_file)
    }

    /// Load defaults, then the TOML file, then `TVH_IPTV_*` environment overrides.
    ///
    /// A missing file is created with the default configuration.
    pub fn load_from_file(config_file: &str) -> AppResult<Self> {
        let path = Path::new(config_file);
        if !path.exists() {
            let contents = toml::to_string_pretty(&Self::default())
                .map_err(|e| AppError::configuration(format!("cannot render defaults: {e}")))?;
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, contents)?;
            info!("Created default config file: {}", config_file);
        }

        let config: Self = Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .map_err(|e| AppError::configuration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check every duration and URL up front so a bad value fails startup, not a pass
    pub fn validate(&self) -> AppResult<()> {
        self.tvheadend.request_timeout()?;
        self.reconciliation.mux_publish_interval()?;
        self.reconciliation.service_map_interval()?;
        self.reconciliation.source_timeout()?;
        parse_duration(&self.retry.initial_delay, "retry.initial_delay")?;
        parse_duration(&self.retry.max_delay, "retry.max_delay")?;
        url::Url::parse(&self.tvheadend.url).map_err(|e| {
            AppError::configuration(format!(
                "tvheadend.url: invalid URL '{}': {e}",
                self.tvheadend.url
            ))
        })?;
        if self.retry.max_attempts == 0 {
            return Err(AppError::configuration("retry.max_attempts must be at least 1"));
        }
        Ok(())
    }
}
