/// Configuration default values
///
/// This module contains all the default values for configuration options,
/// making them easily changeable in one central location.
// Database defaults
pub const DEFAULT_DATABASE_URL: &str = "sqlite://./data/tvh-iptv-config.db";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;

// Tvheadend defaults
pub const DEFAULT_TVHEADEND_URL: &str = "http://localhost:9981";
pub const DEFAULT_REQUEST_TIMEOUT: &str = "30s";

// Playlist cache defaults
pub const DEFAULT_PLAYLIST_CACHE_PATH: &str = "./data/cache/playlists";

// Stream buffer defaults
pub const DEFAULT_STREAM_BUFFER_ENABLED: bool = false;
pub const DEFAULT_FFMPEG_PIPE_ARGS: &str = "-hide_banner -loglevel error -probesize 10M -analyzeduration 0 -fpsprobesize 0 -i [URL] -c copy -metadata service_name=[SERVICE_NAME] -f mpegts pipe:1";

// Reconciliation defaults
pub const DEFAULT_MUX_PUBLISH_INTERVAL: &str = "60m";
pub const DEFAULT_SERVICE_MAP_INTERVAL: &str = "5m";
pub const DEFAULT_SOURCE_TIMEOUT: &str = "60s";

// Retry defaults for destructive Tvheadend calls
pub const DEFAULT_RETRY_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_RETRY_INITIAL_DELAY: &str = "500ms";
pub const DEFAULT_RETRY_MAX_DELAY: &str = "5s";
