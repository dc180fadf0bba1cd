//! Rewrites provider stream URLs into the form Tvheadend ingests

use crate::config::StreamBufferConfig;

const PIPE_SCHEME: &str = "pipe://";

/// Build the `iptv_url` handed to Tvheadend for a stream.
///
/// With the stream buffer enabled, plain URLs are wrapped in an ffmpeg pipe
/// whose `[URL]` and `[SERVICE_NAME]` placeholders are filled in; spaces in
/// the service name become underscores so the pipe command stays one token.
/// URLs that already are pipes, and all URLs when buffering is off, pass
/// through unchanged.
pub fn generate_iptv_url(config: &StreamBufferConfig, url: &str, service_name: &str) -> String {
    if !config.enabled || url.starts_with(PIPE_SCHEME) {
        return url.to_string();
    }

    let service_name = service_name.replace(' ', "_");
    let args = config
        .ffmpeg_args
        .replace("[URL]", url)
        .replace("[SERVICE_NAME]", &service_name);
    format!("{PIPE_SCHEME}ffmpeg {args}")
}
