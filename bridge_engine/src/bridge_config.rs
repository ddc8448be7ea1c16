use std::time::Duration;

/// Largest message a browser will send to a native host.
pub const DEFAULT_MAX_FRAME_SIZE: usize = 64 * 1024 * 1024;

/// Largest message a browser accepts from a native host.
pub const BROWSER_MAX_OUTBOUND_SIZE: usize = 1024 * 1024;

#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Scheme and host used when a message leaves `host` empty.
    pub default_host: String,
    /// Port used when neither the message nor its host names one.
    pub default_port: u16,
    /// Action used when both `action` and `type` are empty.
    pub default_action: String,
    /// Upper bound for one call to the media server.
    pub request_timeout: Duration,
    /// Inbound frames with a longer length prefix are skipped and reported.
    pub max_frame_size: usize,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            default_host: "http://localhost".to_string(),
            default_port: 7531,
            default_action: "play".to_string(),
            request_timeout: Duration::from_secs(15),
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
        }
    }
}
