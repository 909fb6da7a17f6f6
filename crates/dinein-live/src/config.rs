//! # Hub Configuration
//!
//! ```toml
//! [hub]
//! subscriber_buffer = 64     # events queued per observer before it is dropped
//! send_timeout_ms = 5000     # one transport send longer than this drops the observer
//! ping_interval_secs = 30    # WebSocket keepalive
//! ```

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{LiveError, LiveResult};

/// Notification hub tuning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HubConfig {
    /// Capacity of each observer's queue.
    #[serde(default = "default_subscriber_buffer")]
    pub subscriber_buffer: usize,

    /// Upper bound for a single transport send, in milliseconds.
    #[serde(default = "default_send_timeout_ms")]
    pub send_timeout_ms: u64,

    /// Keepalive ping interval in seconds; 0 disables pings.
    #[serde(default = "default_ping_interval_secs")]
    pub ping_interval_secs: u64,
}

fn default_subscriber_buffer() -> usize {
    64
}

fn default_send_timeout_ms() -> u64 {
    5_000
}

fn default_ping_interval_secs() -> u64 {
    30
}

impl Default for HubConfig {
    fn default() -> Self {
        HubConfig {
            subscriber_buffer: default_subscriber_buffer(),
            send_timeout_ms: default_send_timeout_ms(),
            ping_interval_secs: default_ping_interval_secs(),
        }
    }
}

impl HubConfig {
    pub fn send_timeout(&self) -> Duration {
        Duration::from_millis(self.send_timeout_ms)
    }

    pub fn ping_interval(&self) -> Option<Duration> {
        (self.ping_interval_secs > 0).then(|| Duration::from_secs(self.ping_interval_secs))
    }

    pub fn validate(&self) -> LiveResult<()> {
        if self.subscriber_buffer == 0 {
            return Err(LiveError::InvalidConfig(
                "subscriber_buffer must be at least 1".to_string(),
            ));
        }
        if self.send_timeout_ms == 0 {
            return Err(LiveError::InvalidConfig(
                "send_timeout_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
