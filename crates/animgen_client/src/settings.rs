use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::RetryPolicy;

/// Origin used when nothing else is configured.
pub const DEFAULT_API_ORIGIN: &str = "http://localhost:8000";

/// Rendering options forwarded verbatim with every creation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderOptions {
    pub quality: String,
    pub resolution: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            quality: "low".to_string(),
            resolution: "720p".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApiSettings {
    /// Resolved API origin; endpoint paths and relative artifact paths hang off it.
    pub origin: Url,
    pub connect_timeout: Duration,
    /// Per-request bound so a hung call cannot stall the poll loop forever.
    pub request_timeout: Duration,
    /// Delay between a poll response and the next poll request.
    pub poll_interval: Duration,
    /// How long feedback notices stay visible.
    pub notice_window: Duration,
    pub options: RenderOptions,
    pub retry: RetryPolicy,
}

impl ApiSettings {
    pub fn new(origin: Url) -> Self {
        Self {
            origin,
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            poll_interval: Duration::from_secs(1),
            notice_window: Duration::from_secs(3),
            options: RenderOptions::default(),
            retry: RetryPolicy::None,
        }
    }
}
