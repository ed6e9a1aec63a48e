//! Client configuration.

use std::time::Duration;

use tracing::warn;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://api.rover.io/";

/// Settings shared by every component hanging off a [`crate::RoverContext`].
#[derive(Debug, Clone, PartialEq)]
pub struct RoverConfig {
    /// Account token sent as `X-Rover-Api-Key`.
    pub api_key: String,

    /// API root. Must parse as an absolute URL.
    pub base_url: String,

    /// Sent as `X-Rover-Device-Id` and used as the device `udid`.
    pub device_id: String,

    /// Pixels per point for layout.
    pub density: f32,

    /// Image cache budget in kilobytes.
    pub image_cache_kb: usize,

    pub request_timeout: Duration,

    pub user_agent: String,
}

impl Default for RoverConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            device_id: String::new(),
            density: 1.0,
            image_cache_kb: 4 * 1024,
            request_timeout: Duration::from_secs(30),
            user_agent: format!("rover-rs/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl RoverConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    /// Defaults overlaid with `ROVER_*` environment variables.
    pub fn from_env() -> Self {
        Self::default().overlay(|key| std::env::var(key).ok())
    }

    /// Overlay values from a key lookup. Malformed values are ignored.
    pub fn overlay(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(key) = lookup("ROVER_API_KEY") {
            self.api_key = key;
        }
        if let Some(base) = lookup("ROVER_BASE_URL") {
            match Url::parse(&base) {
                Ok(_) => self.base_url = base,
                Err(err) => warn!(value = %base, error = %err, "ignoring ROVER_BASE_URL"),
            }
        }
        if let Some(id) = lookup("ROVER_DEVICE_ID") {
            self.device_id = id;
        }
        if let Some(density) = lookup("ROVER_DENSITY") {
            match density.parse::<f32>() {
                Ok(value) if value > 0.0 && value.is_finite() => self.density = value,
                _ => warn!(value = %density, "ignoring ROVER_DENSITY"),
            }
        }
        if let Some(kb) = lookup("ROVER_IMAGE_CACHE_KB") {
            match kb.parse::<usize>() {
                Ok(value) => self.image_cache_kb = value,
                Err(_) => warn!(value = %kb, "ignoring ROVER_IMAGE_CACHE_KB"),
            }
        }
        self
    }
}
