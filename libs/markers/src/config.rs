use std::time::Duration;

use serde::Deserialize;

use marker_api::MarkerContext;

// ═══════════════════════════════════════════════════════════════
//  Markers Config
// ═══════════════════════════════════════════════════════════════

/// Batching and identity settings of the marker pipeline.
#[derive(Debug, Clone, Deserialize)]
pub struct MarkersConfig {
    /// Flush as soon as this many markers are buffered.
    #[serde(default = "default_flush_threshold")]
    pub flush_threshold: usize,
    /// Flush a non-empty buffer after this many seconds.
    #[serde(default = "default_flush_interval_secs")]
    pub flush_interval_secs: f64,
    /// `serverId` stamped on every marker.
    #[serde(default = "default_server_id")]
    pub server_id: String,
    /// Drop-oldest bound on the buffer. Unbounded when absent.
    #[serde(default)]
    pub max_buffered: Option<usize>,
    #[serde(default)]
    pub context: ContextConfig,
}

fn default_flush_threshold() -> usize {
    10
}
fn default_flush_interval_secs() -> f64 {
    10.0
}
fn default_server_id() -> String {
    "unity-0000".into()
}

impl Default for MarkersConfig {
    fn default() -> Self {
        Self {
            flush_threshold: default_flush_threshold(),
            flush_interval_secs: default_flush_interval_secs(),
            server_id: default_server_id(),
            max_buffered: None,
            context: ContextConfig::default(),
        }
    }
}

impl MarkersConfig {
    /// Falls back to the default interval for values `validate` rejects.
    pub fn flush_interval(&self) -> Duration {
        Duration::try_from_secs_f64(self.flush_interval_secs)
            .unwrap_or_else(|_| Duration::from_secs_f64(default_flush_interval_secs()))
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.flush_threshold == 0 {
            return Err("markers: flush_threshold must be at least 1".into());
        }
        if !self.flush_interval_secs.is_finite() || self.flush_interval_secs <= 0.0 {
            return Err(format!(
                "markers: flush_interval_secs must be a positive number, got {}",
                self.flush_interval_secs
            ));
        }
        if self.server_id.trim().is_empty() {
            return Err("markers: server_id must not be empty".into());
        }
        match self.max_buffered {
            Some(max) if max < self.flush_threshold => Err(format!(
                "markers: max_buffered ({max}) must not be below flush_threshold ({})",
                self.flush_threshold
            )),
            _ => Ok(()),
        }
    }
}

/// Static `properties` block, snake_case on the config side.
#[derive(Debug, Clone, Deserialize)]
pub struct ContextConfig {
    #[serde(default = "default_sdk_platform")]
    pub sdk_platform: String,
    #[serde(default = "default_place_id")]
    pub place_id: i64,
    #[serde(default = "default_place_version")]
    pub place_version: i64,
    #[serde(default = "default_origin")]
    pub origin: String,
}

fn default_sdk_platform() -> String {
    "roblox".into()
}
fn default_place_id() -> i64 {
    1
}
fn default_place_version() -> i64 {
    1
}
fn default_origin() -> String {
    "sdk".into()
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            sdk_platform: default_sdk_platform(),
            place_id: default_place_id(),
            place_version: default_place_version(),
            origin: default_origin(),
        }
    }
}

impl From<ContextConfig> for MarkerContext {
    fn from(c: ContextConfig) -> Self {
        MarkerContext {
            sdk_platform: c.sdk_platform,
            place_id: c.place_id,
            place_version: c.place_version,
            origin: c.origin,
        }
    }
}
