use std::time::Duration;

use serde::Deserialize;

/// Collector endpoint and the identity headers sent with every request.
#[derive(Debug, Clone, Deserialize)]
pub struct HttpTransportConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// May also be provided later via `HttpTransport::set_api_key`.
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_sdk_version")]
    pub sdk_version: String,
    #[serde(default = "default_universe_id")]
    pub universe_id: String,
    #[serde(default = "default_server_id")]
    pub server_id: String,
    #[serde(default = "default_is_studio")]
    pub is_studio: bool,
    /// Whole-request timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://api.gamebeast.gg".into()
}
fn default_sdk_version() -> String {
    "0.8.1".into()
}
fn default_universe_id() -> String {
    "0".into()
}
fn default_server_id() -> String {
    "unity-0000".into()
}
fn default_is_studio() -> bool {
    true
}
fn default_timeout_secs() -> u64 {
    30
}

impl Default for HttpTransportConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            sdk_version: default_sdk_version(),
            universe_id: default_universe_id(),
            server_id: default_server_id(),
            is_studio: default_is_studio(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl HttpTransportConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
