mod config;

use std::sync::{PoisonError, RwLock};

use reqwest::RequestBuilder;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use serde_json::Value;

use marker_api::{BatchTransport, MarkersEnvelope, SendFuture, TransportError};

pub use config::HttpTransportConfig;

// ═══════════════════════════════════════════════════════════════
//  Routes
// ═══════════════════════════════════════════════════════════════

/// SDK endpoints on the collector. All are POST with a JSON body and are
/// mounted under `/sdk`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    SdkVersion,
    Markers,
}

impl Route {
    pub fn path(self) -> &'static str {
        match self {
            Route::SdkVersion => "/v1/sdk/version",
            Route::Markers => "/v1/markers",
        }
    }
}

// ═══════════════════════════════════════════════════════════════
//  HttpTransport
// ═══════════════════════════════════════════════════════════════

/// `BatchTransport` over HTTPS.
///
/// The API key can arrive after construction; until then every request
/// fails with `TransportError::MissingCredential` without touching the
/// network.
pub struct HttpTransport {
    http: reqwest::Client,
    config: HttpTransportConfig,
    api_key: RwLock<Option<String>>,
}

impl HttpTransport {
    pub fn new(config: HttpTransportConfig) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| TransportError::Config(format!("HTTP client: {e}")))?;
        let api_key = config.api_key.clone().filter(|k| !k.is_empty());
        Ok(Self {
            http,
            config,
            api_key: RwLock::new(api_key),
        })
    }

    /// Set (or replace) the API key. An empty key unsets it.
    pub fn set_api_key(&self, api_key: impl Into<String>) {
        let api_key = api_key.into();
        *self.api_key.write().unwrap_or_else(PoisonError::into_inner) =
            (!api_key.is_empty()).then_some(api_key);
    }

    fn api_key(&self) -> Result<String, TransportError> {
        self.api_key
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(TransportError::MissingCredential)
    }

    pub fn url(&self, route: Route) -> String {
        self.sdk_url(route.path())
    }

    fn sdk_url(&self, path: &str) -> String {
        let sep = if path.starts_with('/') { "" } else { "/" };
        format!("{}/sdk{sep}{path}", self.config.base_url.trim_end_matches('/'))
    }

    /// POST `body` (or `{}`) to `route`, returning the response text.
    pub async fn post(&self, route: Route, body: Option<Vec<u8>>) -> Result<String, TransportError> {
        let api_key = self.api_key()?;
        let url = self.url(route);
        let body = body.unwrap_or_else(|| b"{}".to_vec());
        tracing::debug!(url = %url, bytes = body.len(), "POST");

        let req = self
            .http
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .body(body);
        self.execute("POST", &url, req, api_key).await
    }

    /// GET an SDK `path`, sending the members of `params` as the query
    /// string (see [`query_pairs`]).
    pub async fn get(&self, path: &str, params: &Value) -> Result<String, TransportError> {
        let api_key = self.api_key()?;
        let url = self.sdk_url(path);
        let query = query_pairs(params);
        tracing::debug!(url = %url, params = query.len(), "GET");

        let req = self.http.get(&url).query(&query);
        self.execute("GET", &url, req, api_key).await
    }

    async fn execute(
        &self,
        method: &str,
        url: &str,
        req: RequestBuilder,
        api_key: String,
    ) -> Result<String, TransportError> {
        let resp = req
            .header("authorization", api_key)
            .header("sdkversion", &self.config.sdk_version)
            .header("universeid", &self.config.universe_id)
            .header("serverid", &self.config.server_id)
            .header("isstudio", if self.config.is_studio { "true" } else { "false" })
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| TransportError::Request(format!("{method} {url}: {e}")))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| TransportError::Request(format!("read {url}: {e}")))?;

        if status.is_success() {
            Ok(text)
        } else {
            Err(TransportError::Status { status: status.as_u16(), body: text })
        }
    }

    /// Ask the collector for the current SDK version. `Null` on an empty body.
    pub async fn fetch_sdk_version(&self) -> Result<Value, TransportError> {
        let text = self.post(Route::SdkVersion, None).await?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text)?)
    }
}

/// Flatten a JSON object into query parameters. Null members are
/// skipped, strings are sent as-is and everything else as its JSON text.
/// Non-object values produce no parameters.
pub fn query_pairs(params: &Value) -> Vec<(String, String)> {
    let Value::Object(members) = params else {
        return Vec::new();
    };
    members
        .iter()
        .filter_map(|(k, v)| match v {
            Value::Null => None,
            Value::String(s) => Some((k.clone(), s.clone())),
            other => Some((k.clone(), other.to_string())),
        })
        .collect()
}

impl BatchTransport for HttpTransport {
    fn check_ready(&self) -> Result<(), TransportError> {
        self.api_key().map(|_| ())
    }

    fn send_batch<'a>(&'a self, envelope: &'a MarkersEnvelope) -> SendFuture<'a> {
        Box::pin(async move {
            let body = envelope.to_json_bytes()?;
            self.post(Route::Markers, Some(body)).await.map(|_| ())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_are_prefixed_with_sdk() {
        let t = HttpTransport::new(HttpTransportConfig {
            base_url: "https://collector.example/".into(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(t.url(Route::Markers), "https://collector.example/sdk/v1/markers");
        assert_eq!(t.url(Route::SdkVersion), "https://collector.example/sdk/v1/sdk/version");
    }

    #[test]
    fn query_pairs_skip_nulls_and_stringify_scalars() {
        let pairs = query_pairs(&serde_json::json!({
            "name": "sword",
            "count": 3,
            "rare": true,
            "owner": null,
        }));
        assert_eq!(
            pairs,
            [
                ("count".to_string(), "3".to_string()),
                ("name".to_string(), "sword".to_string()),
                ("rare".to_string(), "true".to_string()),
            ]
        );
        assert!(query_pairs(&Value::Null).is_empty());
        assert!(query_pairs(&serde_json::json!([1, 2])).is_empty());
    }

    #[test]
    fn readiness_follows_api_key() {
        let t = HttpTransport::new(HttpTransportConfig::default()).unwrap();
        assert!(matches!(t.check_ready(), Err(TransportError::MissingCredential)));

        t.set_api_key("secret");
        assert!(t.check_ready().is_ok());

        t.set_api_key("");
        assert!(t.check_ready().is_err());
    }

    #[test]
    fn empty_configured_key_counts_as_unset() {
        let t = HttpTransport::new(HttpTransportConfig {
            api_key: Some(String::new()),
            ..Default::default()
        })
        .unwrap();
        assert!(t.check_ready().is_err());
    }
}
