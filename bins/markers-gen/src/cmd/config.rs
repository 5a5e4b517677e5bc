use std::time::Duration;

use clap::Args;
use serde::Deserialize;

use markers::MarkersConfig;
use transport_http::HttpTransportConfig;

use super::error::GenError;

// ═══════════════════════════════════════════════════════════════
//  Config file (TOML)
// ═══════════════════════════════════════════════════════════════

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    pub marker: Option<String>,
    pub rate: Option<f64>,
    pub count: Option<u64>,
    pub tick_ms: Option<u64>,
    pub drain_secs: Option<u64>,
    pub check_version: Option<bool>,
    #[serde(default)]
    pub markers: MarkersConfig,
    #[serde(default)]
    pub transport: HttpTransportConfig,
}

pub fn load_config(path: &str) -> Result<Config, GenError> {
    let content =
        std::fs::read_to_string(path).map_err(|e| GenError::Config(format!("cannot read config {path}: {e}")))?;
    parse_config(&content).map_err(|e| GenError::Config(format!("bad config {path}: {e}")))
}

fn parse_config(content: &str) -> Result<Config, toml::de::Error> {
    toml::from_str(content)
}

// ═══════════════════════════════════════════════════════════════
//  CLI args
// ═══════════════════════════════════════════════════════════════

#[derive(Args, Clone, Debug)]
pub struct GenArgs {
    /// Path to config.toml
    #[arg(long, default_value = "config.toml", env = "MARKERS_GEN_CONFIG")]
    pub config: String,

    /// Collector API key
    #[arg(long, env = "MARKERS_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Collector base URL
    #[arg(long)]
    pub base_url: Option<String>,

    /// Marker type to emit
    #[arg(long)]
    pub marker: Option<String>,

    /// Markers per second
    #[arg(long)]
    pub rate: Option<f64>,

    /// Stop after N markers (default: run until Ctrl+C)
    #[arg(long)]
    pub count: Option<u64>,

    /// Tick period in ms (16 ≈ one frame at 60 fps)
    #[arg(long)]
    pub tick_ms: Option<u64>,

    /// How long to wait for in-flight sends on shutdown
    #[arg(long)]
    pub drain_secs: Option<u64>,

    /// Query the collector's SDK version before emitting
    #[arg(long)]
    pub check_version: bool,
}

// ═══════════════════════════════════════════════════════════════
//  Effective — merged config
// ═══════════════════════════════════════════════════════════════

/// Final settings after merging: config.toml < env/CLI
pub struct Effective {
    pub marker: String,
    pub rate: f64,
    /// Interval between emitted markers, `1 / rate`.
    pub period: Duration,
    pub count: Option<u64>,
    pub tick: Duration,
    pub drain: Duration,
    pub check_version: bool,
    pub markers: MarkersConfig,
    pub transport: HttpTransportConfig,
}

impl Effective {
    pub fn new(args: &GenArgs) -> Result<Self, GenError> {
        let cfg = match load_config(&args.config) {
            Ok(c) => c,
            Err(e) => {
                if std::path::Path::new(&args.config).exists() {
                    return Err(e);
                }
                Config::default()
            }
        };
        Self::merge(args, cfg)
    }

    fn merge(args: &GenArgs, cfg: Config) -> Result<Self, GenError> {
        let mut transport = cfg.transport;
        if let Some(ref key) = args.api_key {
            transport.api_key = Some(key.clone());
        }
        if let Some(ref url) = args.base_url {
            transport.base_url = url.clone();
        }

        cfg.markers.validate().map_err(GenError::Config)?;

        let rate = args.rate.or(cfg.rate).unwrap_or(1.0);
        if !rate.is_finite() || rate <= 0.0 {
            return Err(GenError::Config(format!("--rate must be positive, got {rate}")));
        }
        let period = match Duration::try_from_secs_f64(1.0 / rate) {
            Ok(p) if !p.is_zero() => p,
            _ => return Err(GenError::Config(format!("--rate {rate} is out of range"))),
        };

        let tick_ms = args.tick_ms.or(cfg.tick_ms).unwrap_or(16);
        if tick_ms == 0 {
            return Err(GenError::Config("--tick-ms must be at least 1".into()));
        }

        Ok(Self {
            marker: args.marker.clone().or(cfg.marker).unwrap_or_else(|| "demo".into()),
            rate,
            period,
            count: args.count.or(cfg.count),
            tick: Duration::from_millis(tick_ms),
            drain: Duration::from_secs(args.drain_secs.or(cfg.drain_secs).unwrap_or(5)),
            check_version: args.check_version || cfg.check_version.unwrap_or(false),
            markers: cfg.markers,
            transport,
        })
    }
}
