use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::fields::FieldCatalog;
use crate::series::DEFAULT_WINDOW_MS;

// Site configuration. Everything has a default matching the controller this
// tool was written for, so an empty file is a valid config.

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case", default)]
pub struct Config {
    pub stream: StreamConfig,
    pub write: WriteConfig,
    pub chart: ChartConfig,
    pub fields: FieldCatalog,
}

/// Telemetry stream endpoint and reconnect policy.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case", default)]
pub struct StreamConfig {
    /// Gateway address, `host:port`.
    pub addr: String,
    /// Delay before the single scheduled reconnect attempt. There is no
    /// backoff growth and no retry cap; the controller sits on the local
    /// network and is expected to come back.
    pub reconnect_delay_ms: u64,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            addr: "192.168.1.2:8000".to_string(),
            reconnect_delay_ms: 2_000,
        }
    }
}

/// Command write endpoint.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case", default)]
pub struct WriteConfig {
    pub url: String,
    pub timeout_secs: u64,
}

impl Default for WriteConfig {
    fn default() -> Self {
        Self {
            url: "http://192.168.1.2:8000/api/write".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Windowing for the live pressure series.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case", default)]
pub struct ChartConfig {
    pub window_ms: u64,
    /// How often `watch` logs a window summary.
    pub summary_interval_secs: u64,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            window_ms: DEFAULT_WINDOW_MS,
            summary_interval_secs: 10,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }
}
