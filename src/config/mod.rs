use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::warn;

// Re-export existing config types
pub use crate::nats::NatsConfig;

/// Complete gateway configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GatewayConfig {
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub nats: NatsConfig,
    #[serde(default)]
    pub topics: TopicConfig,
}

/// Reporting window configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Reporting period of every output kind (milliseconds)
    #[serde(default = "default_frequency_ms")]
    pub frequency_ms: u64,
    /// Buffer size that triggers an early item/station flush
    #[serde(default = "default_flush_threshold")]
    pub flush_threshold: usize,
    /// Reconciliation attempts before a connection is dropped (0 = never)
    #[serde(default = "default_connection_max_attempts")]
    pub connection_max_attempts: u32,
}

fn default_frequency_ms() -> u64 {
    1000
}

fn default_flush_threshold() -> usize {
    100
}

fn default_connection_max_attempts() -> u32 {
    600
}

impl OutputConfig {
    pub fn period(&self) -> Duration {
        Duration::from_millis(self.frequency_ms.max(1))
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            frequency_ms: default_frequency_ms(),
            flush_threshold: default_flush_threshold(),
            connection_max_attempts: default_connection_max_attempts(),
        }
    }
}

/// Input and output channel names
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TopicConfig {
    pub item: String,
    pub unit: String,
    pub connection: String,
    pub deletion: String,
    pub station: String,
    pub output_item: String,
    pub output_unit: String,
    pub output_group: String,
    pub output_station: String,
}

impl TopicConfig {
    /// Every input subject the gateway subscribes to
    pub fn inputs(&self) -> Vec<String> {
        vec![
            self.item.clone(),
            self.unit.clone(),
            self.connection.clone(),
            self.deletion.clone(),
            self.station.clone(),
        ]
    }
}

impl Default for TopicConfig {
    fn default() -> Self {
        Self {
            item: "simulation.entity.item".to_string(),
            unit: "simulation.connection.unit".to_string(),
            connection: "simulation.connection.unit-connection".to_string(),
            deletion: "simulation.object-deleted".to_string(),
            station: "simulation.entity.station".to_string(),
            output_item: "gateway.geojson.item".to_string(),
            output_unit: "gateway.geojson.unit".to_string(),
            output_group: "gateway.geojson.unitgroup".to_string(),
            output_station: "gateway.geojson.station".to_string(),
        }
    }
}

impl GatewayConfig {
    /// Override settings from environment variables.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup("GATEWAY_OUTPUT_FREQUENCY_MS") {
            if let Ok(n) = v.parse::<u64>() {
                self.output.frequency_ms = n;
            }
        }
        if let Some(v) = lookup("GATEWAY_FLUSH_THRESHOLD") {
            if let Ok(n) = v.parse::<usize>() {
                self.output.flush_threshold = n;
            }
        }
        if let Some(v) = lookup("GATEWAY_CONNECTION_MAX_ATTEMPTS") {
            if let Ok(n) = v.parse::<u32>() {
                self.output.connection_max_attempts = n;
            }
        }
        if let Some(v) = lookup("NATS_URL") {
            self.nats.url = v;
        }
    }
}

/// Load configuration from TOML file
pub fn load_config(path: &Path) -> Result<GatewayConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let config: GatewayConfig = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file {}", path.display()))?;
    Ok(config)
}

/// Load configuration, falling back to defaults if the file does not exist
pub fn load_or_default(path: &Path) -> Result<GatewayConfig> {
    if !path.exists() {
        warn!(path = %path.display(), "Config file not found, using defaults");
        return Ok(GatewayConfig::default());
    }
    load_config(path)
}
