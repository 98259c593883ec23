use crate::error::Error;
use crate::flags::{FlagThresholds, DEFAULT_CAPACITY, DEFAULT_SLA_THRESHOLD_PERCENT};
use config::{Config, ConfigError, Environment, File as ConfigFile};
use serde::Deserialize;

pub const ENV_PREFIX: &str = "CAMPAIGN_AUDIT";

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AppConfig {
    /// Impressions per slot before the slot counts as overbooked.
    pub capacity: u64,
    pub sla_threshold_percent: f64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            sla_threshold_percent: DEFAULT_SLA_THRESHOLD_PERCENT,
        }
    }
}

impl AppConfig {
    /// Apply per-invocation overrides on top of the loaded values.
    pub fn with_overrides(mut self, capacity: Option<u64>, sla_threshold_percent: Option<f64>) -> Self {
        if let Some(capacity) = capacity {
            self.capacity = capacity;
        }
        if let Some(threshold) = sla_threshold_percent {
            self.sla_threshold_percent = threshold;
        }
        self
    }

    pub fn validate(&self) -> Result<(), Error> {
        let threshold = self.sla_threshold_percent;
        if !threshold.is_finite() || !(0.0..=100.0).contains(&threshold) {
            return Err(Error::Other(format!(
                "sla_threshold_percent must be between 0 and 100, got {}",
                threshold
            )));
        }
        Ok(())
    }

    pub fn thresholds(&self) -> FlagThresholds {
        FlagThresholds {
            capacity: self.capacity,
            sla_threshold_percent: self.sla_threshold_percent,
        }
    }
}

/// Defaults, then an optional `Config` file, then `CAMPAIGN_AUDIT_*` variables.
pub fn load_configuration() -> Result<AppConfig, ConfigError> {
    let builder = Config::builder()
        .set_default("capacity", DEFAULT_CAPACITY)?
        .set_default("sla_threshold_percent", DEFAULT_SLA_THRESHOLD_PERCENT)?
        .add_source(ConfigFile::with_name("Config").required(false))
        .add_source(Environment::with_prefix(ENV_PREFIX).try_parsing(true))
        .build()?;
    builder.try_deserialize::<AppConfig>()
}
