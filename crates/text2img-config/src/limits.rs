use std::time::Duration;

use serde::Deserialize;

/// Per-user request limits
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LimitsConfig {
    /// Minimum time between two accepted requests of one user (e.g. "10s")
    #[serde(default = "default_debounce")]
    pub debounce: String,
    /// Age after which a debounce record may be purged (e.g. "5m")
    #[serde(default = "default_record_ttl")]
    pub record_ttl: String,
}

impl LimitsConfig {
    /// Parsed debounce window
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not a valid duration string
    pub fn debounce_window(&self) -> anyhow::Result<Duration> {
        parse_duration("limits.debounce", &self.debounce)
    }

    /// Parsed debounce record TTL
    ///
    /// # Errors
    ///
    /// Returns an error if the value is not a valid duration string
    pub fn record_ttl(&self) -> anyhow::Result<Duration> {
        parse_duration("limits.record_ttl", &self.record_ttl)
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            debounce: default_debounce(),
            record_ttl: default_record_ttl(),
        }
    }
}

fn parse_duration(field: &str, value: &str) -> anyhow::Result<Duration> {
    duration_str::parse(value).map_err(|e| anyhow::anyhow!("invalid duration for {field} '{value}': {e}"))
}

fn default_debounce() -> String {
    "10s".to_owned()
}

fn default_record_ttl() -> String {
    "5m".to_owned()
}
