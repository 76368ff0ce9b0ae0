#![allow(clippy::must_use_candidate)]

mod env;
pub mod imagegen;
pub mod limits;
mod loader;
pub mod storage;
pub mod telemetry;

use serde::Deserialize;

pub use imagegen::*;
pub use limits::*;
pub use storage::*;
pub use telemetry::TelemetryConfig;

/// Top-level plugin configuration
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Image generation provider configuration
    #[serde(default)]
    pub imagegen: ImageGenConfig,
    /// Where generated images are cached and how many are kept
    #[serde(default)]
    pub storage: StorageConfig,
    /// Per-user request limits
    #[serde(default)]
    pub limits: LimitsConfig,
    /// Logging configuration
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}
