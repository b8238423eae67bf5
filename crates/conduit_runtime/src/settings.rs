//! Runtime settings

use anyhow::{Context, Result};
use conduit_host::HostConfig;
use conduit_script::DirectionSource;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Settings for a demo run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeSettings {
    /// Frames to simulate before shutting down.
    pub ticks: u32,
    /// Seconds per simulated frame.
    pub fixed_delta: f32,
    /// Maximum `tracing` level: trace, debug, info, warn or error.
    pub log_level: String,
    pub direction_source: DirectionSource,
    pub host: HostConfig,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            ticks: 120,
            fixed_delta: 1.0 / 60.0,
            log_level: "info".to_owned(),
            direction_source: DirectionSource::Native,
            host: HostConfig::default(),
        }
    }
}

impl RuntimeSettings {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading settings from {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("parsing settings in {}", path.display()))
    }

    pub fn level(&self) -> Result<tracing::Level> {
        self.log_level
            .parse()
            .with_context(|| format!("unknown log level {:?}", self.log_level))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_files_keep_defaults() {
        let settings: RuntimeSettings = serde_json::from_str(
            r#"{ "ticks": 10, "direction_source": "local", "host": { "max_assets": 32 } }"#,
        )
        .unwrap();
        assert_eq!(settings.ticks, 10);
        assert_eq!(settings.direction_source, DirectionSource::Local);
        assert_eq!(settings.host.max_assets, 32);
        assert_eq!(settings.log_level, "info");
        assert_eq!(settings.level().unwrap(), tracing::Level::INFO);
    }

    #[test]
    fn bad_levels_are_reported() {
        let settings = RuntimeSettings {
            log_level: "loud".into(),
            ..RuntimeSettings::default()
        };
        assert!(settings.level().is_err());
    }
}
