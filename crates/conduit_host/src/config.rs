//! Host limits

use serde::{Deserialize, Serialize};

/// Resource budgets of the reference host.
///
/// Creation calls that would exceed a budget return the null sentinel, the
/// same way an exhausted native runtime does.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Total bytes of live compute buffer storage.
    pub max_buffer_bytes: usize,
    /// Live entries in the asset table (prefabs, shaders, textures, meshes,
    /// materials).
    pub max_assets: usize,
    /// Re-emit script log entries as `tracing` events.
    pub echo_logs: bool,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            max_buffer_bytes: 64 * 1024 * 1024,
            max_assets: 4096,
            echo_logs: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: HostConfig = serde_json::from_str(r#"{ "max_assets": 8 }"#).unwrap();
        assert_eq!(config.max_assets, 8);
        assert_eq!(config.max_buffer_bytes, HostConfig::default().max_buffer_bytes);
        assert!(config.echo_logs);
    }
}
