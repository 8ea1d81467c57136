//! CLI configuration file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use planwise_performance::EngineConfig;
use serde::{Deserialize, Serialize};

/// Settings read from `--config`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CliConfig {
    /// Storage directory
    #[serde(default = "default_storage_path")]
    pub storage_path: PathBuf,

    /// Engine tuning
    #[serde(default)]
    pub engine: EngineConfig,
}

fn default_storage_path() -> PathBuf {
    PathBuf::from(".planwise")
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            storage_path: default_storage_path(),
            engine: EngineConfig::default(),
        }
    }
}

impl CliConfig {
    /// Load and validate a JSON config file.
    pub async fn load(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("parsing config {}", path.display()))?;
        config
            .engine
            .validate()
            .with_context(|| format!("invalid config {}", path.display()))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: CliConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, CliConfig::default());
        assert_eq!(config.engine.workload_imbalance_threshold, 3);
    }

    #[test]
    fn test_partial_engine_section() {
        let config: CliConfig = serde_json::from_str(
            r#"{"storage_path": "/tmp/pw", "engine": {"actions": {"stagger_days": 4}}}"#,
        )
        .unwrap();
        assert_eq!(config.storage_path, PathBuf::from("/tmp/pw"));
        assert_eq!(config.engine.actions.stagger_days, 4);
        assert_eq!(config.engine.actions.deadline_extension_days, 7);
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("planwise.json");
        tokio::fs::write(&path, r#"{"engine": {"workload_imbalance_threshold": 5}}"#)
            .await
            .unwrap();

        let config = CliConfig::load(&path).await.unwrap();
        assert_eq!(config.engine.workload_imbalance_threshold, 5);
        assert!(CliConfig::load(&dir.path().join("missing.json")).await.is_err());
    }

    #[tokio::test]
    async fn test_load_rejects_invalid_actions() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("planwise.json");
        tokio::fs::write(
            &path,
            r#"{"engine": {"actions": {"deadline_window_days": 10, "deadline_extension_days": 5}}}"#,
        )
        .await
        .unwrap();

        let err = CliConfig::load(&path).await.unwrap_err();
        assert!(format!("{err:#}").contains("deadline_extension_days"));
    }
}
