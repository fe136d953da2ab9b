use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

// Section types live with the crates that consume them
use lexfuse_extraction::OrchestratorConfig;
use lexfuse_fusion::FusionConfig;

const CONFIG_DIR: &str = "lexfuse";
const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub extraction: OrchestratorConfig,
    #[serde(default)]
    pub fusion: FusionConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Default `tracing` filter, overridden by `RUST_LOG`.
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
        }
    }
}

impl LoggingConfig {
    fn default_level() -> String {
        "info".to_string()
    }
}

impl Config {
    /// `~/lexfuse`
    pub fn config_dir() -> anyhow::Result<PathBuf> {
        Ok(dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("Cannot find home directory"))?
            .join(CONFIG_DIR))
    }

    pub fn config_path() -> anyhow::Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE))
    }

    /// Load `~/lexfuse/config.json`, falling back to defaults when it does
    /// not exist.
    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            info!(
                "No config file at {}, using defaults. Run 'lexfuse init' to create one.",
                config_path.display()
            );
            return Ok(Self::default());
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;

        debug!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    pub fn ensure_config_dir() -> anyhow::Result<PathBuf> {
        let config_dir = Self::config_dir()?;
        std::fs::create_dir_all(&config_dir)?;
        Ok(config_dir)
    }

    /// Write the template to `~/lexfuse/config.json`.
    pub fn create_config() -> anyhow::Result<PathBuf> {
        let config_path = Self::ensure_config_dir()?.join(CONFIG_FILE);
        Self::write_template(&config_path)?;
        Ok(config_path)
    }

    /// Write the default configuration to `path`. Never overwrites.
    pub fn write_template(path: &Path) -> anyhow::Result<()> {
        if path.exists() {
            anyhow::bail!(
                "Config file already exists at: {}. Please edit it directly.",
                path.display()
            );
        }

        let template = serde_json::to_string_pretty(&Self::default())?;
        std::fs::write(path, template)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lexfuse_core::KnowledgeType;

    fn scratch_dir() -> PathBuf {
        std::env::temp_dir().join(format!("lexfuse_config_{}", uuid::Uuid::now_v7()))
    }

    #[test]
    fn defaults_enable_everything() {
        let config = Config::default();
        assert_eq!(config.extraction.enabled_types, KnowledgeType::ALL.to_vec());
        assert!(config.extraction.link_impacts);
        assert!(config.fusion.source_priority.is_empty());
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn partial_file_fills_defaults() {
        let config: Config = serde_json::from_str(
            r#"{
  "extraction": { "enabled_types": ["date", "authority"] },
  "fusion": { "source_priority": ["federal_register", "white_house"] }
}"#,
        )
        .unwrap_or_default();

        assert_eq!(
            config.extraction.enabled_types,
            vec![KnowledgeType::Date, KnowledgeType::Authority]
        );
        assert!(config.extraction.link_impacts);
        assert_eq!(config.fusion.source_priority, vec!["federal_register", "white_house"]);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    #[expect(clippy::expect_used, reason = "Test failure should panic with context")]
    fn template_round_trips_and_is_never_overwritten() {
        let dir = scratch_dir();
        std::fs::create_dir_all(&dir).expect("scratch dir should be created");
        let path = dir.join(CONFIG_FILE);

        Config::write_template(&path).expect("template should be written");
        let loaded = Config::load_from(&path).expect("template should load");
        assert_eq!(loaded, Config::default());

        assert!(Config::write_template(&path).is_err());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    #[expect(clippy::expect_used, reason = "Test failure should panic with context")]
    fn invalid_file_names_its_path() {
        let dir = scratch_dir();
        std::fs::create_dir_all(&dir).expect("scratch dir should be created");
        let path = dir.join(CONFIG_FILE);
        std::fs::write(&path, "{ not json").expect("file should be written");

        let err = Config::load_from(&path).expect_err("invalid json should fail");
        assert!(err.to_string().contains(CONFIG_FILE));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
