use crate::error::{IndexerError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// File looked up at the backlog root
pub const CONFIG_FILE_NAME: &str = "backlog.toml";

/// Layout and rule configuration for a backlog tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BacklogConfig {
    /// Subdirectories of the root that hold backlog entities
    pub task_dirs: Vec<String>,

    /// Subdirectory of one-file-per-agent definitions
    pub agents_dir: String,

    /// File inside `agents_dir` that indexes the registry (not an agent)
    pub registry_index: String,

    /// Document extension, without the dot
    pub extension: String,

    /// Closed set of category id prefixes
    pub category_prefixes: Vec<String>,

    /// Heading depth checkpoints are expected at
    pub checkpoint_depth: usize,

    /// Properties every item must carry
    pub required_properties: Vec<String>,

    /// Trailing window for velocity and trend
    pub velocity_window_days: u32,

    /// Trailing window for the burndown rate
    pub burndown_window_days: u32,

    /// Zero-padding width of generated ids
    pub id_width: usize,
}

impl Default for BacklogConfig {
    fn default() -> Self {
        Self {
            task_dirs: vec![
                "projects".to_string(),
                "bugs".to_string(),
                "improvements".to_string(),
            ],
            agents_dir: "agents".to_string(),
            registry_index: "README.org".to_string(),
            extension: "org".to_string(),
            category_prefixes: vec!["PROJ".to_string(), "BUG".to_string(), "IMP".to_string()],
            checkpoint_depth: 2,
            required_properties: vec![
                "ID".to_string(),
                "AGENT".to_string(),
                "EFFORT".to_string(),
                "PRIORITY".to_string(),
            ],
            velocity_window_days: 7,
            burndown_window_days: 14,
            id_width: 3,
        }
    }
}

impl BacklogConfig {
    /// Load `backlog.toml` from `root`, falling back to defaults when absent
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join(CONFIG_FILE_NAME);
        if !path.is_file() {
            log::debug!("No {} at {}, using defaults", CONFIG_FILE_NAME, root.display());
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Load an explicit config file
    pub fn load_from(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config = Self::parse_toml(&raw)
            .map_err(|err| IndexerError::InvalidConfig(format!("{}: {err}", path.display())))?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        Self::parse_toml(raw).map_err(IndexerError::InvalidConfig)
    }

    fn parse_toml(raw: &str) -> std::result::Result<Self, String> {
        let config: Self = toml::from_str(raw).map_err(|err| err.to_string())?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.category_prefixes.is_empty() {
            return Err("category_prefixes must not be empty".to_string());
        }
        if let Some(bad) = self
            .category_prefixes
            .iter()
            .find(|p| p.is_empty() || !p.chars().all(|c| c.is_ascii_alphanumeric()))
        {
            return Err(format!("category prefix {bad:?} must be non-empty and alphanumeric"));
        }
        if self.task_dirs.is_empty() {
            return Err("task_dirs must not be empty".to_string());
        }
        if self.checkpoint_depth == 0 {
            return Err("checkpoint_depth must be > 0".to_string());
        }
        if self.velocity_window_days == 0 || self.burndown_window_days == 0 {
            return Err("window lengths must be > 0 days".to_string());
        }
        if self.id_width == 0 {
            return Err("id_width must be > 0".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn test_default_config_valid() {
        assert!(BacklogConfig::default().validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = BacklogConfig::from_toml("category_prefixes = [\"EPIC\"]\n").unwrap();
        assert_eq!(config.category_prefixes, vec!["EPIC".to_string()]);
        assert_eq!(config.agents_dir, "agents");
        assert_eq!(config.checkpoint_depth, 2);
    }

    #[test]
    fn unknown_keys_are_rejected_by_name() {
        let err = BacklogConfig::from_toml("task_dir = [\"x\"]\n").unwrap_err();
        assert!(err.to_string().contains("task_dir"), "{err}");
    }

    #[test]
    fn test_config_validation() {
        let mut config = BacklogConfig::default();

        config.category_prefixes.clear();
        assert!(config.validate().is_err());

        config.category_prefixes = vec!["PR-OJ".to_string()];
        assert!(config.validate().is_err());

        config.category_prefixes = vec!["PROJ".to_string()];
        config.checkpoint_depth = 0;
        assert!(config.validate().is_err());

        config.checkpoint_depth = 2;
        config.velocity_window_days = 0;
        assert!(config.validate().is_err());

        config.velocity_window_days = 7;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn load_falls_back_to_defaults() {
        let temp = tempdir().unwrap();
        let config = BacklogConfig::load(temp.path()).unwrap();
        assert_eq!(config, BacklogConfig::default());

        std::fs::write(temp.path().join(CONFIG_FILE_NAME), "id_width = 4\n").unwrap();
        let config = BacklogConfig::load(temp.path()).unwrap();
        assert_eq!(config.id_width, 4);
    }
}
