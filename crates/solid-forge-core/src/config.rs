use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SolidForgeError};

const CONFIG_FILE: &str = "config.toml";

/// Default config template with rich comments
const DEFAULT_CONFIG_TEMPLATE: &str = r#"# solid-forge configuration file
# Location: ~/.solid-forge/config.toml

[add]
# Config file edited by `solid-forge add`, relative to the project directory
# Default: "vite.config.ts"
config_file = "vite.config.ts"

# Overwrite existing plugin entries without asking for --force
# Default: false
force = false

[scaffold]
# Template repository cloned by `solid-forge new`
# Default: "solidjs/templates"
template_repo = "solidjs/templates"
"#;

/// Global configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub add: AddConfig,
    #[serde(default)]
    pub scaffold: ScaffoldConfig,
}

/// `add` command configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddConfig {
    /// Config file edited in place, relative to the project directory
    #[serde(default = "default_config_file")]
    pub config_file: String,

    /// Overwrite existing entries by default
    #[serde(default)]
    pub force: bool,
}

/// `new` command configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScaffoldConfig {
    /// Template repository passed to degit
    #[serde(default = "default_template_repo")]
    pub template_repo: String,
}

fn default_config_file() -> String {
    "vite.config.ts".to_string()
}

fn default_template_repo() -> String {
    "solidjs/templates".to_string()
}

impl Default for AddConfig {
    fn default() -> Self {
        Self {
            config_file: default_config_file(),
            force: false,
        }
    }
}

impl Default for ScaffoldConfig {
    fn default() -> Self {
        Self {
            template_repo: default_template_repo(),
        }
    }
}

impl Config {
    /// Load config from base directory
    pub fn load(base_dir: &Path) -> Result<Self> {
        let path = base_dir.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)?;
        let config: Config = toml::from_str(&content).map_err(|e| SolidForgeError::ConfigParse {
            path: path.clone(),
            message: e.to_string(),
        })?;

        Ok(config)
    }

    /// Save config to base directory
    pub fn save(&self, base_dir: &Path) -> Result<()> {
        let path = base_dir.join(CONFIG_FILE);
        fs::create_dir_all(base_dir)?;

        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    /// Get config file path
    pub fn path(base_dir: &Path) -> PathBuf {
        base_dir.join(CONFIG_FILE)
    }

    /// Initialize config with default template (rich comments)
    pub fn init(base_dir: &Path) -> Result<PathBuf> {
        let path = base_dir.join(CONFIG_FILE);
        fs::create_dir_all(base_dir)?;

        if !path.exists() {
            fs::write(&path, DEFAULT_CONFIG_TEMPLATE)?;
        }

        Ok(path)
    }

    /// Get a config value by dot-notation key
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "add.config_file" => Some(self.add.config_file.clone()),
            "add.force" => Some(self.add.force.to_string()),
            "scaffold.template_repo" => Some(self.scaffold.template_repo.clone()),
            _ => None,
        }
    }

    /// Set a config value by dot-notation key
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "add.config_file" => {
                self.add.config_file = value.to_string();
                Ok(())
            }
            "add.force" => {
                self.add.force = parse_bool(key, value)?;
                Ok(())
            }
            "scaffold.template_repo" => {
                self.scaffold.template_repo = value.to_string();
                Ok(())
            }
            _ => Err(SolidForgeError::ConfigKeyNotFound {
                key: key.to_string(),
            }),
        }
    }

    /// List all config keys with their current values
    pub fn list(&self) -> Vec<(String, String)> {
        vec![
            ("add.config_file".to_string(), self.add.config_file.clone()),
            ("add.force".to_string(), self.add.force.to_string()),
            (
                "scaffold.template_repo".to_string(),
                self.scaffold.template_repo.clone(),
            ),
        ]
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    value
        .trim()
        .parse()
        .map_err(|_| SolidForgeError::InvalidConfigValue {
            key: key.to_string(),
            value: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.add.config_file, "vite.config.ts");
        assert!(!config.add.force);
        assert_eq!(config.scaffold.template_repo, "solidjs/templates");
    }

    #[test]
    fn test_config_get_set() {
        let mut config = Config::default();

        config.set("add.force", "true").unwrap();
        assert_eq!(config.get("add.force").unwrap(), "true");

        config.set("add.config_file", "vite.config.js").unwrap();
        assert_eq!(config.get("add.config_file").unwrap(), "vite.config.js");
    }

    #[test]
    fn test_set_invalid_bool() {
        let mut config = Config::default();
        assert!(matches!(
            config.set("add.force", "yes please"),
            Err(SolidForgeError::InvalidConfigValue { .. })
        ));
    }

    #[test]
    fn test_set_unknown_key() {
        let mut config = Config::default();
        assert!(matches!(
            config.set("install.manager", "pnpm"),
            Err(SolidForgeError::ConfigKeyNotFound { .. })
        ));
    }

    #[test]
    fn test_load_save_round_trip() {
        let temp = TempDir::new().unwrap();

        let mut config = Config::default();
        config.add.force = true;
        config.save(temp.path()).unwrap();

        let loaded = Config::load(temp.path()).unwrap();
        assert!(loaded.add.force);
        assert_eq!(loaded.add.config_file, "vite.config.ts");
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let temp = TempDir::new().unwrap();
        let config = Config::load(temp.path()).unwrap();
        assert_eq!(config.add.config_file, "vite.config.ts");
    }

    #[test]
    fn test_init_writes_template_once() {
        let temp = TempDir::new().unwrap();

        let path = Config::init(temp.path()).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("[add]"));

        fs::write(&path, "[add]\nforce = true\n").unwrap();
        Config::init(temp.path()).unwrap();
        assert!(fs::read_to_string(&path).unwrap().contains("force = true"));
    }

    #[test]
    fn test_list_covers_all_keys() {
        let config = Config::default();
        let listed = config.list();
        for (key, _) in &listed {
            assert!(config.get(key).is_some());
        }
        assert_eq!(listed.len(), 3);
    }
}
