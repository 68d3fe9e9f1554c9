//! User configuration for the datebook tools.

use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::error::{DatebookError, DatebookResult};

static DEFAULT_DATABASE_PATH: &str = "~/palm/DatebookDB.pdb";

fn default_database_path() -> PathBuf {
    PathBuf::from(DEFAULT_DATABASE_PATH)
}

fn is_default_database_path(p: &PathBuf) -> bool {
    *p == default_database_path()
}

/// Configuration at ~/.config/datebook/config.toml
///
/// Values can be overridden with `DATEBOOK_*` environment variables.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DatebookConfig {
    /// Datebook database used when no `--db` is given.
    #[serde(default = "default_database_path", skip_serializing_if = "is_default_database_path")]
    pub database: PathBuf,

    /// `tracing` filter directive, e.g. "info" or "datebook_core=debug".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_filter: Option<String>,
}

impl Default for DatebookConfig {
    fn default() -> Self {
        DatebookConfig {
            database: default_database_path(),
            log_filter: None,
        }
    }
}

impl DatebookConfig {
    pub fn config_path() -> DatebookResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| DatebookError::Config("Could not determine config directory".into()))?
            .join("datebook");

        Ok(config_dir.join("config.toml"))
    }

    /// Load from the default location, creating a commented template on first use.
    pub fn load() -> DatebookResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> DatebookResult<Self> {
        Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(Environment::with_prefix("DATEBOOK"))
            .build()
            .map_err(|e| DatebookError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| DatebookError::Config(e.to_string()))
    }

    /// Database path with `~` expanded.
    pub fn database_path(&self) -> PathBuf {
        expand_path(&self.database)
    }

    pub fn save(&self, path: &Path) -> DatebookResult<()> {
        let content =
            toml::to_string_pretty(self).map_err(|e| DatebookError::Config(e.to_string()))?;

        std::fs::write(path, content)
            .map_err(|e| DatebookError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> DatebookResult<()> {
        let contents = format!(
            "\
# datebook configuration

# Datebook database to read when --db is not given:
# database = \"{}\"

# Log filter (overridden by RUST_LOG):
# log_filter = \"info\"
",
            DEFAULT_DATABASE_PATH
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DatebookError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| DatebookError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}

/// Expand a leading `~` to the home directory.
pub fn expand_path(path: &Path) -> PathBuf {
    PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_template_parses_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        DatebookConfig::create_default_config(&path).unwrap();
        let cfg = DatebookConfig::load_from(&path).unwrap();

        assert_eq!(cfg.database, PathBuf::from(DEFAULT_DATABASE_PATH));
        assert_eq!(cfg.log_filter, None);
    }

    #[test]
    fn saved_config_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let cfg = DatebookConfig {
            database: PathBuf::from("/data/DatebookDB.pdb"),
            log_filter: Some("debug".to_string()),
        };
        cfg.save(&path).unwrap();

        assert_eq!(DatebookConfig::load_from(&path).unwrap(), cfg);
    }

    #[test]
    fn default_database_is_not_serialized() {
        let text = toml::to_string_pretty(&DatebookConfig::default()).unwrap();
        assert!(!text.contains("database"));
    }

    #[test]
    fn tilde_expands_to_home() {
        let expanded = DatebookConfig::default().database_path();
        assert!(!expanded.to_string_lossy().starts_with('~'));
        assert!(expanded.ends_with("palm/DatebookDB.pdb"));
    }
}
