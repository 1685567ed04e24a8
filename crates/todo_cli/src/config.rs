use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use directories::ProjectDirs;

const CONFIG_FILE_NAME: &str = "config.toml";
const DATABASE_FILE_NAME: &str = "todo.sqlite3";
const LOG_DIR_NAME: &str = "logs";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not determine {0} directory")]
    DirectoryUnavailable(&'static str),
    #[error("Failed to read config file {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// SQLite file; defaults to the platform data directory.
    #[serde(default)]
    pub database_path: Option<PathBuf>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Must be absolute; defaults to `<data dir>/logs`.
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: None,
            log_level: default_log_level(),
            log_dir: None,
        }
    }
}

fn default_log_level() -> String {
    todo_core::default_log_level().to_string()
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "todo", "todo")
}

impl Config {
    /// Load from `path`, or from the platform config directory when `None`.
    /// A missing file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config_path = match path {
            Some(path) => path.to_path_buf(),
            None => Self::default_config_path()?,
        };

        if !config_path.exists() {
            return Ok(Config::default());
        }

        let contents = fs::read_to_string(&config_path).map_err(|source| ConfigError::ReadError {
            path: config_path.clone(),
            source,
        })?;
        Ok(toml::from_str(&contents)?)
    }

    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        project_dirs()
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
            .ok_or(ConfigError::DirectoryUnavailable("config"))
    }

    pub fn database_path(&self) -> Result<PathBuf, ConfigError> {
        match &self.database_path {
            Some(path) => Ok(path.clone()),
            None => project_dirs()
                .map(|dirs| dirs.data_dir().join(DATABASE_FILE_NAME))
                .ok_or(ConfigError::DirectoryUnavailable("data")),
        }
    }

    pub fn log_dir(&self) -> Result<PathBuf, ConfigError> {
        match &self.log_dir {
            Some(path) => Ok(path.clone()),
            None => project_dirs()
                .map(|dirs| dirs.data_dir().join(LOG_DIR_NAME))
                .ok_or(ConfigError::DirectoryUnavailable("data")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Config, ConfigError};
    use std::fs;
    use std::path::PathBuf;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(Some(dir.path().join("absent.toml").as_path())).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.log_level, todo_core::default_log_level());
    }

    #[test]
    fn explicit_values_override_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            "database_path = \"/srv/todo/app.sqlite3\"\nlog_level = \"warn\"\n",
        )
        .unwrap();

        let config = Config::load(Some(path.as_path())).unwrap();
        assert_eq!(
            config.database_path().unwrap(),
            PathBuf::from("/srv/todo/app.sqlite3")
        );
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.log_dir, None);
    }

    #[test]
    fn malformed_toml_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "log_level = [").unwrap();

        let err = Config::load(Some(path.as_path())).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }
}
