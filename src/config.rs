// User configuration loaded from YAML

use crate::filter::FilterMode;
use crate::sort::SortMode;
use eyre::{Context, Result, eyre};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const APP_DIR: &str = "tasklist";
const CONFIG_FILE: &str = "config.yaml";

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case", deny_unknown_fields)]
pub struct Config {
    /// Directory holding the `.tasklist` store; platform data dir when unset
    pub data_dir: Option<PathBuf>,
    /// Filter applied when a session starts
    pub default_filter: FilterMode,
    /// Sort applied when a session starts
    pub default_sort: SortMode,
}

impl Config {
    /// Default location: `<config_dir>/tasklist/config.yaml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Load from `path`, or from the default location when `path` is None
    ///
    /// A missing file yields the defaults; a file that exists but does not
    /// parse is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match Self::default_path() {
                Some(p) => p,
                None => return Ok(Self::default()),
            },
        };

        if !path.exists() {
            debug!(file = ?path, "No config file, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path).context(format!("Failed to read config file {}", path.display()))?;
        let config: Config =
            serde_yaml::from_str(&content).context(format!("Failed to parse config file {}", path.display()))?;

        debug!(file = ?path, ?config, "Loaded config");
        Ok(config)
    }

    /// Directory the store lives under
    pub fn data_dir(&self) -> Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => dirs::data_dir()
                .map(|d| d.join(APP_DIR))
                .ok_or_else(|| eyre!("Could not determine a data directory; set data_dir in the config file")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp = TempDir::new().unwrap();
        let config = Config::load(Some(&temp.path().join("absent.yaml"))).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.default_filter, FilterMode::None);
    }

    #[test]
    fn test_load_yaml() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        fs::write(
            &path,
            "data_dir: /tmp/tasks\ndefault_filter: active\ndefault_sort: priority\n",
        )
        .unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.data_dir.as_deref(), Some(Path::new("/tmp/tasks")));
        assert_eq!(config.default_filter, FilterMode::Active);
        assert_eq!(config.default_sort, SortMode::Priority);
        assert_eq!(config.data_dir().unwrap(), PathBuf::from("/tmp/tasks"));
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        fs::write(&path, "default_sort: date\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.default_sort, SortMode::Date);
        assert_eq!(config.default_filter, FilterMode::None);
        assert!(config.data_dir.is_none());
    }

    #[test]
    fn test_invalid_yaml_is_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yaml");
        fs::write(&path, "default_filter: someday\n").unwrap();

        assert!(Config::load(Some(&path)).is_err());
    }
}
