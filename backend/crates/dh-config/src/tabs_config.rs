use crate::{ConfigError, ConfigErrorResult, DEFAULT_TABS_PATH};

use std::path::{Path, PathBuf};

use dh_core::{Tab, TabCatalog};
use serde::Deserialize;

/// Location of the tabs file
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TabsConfig {
    /// Relative paths resolve against the config dir
    pub path: String,
}

impl Default for TabsConfig {
    fn default() -> Self {
        Self {
            path: String::from(DEFAULT_TABS_PATH),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TabsFile {
    #[serde(default)]
    tabs: Vec<Tab>,
}

impl TabsConfig {
    pub fn resolve(&self, config_dir: &Path) -> PathBuf {
        let path = Path::new(&self.path);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            config_dir.join(path)
        }
    }

    /// Read, parse and validate the tabs file into a catalog
    pub fn load_catalog(&self, config_dir: &Path) -> ConfigErrorResult<TabCatalog> {
        let path = self.resolve(config_dir);

        if !path.exists() {
            return Err(ConfigError::tabs(format!(
                "tabs file not found (path={})",
                path.display()
            )));
        }
        if !path.is_file() {
            return Err(ConfigError::tabs(format!(
                "tabs path is not a file (path={})",
                path.display()
            )));
        }

        let contents = std::fs::read_to_string(&path).map_err(|e| ConfigError::Io {
            path: path.clone(),
            source: e,
        })?;

        let parsed: TabsFile = toml::from_str(&contents).map_err(|e| ConfigError::Toml {
            path: path.clone(),
            source: e,
        })?;

        TabCatalog::new(parsed.tabs).map_err(|e| ConfigError::Tabs { path, source: e })
    }
}
