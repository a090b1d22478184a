use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use crate::{AnalystError, provider::FileCacheProvider};

const CONFIG_DIR_NAME: &str = "f1analyst";
const CONFIG_FILE_NAME: &str = "config.json";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Root of the lap data cache
    pub cache_dir: Option<PathBuf>,
    pub last_year: Option<i32>,
    pub last_analysis: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            cache_dir: FileCacheProvider::default_cache_path().ok(),
            last_year: None,
            last_analysis: "bestlap".to_string(),
        }
    }
}

impl AppConfig {
    pub fn config_path() -> Result<PathBuf, AnalystError> {
        Ok(dirs::config_dir()
            .ok_or(AnalystError::NoConfigDir)?
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME))
    }

    /// Reads the config from the user's config directory, `None` if there is
    /// no config file yet.
    pub fn from_local_file() -> Result<Option<Self>, AnalystError> {
        Self::from_file(&Self::config_path()?)
    }

    pub fn from_file(config_path: &Path) -> Result<Option<Self>, AnalystError> {
        if !config_path.exists() {
            return Ok(None);
        }
        let file =
            File::open(config_path).map_err(|e| AnalystError::ConfigIOError { source: e })?;
        serde_json::from_reader(BufReader::new(file))
            .map(Some)
            .map_err(|e| AnalystError::ConfigSerializeError { source: e })
    }

    pub fn save(&self) -> Result<(), AnalystError> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<(), AnalystError> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| AnalystError::ConfigIOError { source: e })?;
        }

        let file = File::create(config_path)
            .map_err(|e| AnalystError::ConfigIOError { source: e })?;
        serde_json::to_writer_pretty(file, self)
            .map_err(|e| AnalystError::ConfigSerializeError { source: e })
    }

    /// Cache directory to open, falling back to the platform default
    pub fn resolved_cache_dir(&self) -> Result<PathBuf, AnalystError> {
        match &self.cache_dir {
            Some(dir) => Ok(dir.clone()),
            None => FileCacheProvider::default_cache_path(),
        }
    }
}
