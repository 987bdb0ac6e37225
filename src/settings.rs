use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::document::{
    DEFAULT_CACHE_SIZE, DEFAULT_PLACEHOLDER_GRAY, DEFAULT_RESOLUTION, DocumentOptions,
};
use crate::document::search::MAX_SEARCH_HITS;

const SETTINGS_FILENAME: &str = "config.yaml";
const APP_NAME: &str = "docview";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Target resolution in dots per inch
    #[serde(default = "default_resolution")]
    pub resolution: u32,

    /// Number of pages kept rendered-ready
    #[serde(default = "default_cache_size")]
    pub cache_size: usize,

    #[serde(default = "default_max_search_hits")]
    pub max_search_hits: usize,

    /// Gray level painted for pages that failed to load
    #[serde(default = "default_placeholder_gray")]
    pub placeholder_gray: u8,

    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_resolution() -> u32 {
    DEFAULT_RESOLUTION
}

fn default_cache_size() -> usize {
    DEFAULT_CACHE_SIZE
}

fn default_max_search_hits() -> usize {
    MAX_SEARCH_HITS
}

fn default_placeholder_gray() -> u8 {
    DEFAULT_PLACEHOLDER_GRAY
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            resolution: default_resolution(),
            cache_size: default_cache_size(),
            max_search_hits: default_max_search_hits(),
            placeholder_gray: default_placeholder_gray(),
            log_level: default_log_level(),
        }
    }
}

impl Settings {
    /// Load from `path` if given, otherwise from the per-user config file.
    /// A missing file yields defaults; a malformed one is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match preferred_config_path() {
                Some(path) => path,
                None => {
                    info!("Could not determine config directory, using default settings");
                    return Ok(Self::default());
                }
            },
        };
        Self::load_from_path(&path)
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No settings file at {path:?}, using defaults");
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file {path:?}"))?;
        let settings = Self::from_yaml(&content)
            .with_context(|| format!("Failed to parse settings file {path:?}"))?;
        debug!("Loaded settings from {path:?}");
        Ok(settings)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Document tunables; resolution and cache size are at least 1
    #[must_use]
    pub fn to_options(&self) -> DocumentOptions {
        DocumentOptions {
            resolution: self.resolution.max(1),
            cache_size: self.cache_size.max(1),
            max_search_hits: self.max_search_hits,
            placeholder_gray: self.placeholder_gray,
        }
    }

    /// Parsed `log_level`, falling back to `Info` for unknown names
    #[must_use]
    pub fn log_level_filter(&self) -> log::LevelFilter {
        self.log_level.parse().unwrap_or(log::LevelFilter::Info)
    }
}

pub fn preferred_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|config| config.join(APP_NAME).join(SETTINGS_FILENAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let settings = Settings::load(Some(dir.path().join("absent.yaml").as_path())).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.to_options(), DocumentOptions::default());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "resolution: 96\ncache_size: 0\n").unwrap();

        let settings = Settings::load_from_path(&path).unwrap();
        assert_eq!(settings.resolution, 96);
        assert_eq!(settings.max_search_hits, MAX_SEARCH_HITS);
        assert_eq!(settings.to_options().cache_size, 1);
    }

    #[test]
    fn zero_resolution_is_clamped() {
        let settings = Settings::from_yaml("resolution: 0\n").unwrap();
        assert_eq!(settings.resolution, 0);
        assert_eq!(settings.to_options().resolution, 1);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "resolution: [not, a, number]\n").unwrap();
        assert!(Settings::load_from_path(&path).is_err());
    }

    #[test]
    fn log_level_parsing() {
        let mut settings = Settings::default();
        assert_eq!(settings.log_level_filter(), log::LevelFilter::Info);
        settings.log_level = "TRACE".to_string();
        assert_eq!(settings.log_level_filter(), log::LevelFilter::Trace);
        settings.log_level = "loud".to_string();
        assert_eq!(settings.log_level_filter(), log::LevelFilter::Info);
    }
}
