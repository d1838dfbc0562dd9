//! User configuration
//!
//! Optional TOML file at `<config_home>/midcap/config.toml`. Every key may be
//! omitted; command line flags override whatever the file says.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::MidcapError;
use crate::filters::PAGE_SIZES;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Holdings snapshot (JSON array)
    pub data_path: Option<PathBuf>,
    /// Directory the export file is written to
    pub export_dir: PathBuf,
    pub page_size: usize,
    /// Default tracing filter when RUST_LOG is unset
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_path: None,
            export_dir: PathBuf::from("."),
            page_size: PAGE_SIZES[0],
            log_level: "warn".to_string(),
        }
    }
}

impl Config {
    pub fn default_path() -> Option<PathBuf> {
        dir_spec::config_home().map(|dir| dir.join("midcap").join("config.toml"))
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(raw).map_err(|e| MidcapError::ConfigError(e.to_string()))?;
        if !PAGE_SIZES.contains(&config.page_size) {
            return Err(MidcapError::ConfigError(format!(
                "page_size must be one of {:?}, got {}",
                PAGE_SIZES, config.page_size
            ))
            .into());
        }
        Ok(config)
    }

    /// Load from `path`, or from the default location. A missing file at
    /// the default location means defaults; a missing explicit file is an
    /// error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, explicit) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => match Self::default_path() {
                Some(p) => (p, false),
                None => return Ok(Self::default()),
            },
        };

        if !explicit && !path.exists() {
            debug!("No config at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("Reading config file: {}", path.display()))?;
        let config = Self::from_toml(&raw)
            .with_context(|| format!("Parsing config file: {}", path.display()))?;
        info!("Loaded config from {:?}", path);
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_gives_defaults() {
        assert_eq!(Config::from_toml("").unwrap(), Config::default());
    }

    #[test]
    fn test_all_keys() {
        let config = Config::from_toml(
            r#"
            data_path = "holdings.json"
            export_dir = "out"
            page_size = 25
            log_level = "debug"
            "#,
        )
        .unwrap();
        assert_eq!(config.data_path, Some(PathBuf::from("holdings.json")));
        assert_eq!(config.export_dir, PathBuf::from("out"));
        assert_eq!(config.page_size, 25);
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_rejects_unknown_page_size() {
        let err = Config::from_toml("page_size = 7").unwrap_err();
        assert!(err.to_string().contains("page_size"));
    }

    #[test]
    fn test_rejects_unknown_keys() {
        assert!(Config::from_toml("colour = true").is_err());
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::load(Some(&dir.path().join("nope.toml"))).is_err());
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "page_size = 50\n").unwrap();
        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.page_size, 50);
        assert_eq!(config.export_dir, PathBuf::from("."));
    }
}
