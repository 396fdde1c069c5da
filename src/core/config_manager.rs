// src/core/config_manager.rs
//! Configuration: environment variables over an optional `jobmatch.yaml`, over defaults

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::core::FsOps;
use crate::types::SaveKey;

pub const DEFAULT_CONFIG_FILE: &str = "jobmatch.yaml";
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

#[derive(Debug, Clone)]
pub struct ConfigManager {
    pub service: ServiceConfig,
    pub storage: StorageConfig,
    pub log_file: Option<PathBuf>,
    /// The yaml file the values came from, if one was read.
    pub source: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub api_url: String,
    /// `None` means requests wait as long as the transport does.
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub database_path: PathBuf,
    pub download_dir: PathBuf,
    pub save_key: SaveKey,
}

/// Shape of `jobmatch.yaml`. Every field is optional.
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    api_url: Option<String>,
    timeout_seconds: Option<u64>,
    database_path: Option<PathBuf>,
    download_dir: Option<PathBuf>,
    save_key: Option<SaveKey>,
    log_file: Option<PathBuf>,
}

impl ConfigManager {
    /// Load from `config_path`, or `jobmatch.yaml` in the working directory
    /// when it exists, then apply environment overrides.
    /// Runs before logging is set up, so it logs nothing itself.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let (file, source) = match Self::find_file(config_path)? {
            Some(path) => (Self::load_file(&path)?, Some(path)),
            None => (ConfigFile::default(), None),
        };
        let mut config = Self::resolve(file, |key| std::env::var(key).ok())?;
        config.source = source;
        Ok(config)
    }

    fn find_file(config_path: Option<&Path>) -> Result<Option<PathBuf>> {
        match config_path {
            Some(path) => {
                if !path.exists() {
                    anyhow::bail!("Config file not found: {}", path.display());
                }
                Ok(Some(path.to_path_buf()))
            }
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                Ok(default.exists().then_some(default))
            }
        }
    }

    fn load_file(path: &Path) -> Result<ConfigFile> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::parse_file(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    fn parse_file(content: &str) -> Result<ConfigFile> {
        if content.trim().is_empty() {
            return Ok(ConfigFile::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    fn resolve(file: ConfigFile, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_url = env("JOB_MATCH_API_URL")
            .or(file.api_url)
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let timeout_seconds = match env("JOBMATCH_TIMEOUT_SECS") {
            Some(raw) => Some(
                raw.trim()
                    .parse::<u64>()
                    .context("JOBMATCH_TIMEOUT_SECS must be a whole number of seconds")?,
            ),
            None => file.timeout_seconds,
        };

        let database_path = env("JOBMATCH_STORE")
            .map(PathBuf::from)
            .or(file.database_path)
            .unwrap_or_else(Self::default_database_path);

        let download_dir = env("JOBMATCH_DOWNLOADS")
            .map(PathBuf::from)
            .or(file.download_dir)
            .unwrap_or_else(|| PathBuf::from("downloads"));

        let save_key = match env("JOBMATCH_SAVE_KEY") {
            Some(raw) => raw.parse::<SaveKey>()?,
            None => file.save_key.unwrap_or_default(),
        };

        let log_file = env("JOBMATCH_LOG_FILE").map(PathBuf::from).or(file.log_file);

        Ok(Self {
            service: ServiceConfig {
                api_url,
                timeout_seconds,
            },
            storage: StorageConfig {
                database_path,
                download_dir,
                save_key,
            },
            log_file,
            source: None,
        })
    }

    fn default_database_path() -> PathBuf {
        let base = std::env::var_os("XDG_DATA_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".local/share")))
            .unwrap_or_else(|| PathBuf::from("."));
        base.join("jobmatch").join("jobmatch.db")
    }

    /// Ensure all required directories exist
    pub async fn ensure_directories(&self) -> Result<()> {
        FsOps::ensure_dir_exists(&self.storage.download_dir).await?;

        if let Some(db_parent) = self.storage.database_path.parent() {
            if !db_parent.as_os_str().is_empty() {
                FsOps::ensure_dir_exists(db_parent).await?;
            }
        }

        Ok(())
    }
}
