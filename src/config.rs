//! Application settings. Everything lives under `~/.venue-manager/`: the
//! optional `config.json`, the SQLite file used when no hosted backend is
//! configured, and the log file.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use directories::BaseDirs;
use log::LevelFilter;
use serde::{Deserialize, Serialize};

use crate::gateway::{Gateway, RestGateway, SqliteGateway};

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".venue-manager";
const CONFIG_FILE_NAME: &str = "config.json";
const DB_FILE_NAME: &str = "venues.sqlite";
const LOG_FILE_NAME: &str = "venue-manager.log";

const URL_VAR: &str = "VENUE_MANAGER_URL";
const API_KEY_VAR: &str = "VENUE_MANAGER_API_KEY";
const LOG_VAR: &str = "VENUE_MANAGER_LOG";

fn default_timeout_secs() -> u64 {
    10
}

/// Where the tables live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum BackendConfig {
    /// Embedded database; `path` defaults to the data directory.
    Sqlite {
        #[serde(default)]
        path: Option<PathBuf>,
    },
    /// Hosted PostgREST/Supabase project.
    Rest {
        url: String,
        api_key: String,
        #[serde(default = "default_timeout_secs")]
        timeout_secs: u64,
    },
}

impl Default for BackendConfig {
    fn default() -> Self {
        BackendConfig::Sqlite { path: None }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub backend: BackendConfig,
    /// How long a notification stays on screen.
    pub toast_secs: u64,
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend: BackendConfig::default(),
            toast_secs: 5,
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Read `config.json` from the data directory (if present) and apply the
    /// environment overrides on top.
    pub fn load() -> Result<Self> {
        let mut config = Self::from_path(&data_dir()?.join(CONFIG_FILE_NAME))?;
        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// A missing file is not an error; it just means defaults.
    pub fn from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        serde_json::from_str(&contents).with_context(|| format!("invalid config in {}", path.display()))
    }

    /// Setting both the URL and the key switches to the hosted backend.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let (Some(url), Some(api_key)) = (lookup(URL_VAR), lookup(API_KEY_VAR)) {
            let timeout_secs = match &self.backend {
                BackendConfig::Rest { timeout_secs, .. } => *timeout_secs,
                BackendConfig::Sqlite { .. } => default_timeout_secs(),
            };
            self.backend = BackendConfig::Rest {
                url,
                api_key,
                timeout_secs,
            };
        }
        if let Some(level) = lookup(LOG_VAR) {
            self.log_level = level;
        }
    }

    /// Unknown level names fall back to `info`.
    pub fn log_level(&self) -> LevelFilter {
        self.log_level.trim().parse().unwrap_or(LevelFilter::Info)
    }

    pub fn toast_duration(&self) -> Duration {
        Duration::from_secs(self.toast_secs.max(1))
    }

    pub fn log_path(&self) -> Result<PathBuf> {
        Ok(data_dir()?.join(LOG_FILE_NAME))
    }

    /// Build the gateway the configuration points at.
    pub fn connect(&self) -> Result<Box<dyn Gateway>> {
        match &self.backend {
            BackendConfig::Sqlite { path } => {
                let path = match path {
                    Some(path) => path.clone(),
                    None => data_dir()?.join(DB_FILE_NAME),
                };
                log::info!("using SQLite backend at {}", path.display());
                Ok(Box::new(SqliteGateway::open(&path)?))
            }
            BackendConfig::Rest {
                url,
                api_key,
                timeout_secs,
            } => {
                if url.trim().is_empty() {
                    return Err(anyhow!("backend url is empty"));
                }
                log::info!("using hosted backend at {url}");
                let gateway = RestGateway::new(url, api_key, Duration::from_secs(*timeout_secs))?;
                Ok(Box::new(gateway))
            }
        }
    }
}

/// Resolve `~/.venue-manager`.
pub fn data_dir() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME))
}
