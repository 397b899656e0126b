//! Settings and on-disk locations.
//!
//! Everything lives under one base directory: the platform data directory,
//! or `SPENDWISE_DATA_DIR` when set. `config.json` there is optional; a
//! missing file means defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

pub const DATA_DIR_ENV: &str = "SPENDWISE_DATA_DIR";

const SETTINGS_FILE: &str = "config.json";
const DATABASE_FILE: &str = "spendwise.db";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paths {
    base_dir: PathBuf,
}

impl Paths {
    pub fn resolve() -> Result<Self, ConfigError> {
        if let Some(custom) = std::env::var_os(DATA_DIR_ENV).filter(|v| !v.is_empty()) {
            return Ok(Self::with_base_dir(PathBuf::from(custom)));
        }
        let dirs = directories::ProjectDirs::from("com", "spendwise", "Spendwise")
            .ok_or(ConfigError::NoDataDir)?;
        Ok(Self::with_base_dir(dirs.data_dir().to_path_buf()))
    }

    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join(SETTINGS_FILE)
    }

    pub fn default_database(&self) -> PathBuf {
        self.base_dir.join(DATABASE_FILE)
    }

    pub fn ensure_base_dir(&self) -> Result<(), ConfigError> {
        std::fs::create_dir_all(&self.base_dir).map_err(|source| ConfigError::Io {
            path: self.base_dir.clone(),
            source,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Database file; relative paths are taken from the base directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_path: Option<PathBuf>,

    /// `tracing` filter used when `RUST_LOG` is not set.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_log_filter() -> String {
    "spendwise=warn".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_path: None,
            log_filter: default_log_filter(),
        }
    }
}

impl Settings {
    pub fn load(paths: &Paths) -> Result<Self, ConfigError> {
        let path = paths.settings_file();
        let contents = match std::fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => return Err(ConfigError::Io { path, source }),
        };
        serde_json::from_str(&contents).map_err(|source| ConfigError::Parse { path, source })
    }

    pub fn save(&self, paths: &Paths) -> Result<(), ConfigError> {
        paths.ensure_base_dir()?;
        let path = paths.settings_file();
        let contents = serde_json::to_string_pretty(self).map_err(|source| ConfigError::Parse {
            path: path.clone(),
            source,
        })?;
        std::fs::write(&path, contents).map_err(|source| ConfigError::Io { path, source })
    }

    pub fn database_path(&self, paths: &Paths) -> PathBuf {
        match &self.database_path {
            Some(p) if p.is_absolute() => p.clone(),
            Some(p) => paths.base_dir().join(p),
            None => paths.default_database(),
        }
    }
}
