use std::{
    env, fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::analysis::{InMemoryPhotoStore, PhotoStore, SqlitePhotoStore};

pub const SETTINGS_PATH_ENV: &str = "ERGOWISE_SETTINGS";
const BIND_ADDR_ENV: &str = "ERGOWISE_BIND_ADDR";
const MAX_UPLOAD_BYTES_ENV: &str = "ERGOWISE_MAX_UPLOAD_BYTES";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PhotoStoreSettings {
    Memory,
    Bounded { capacity: usize },
    Sqlite { path: PathBuf },
}

impl Default for PhotoStoreSettings {
    fn default() -> Self {
        PhotoStoreSettings::Memory
    }
}

impl PhotoStoreSettings {
    pub fn build(&self) -> Result<Arc<dyn PhotoStore>> {
        let store: Arc<dyn PhotoStore> = match self {
            PhotoStoreSettings::Memory => {
                warn!("Using unbounded in-memory photo store; it grows until the process exits");
                Arc::new(InMemoryPhotoStore::unbounded())
            }
            PhotoStoreSettings::Bounded { capacity } => {
                info!("Using in-memory photo store keeping the newest {capacity} photos");
                Arc::new(InMemoryPhotoStore::bounded(*capacity))
            }
            PhotoStoreSettings::Sqlite { path } => {
                info!("Using SQLite photo store at {}", path.display());
                Arc::new(SqlitePhotoStore::open(path.clone())?)
            }
        };
        Ok(store)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ServerSettings {
    pub bind_addr: String,
    pub max_upload_bytes: usize,
    pub photo_store: PhotoStoreSettings,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:4000".into(),
            max_upload_bytes: 10 * 1024 * 1024,
            photo_store: PhotoStoreSettings::default(),
        }
    }
}

impl ServerSettings {
    /// Read settings from `path` when it exists, then apply environment
    /// overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = match path {
            Some(path) if path.exists() => {
                let contents = fs::read_to_string(path)
                    .with_context(|| format!("Failed to read settings from {}", path.display()))?;
                serde_json::from_str(&contents)
                    .with_context(|| format!("Failed to parse settings in {}", path.display()))?
            }
            Some(path) => {
                warn!("Settings file {} not found; using defaults", path.display());
                Self::default()
            }
            None => Self::default(),
        };

        settings.apply_overrides(|key| env::var(key).ok())?;
        Ok(settings)
    }

    fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = lookup(BIND_ADDR_ENV) {
            self.bind_addr = addr;
        }
        if let Some(raw) = lookup(MAX_UPLOAD_BYTES_ENV) {
            self.max_upload_bytes = raw
                .trim()
                .parse()
                .with_context(|| format!("{MAX_UPLOAD_BYTES_ENV} must be a byte count, got '{raw}'"))?;
        }
        Ok(())
    }
}
