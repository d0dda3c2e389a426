//! JSON document storage
//!
//! Each collection is one pretty-printed JSON file in the data folder.
//! Every operation reads through to disk; there is no in-memory mirror.
//! Writes go to `<file>.tmp` and are renamed into place, and a per-document
//! async mutex serialises read-modify-write cycles within this process.

pub mod games;
pub mod platforms;
pub mod settings;

use serde::{de::DeserializeOwned, Serialize};
use std::ffi::OsString;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::models::{Game, Platform, Settings};
use indexmap::IndexMap;

pub const GAMES_FILE: &str = "games.json";
pub const PLATFORMS_FILE: &str = "platforms.json";
pub const SETTINGS_FILE: &str = "settings.json";

/// Storage and repository errors
#[derive(Debug, Error)]
pub enum StorageError {
    /// Document could not be read or written
    #[error("I/O error on {file}: {reason}")]
    Io { file: String, reason: String },

    /// Document exists but is not valid JSON for its collection
    #[error("Malformed document {file}: {reason}")]
    Malformed { file: String, reason: String },

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Validation(String),
}

/// One JSON file holding a whole collection
pub struct JsonDocument<T> {
    path: PathBuf,
    lock: Arc<Mutex<()>>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for JsonDocument<T> {
    fn clone(&self) -> Self {
        Self {
            path: self.path.clone(),
            lock: Arc::clone(&self.lock),
            _marker: PhantomData,
        }
    }
}

impl<T> JsonDocument<T>
where
    T: Serialize + DeserializeOwned + Default,
{
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            lock: Arc::new(Mutex::new(())),
            _marker: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    fn io_error(&self, e: impl std::fmt::Display) -> StorageError {
        StorageError::Io {
            file: self.file_name(),
            reason: e.to_string(),
        }
    }

    /// Read the whole document; a missing or empty file reads as empty
    pub async fn read(&self) -> Result<T, StorageError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(T::default()),
            Err(e) => return Err(self.io_error(e)),
        };

        if content.trim().is_empty() {
            return Ok(T::default());
        }

        serde_json::from_str(&content).map_err(|e| StorageError::Malformed {
            file: self.file_name(),
            reason: e.to_string(),
        })
    }

    /// Replace the whole document atomically
    async fn write(&self, value: &T) -> Result<(), StorageError> {
        let content = serde_json::to_string_pretty(value).map_err(|e| self.io_error(e))?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| self.io_error(e))?;
            }
        }

        let mut temp: OsString = self.path.clone().into_os_string();
        temp.push(".tmp");
        let temp = PathBuf::from(temp);

        let written = match tokio::fs::write(&temp, content).await {
            Ok(()) => tokio::fs::rename(&temp, &self.path).await,
            Err(e) => Err(e),
        };
        if let Err(e) = written {
            if let Err(cleanup) = tokio::fs::remove_file(&temp).await {
                if cleanup.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!(
                        file = %temp.display(),
                        error = %cleanup,
                        "Failed to remove temp file"
                    );
                }
            }
            return Err(self.io_error(e));
        }

        tracing::debug!(file = %self.file_name(), "Document written");
        Ok(())
    }

    /// Read, mutate and write back under the document lock
    ///
    /// Nothing is written when `mutate` returns an error.
    pub async fn update<R, F>(&self, mutate: F) -> Result<R, StorageError>
    where
        F: FnOnce(&mut T) -> Result<R, StorageError>,
    {
        let _guard = self.lock.lock().await;
        let mut document = self.read().await?;
        let result = mutate(&mut document)?;
        self.write(&document).await?;
        Ok(result)
    }
}

/// All documents of one data folder
#[derive(Clone)]
pub struct JsonStore {
    pub games: JsonDocument<IndexMap<String, Game>>,
    pub platforms: JsonDocument<IndexMap<String, Platform>>,
    pub settings: JsonDocument<Settings>,
}

impl JsonStore {
    /// Locate the documents inside `data_dir`; files are created on first write
    pub fn open(data_dir: &Path) -> Self {
        Self {
            games: JsonDocument::new(data_dir.join(GAMES_FILE)),
            platforms: JsonDocument::new(data_dir.join(PLATFORMS_FILE)),
            settings: JsonDocument::new(data_dir.join(SETTINGS_FILE)),
        }
    }
}
