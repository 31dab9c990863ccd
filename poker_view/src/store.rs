//! Session-scoped key-value storage shared by all pages.
//!
//! Pages are rebuilt on every navigation, so anything that must outlive a
//! page (who we logged in as, which variant the lobby plays) lives here.
//! The store can optionally mirror itself to a JSON file.

use log::{debug, warn};
use std::{
    collections::BTreeMap,
    fs, io,
    path::PathBuf,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};
use thiserror::Error;

use crate::game::entities::GameType;

pub const PLAYER_NAME_KEY: &str = "playerName";
pub const GAME_TYPE_KEY: &str = "gameType";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to access session file: {0}")]
    Io(#[from] io::Error),

    #[error("Session file is not valid JSON: {0}")]
    Format(#[from] serde_json::Error),
}

#[derive(Debug, Default)]
struct StoreInner {
    entries: BTreeMap<String, String>,
    path: Option<PathBuf>,
}

/// A cheaply cloneable handle; clones share the same entries.
#[derive(Clone, Debug, Default)]
pub struct SessionStore {
    inner: Arc<Mutex<StoreInner>>,
}

impl SessionStore {
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Opens a file-backed store, loading existing entries if the file
    /// exists.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(contents) if !contents.trim().is_empty() => serde_json::from_str(&contents)?,
            Ok(_) => BTreeMap::new(),
            Err(err) if err.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => return Err(err.into()),
        };
        debug!("session store opened at {}", path.display());
        Ok(Self {
            inner: Arc::new(Mutex::new(StoreInner {
                entries,
                path: Some(path),
            })),
        })
    }

    fn lock(&self) -> MutexGuard<'_, StoreInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.lock().entries.get(key).cloned()
    }

    pub fn set(&self, key: &str, value: impl Into<String>) -> Result<(), StoreError> {
        let mut inner = self.lock();
        inner.entries.insert(key.to_string(), value.into());
        if let Some(path) = &inner.path {
            fs::write(path, serde_json::to_string_pretty(&inner.entries)?)?;
        }
        Ok(())
    }

    pub fn player_name(&self) -> Option<String> {
        self.get(PLAYER_NAME_KEY).filter(|name| !name.is_empty())
    }

    pub fn set_player_name(&self, name: &str) {
        if let Err(err) = self.set(PLAYER_NAME_KEY, name) {
            warn!("failed to store player name: {err}");
        }
    }

    pub fn game_type(&self) -> Option<GameType> {
        self.get(GAME_TYPE_KEY)?.parse().ok()
    }

    pub fn set_game_type(&self, game_type: GameType) {
        if let Err(err) = self.set(GAME_TYPE_KEY, game_type.code().to_string()) {
            warn!("failed to store game type: {err}");
        }
    }
}
