//! Key-value persistence used for quotes and UI state.
//!
//! Two scopes exist: a durable store that survives restarts (a JSON file in the
//! data directory) and a session store that lives in the OS temp directory.
//! Both are [`FileStore`]s; [`MemoryStore`] backs tests.
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use strum::{AsRefStr, Display, EnumString};

use crate::result::Result;

/// Keys written by this workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, AsRefStr)]
pub enum StorageKey {
    /// Full quote sequence as JSON (durable).
    #[strum(serialize = "quotes")]
    Quotes,
    /// Last selected category filter (durable).
    #[strum(serialize = "selectedCategory")]
    SelectedCategory,
    /// Index of the last shown quote (session).
    #[strum(serialize = "lastQuoteIndex")]
    LastQuoteIndex,
}

impl StorageKey {
    /// Key name as written to storage.
    pub fn as_str(&self) -> &str {
        self.as_ref()
    }
}

/// String-keyed storage with string values.
pub trait KeyValueStore {
    /// Returns the value stored under `key`, if any.
    fn get(&self, key: StorageKey) -> Result<Option<String>>;
    /// Stores `value` under `key`, replacing any previous value.
    fn set(&mut self, key: StorageKey, value: &str) -> Result<()>;
    /// Deletes `key`; missing keys are not an error.
    fn remove(&mut self, key: StorageKey) -> Result<()>;
    /// Picks up changes written by other processes. In-process stores have
    /// nothing to refresh.
    fn reload(&mut self) -> Result<()> {
        Ok(())
    }
}

/// In-memory store.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: StorageKey) -> Result<Option<String>> {
        Ok(self.entries.get(key.as_str()).cloned())
    }

    fn set(&mut self, key: StorageKey, value: &str) -> Result<()> {
        self.entries.insert(key.as_str().to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: StorageKey) -> Result<()> {
        self.entries.remove(key.as_str());
        Ok(())
    }
}

/// Store backed by a single JSON object file.
///
/// Several processes may share the file, so every mutation re-reads it before
/// writing the whole object back.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    /// Opens the store at `path`.
    ///
    /// A missing file is an empty store. A corrupted file is logged and also
    /// treated as empty; it is overwritten on the next mutation.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = read_entries(&path)?;
        Ok(Self { path, entries })
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.entries)?;
        fs::write(&self.path, json)?;
        debug!("Saved storage to {}", self.path.display());
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: StorageKey) -> Result<Option<String>> {
        Ok(self.entries.get(key.as_str()).cloned())
    }

    fn set(&mut self, key: StorageKey, value: &str) -> Result<()> {
        self.reload()?;
        self.entries.insert(key.as_str().to_string(), value.to_string());
        self.flush()
    }

    fn remove(&mut self, key: StorageKey) -> Result<()> {
        self.reload()?;
        if self.entries.remove(key.as_str()).is_some() {
            self.flush()?;
        }
        Ok(())
    }

    fn reload(&mut self) -> Result<()> {
        self.entries = read_entries(&self.path)?;
        Ok(())
    }
}

/// Reads the key-value object at `path`.
///
/// A missing file is empty. A corrupted file is logged and also treated as
/// empty; it is overwritten on the next mutation.
fn read_entries(path: &Path) -> Result<BTreeMap<String, String>> {
    if !path.exists() {
        debug!("Storage file {} not found, starting empty", path.display());
        return Ok(BTreeMap::new());
    }
    let json = fs::read_to_string(path)?;
    match serde_json::from_str(&json) {
        Ok(entries) => Ok(entries),
        Err(e) => {
            warn!("Storage file {} is corrupted, starting empty: {}", path.display(), e);
            Ok(BTreeMap::new())
        }
    }
}

/// Store that serves a fixed value for [`StorageKey::Quotes`] and rejects
/// every write.
#[cfg(test)]
pub(crate) struct FailingStore {
    pub(crate) quotes: Option<String>,
}

#[cfg(test)]
impl KeyValueStore for FailingStore {
    fn get(&self, key: StorageKey) -> Result<Option<String>> {
        Ok(match key {
            StorageKey::Quotes => self.quotes.clone(),
            _ => None,
        })
    }

    fn set(&mut self, _key: StorageKey, _value: &str) -> Result<()> {
        Err(crate::error::QuoteError::Format("disk full".into()))
    }

    fn remove(&mut self, _key: StorageKey) -> Result<()> {
        Err(crate::error::QuoteError::Format("disk full".into()))
    }
}
