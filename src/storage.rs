#[cfg(test)]
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use timer_core::{decode_record, encode_record, Counters, Settings, RECORD_KEY};

use crate::error::StorageError;

const DICT_NAME: &str = "timers";

/// A flat key-value store holding opaque string records.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// One file per key inside a dictionary directory.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(root: &Path) -> Self {
        Self {
            dir: root.join(DICT_NAME),
        }
    }

    /// The per-user data directory, `<data_local_dir>/pomodoro`.
    pub fn default_root() -> Result<PathBuf, StorageError> {
        dirs::data_local_dir()
            .map(|d| d.join("pomodoro"))
            .ok_or(StorageError::NoDataDir)
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir)?;
        // Readers only ever see a complete record.
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }
}

#[cfg(test)]
#[derive(Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

#[cfg(test)]
impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Durable settings and counters under a single fixed key.
///
/// Failures are logged and swallowed: a broken store never stops the timer.
pub struct TimerStorage<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> TimerStorage<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn load(&self) -> Option<(Settings, Counters)> {
        let text = match self.store.get(RECORD_KEY) {
            Ok(Some(text)) => text,
            Ok(None) => return None,
            Err(e) => {
                log::error!("Failed to read saved timer state: {}", e);
                return None;
            }
        };
        match decode_record(&text) {
            Ok(record) => Some(record),
            Err(e) => {
                log::warn!("Ignoring malformed saved timer state: {}", e);
                None
            }
        }
    }

    pub fn save(&mut self, settings: &Settings, counters: &Counters) {
        let result = encode_record(settings, counters)
            .map_err(StorageError::from)
            .and_then(|text| self.store.set(RECORD_KEY, &text));
        match result {
            Ok(()) => log::debug!("Saved timer state"),
            Err(e) => log::error!("Failed to save timer state: {}", e),
        }
    }

    #[cfg(test)]
    pub fn store(&self) -> &S {
        &self.store
    }

    #[cfg(test)]
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }
}
