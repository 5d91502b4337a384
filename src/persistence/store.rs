use super::files::{atomic_write, ensure_data_dir};
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

/// Keys under which application state is persisted
pub mod keys {
    pub const TASKS: &str = "tasks";
    pub const LISTS: &str = "lists";
    pub const SETTINGS: &str = "settings";
    pub const ACTIVE_LIST: &str = "activeList";
    pub const FILTER: &str = "filter";
    pub const POMODORO_SETTINGS: &str = "pomodoroSettings";
    pub const POMODORO_MODE: &str = "pomodoroMode";
    pub const POMODORO_TIMER_STATE: &str = "pomodoroTimerState";

    /// Every key the application writes; used by clear-all-data
    pub const ALL: [&str; 8] = [
        TASKS,
        LISTS,
        SETTINGS,
        ACTIVE_LIST,
        FILTER,
        POMODORO_SETTINGS,
        POMODORO_MODE,
        POMODORO_TIMER_STATE,
    ];
}

/// A persistent key-value store with JSON string values
///
/// The core only depends on this trait; `FileStore` backs the real
/// application and `MemoryStore` backs tests.
pub trait KvStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// Read and deserialize a JSON value, `None` when the key is absent
pub fn read_json<T: DeserializeOwned>(store: &dyn KvStore, key: &str) -> Result<Option<T>> {
    match store.get(key)? {
        Some(raw) => {
            let value = serde_json::from_str(&raw)
                .with_context(|| format!("Malformed JSON stored under key `{}`", key))?;
            Ok(Some(value))
        }
        None => Ok(None),
    }
}

/// Serialize and write a JSON value
pub fn write_json<T: Serialize>(store: &mut dyn KvStore, key: &str, value: &T) -> Result<()> {
    let raw = serde_json::to_string(value)
        .with_context(|| format!("Failed to serialize value for key `{}`", key))?;
    store.set(key, &raw)
}

/// Remove every persisted key
pub fn clear_all(store: &mut dyn KvStore) -> Result<()> {
    for key in keys::ALL {
        store.remove(key)?;
    }
    Ok(())
}

/// Store backed by one `<key>.json` file per key in the data directory
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Open the store in the resolved data directory, creating it if needed
    pub fn open_default() -> Result<Self> {
        Ok(Self::new(ensure_data_dir()?))
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KvStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Ok(Some(content))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        atomic_write(self.path_for(key), value)
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let path = self.path_for(key);
        if path.exists() {
            fs::remove_file(&path)
                .with_context(|| format!("Failed to remove {}", path.display()))?;
        }
        Ok(())
    }
}

/// In-memory store for tests
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

#[cfg(test)]
impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}
