//! Durable key-value storage used for app data such as the history list

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::error::{AppError, AppResult};

/// `localStorage`-like persistence surface: one string value per key.
pub trait KeyValueStore {
    /// `Ok(None)` when nothing was stored under `key`.
    fn get_string(&self, key: &str) -> AppResult<Option<String>>;
    fn set_string(&mut self, key: &str, value: &str) -> AppResult<()>;
}

/// Stores each key as `<dir>/<key>.json`
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KeyValueStore for FileStore {
    fn get_string(&self, key: &str) -> AppResult<Option<String>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        fs::read_to_string(&path)
            .map(Some)
            .map_err(|e| AppError::PersistenceRead(format!("{}: {}", path.display(), e)))
    }

    fn set_string(&mut self, key: &str, value: &str) -> AppResult<()> {
        fs::create_dir_all(&self.dir)
            .map_err(|e| AppError::PersistenceWrite(format!("{}: {}", self.dir.display(), e)))?;
        let path = self.path_for(key);
        fs::write(&path, value)
            .map_err(|e| AppError::PersistenceWrite(format!("{}: {}", path.display(), e)))
    }
}

#[derive(Debug, Default)]
struct MemoryInner {
    values: HashMap<String, String>,
    fail_reads: bool,
    fail_writes: bool,
}

/// In-memory store. Clones share the same map, so a second store built from a
/// clone sees everything the first one wrote.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryInner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following read fail with `PersistenceRead`.
    pub fn fail_reads(&self, fail: bool) {
        self.lock().fail_reads = fail;
    }

    /// Make every following write fail with `PersistenceWrite`.
    pub fn fail_writes(&self, fail: bool) {
        self.lock().fail_writes = fail;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl KeyValueStore for MemoryStore {
    fn get_string(&self, key: &str) -> AppResult<Option<String>> {
        let inner = self.lock();
        if inner.fail_reads {
            return Err(AppError::PersistenceRead(format!("{}: read refused", key)));
        }
        Ok(inner.values.get(key).cloned())
    }

    fn set_string(&mut self, key: &str, value: &str) -> AppResult<()> {
        let mut inner = self.lock();
        if inner.fail_writes {
            return Err(AppError::PersistenceWrite(format!("{}: write refused", key)));
        }
        inner.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
