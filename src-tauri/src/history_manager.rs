//! History of generated QR codes, most recent first, persisted on every change

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::storage::KeyValueStore;

/// Storage key the list is persisted under
pub const HISTORY_KEY: &str = "qr-history";

/// Keep only the last 20 generations
pub const DEFAULT_CAPACITY: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: i64,
    pub url: String,
    #[serde(rename = "timestamp")]
    pub created_at: DateTime<Utc>,
}

/// Bounded, deduplicated history list backed by a [`KeyValueStore`]
#[derive(Debug)]
pub struct HistoryStore<S> {
    storage: S,
    entries: Vec<HistoryEntry>,
    capacity: usize,
    last_id: i64,
    persistent: bool,
}

impl<S: KeyValueStore> HistoryStore<S> {
    pub fn load(storage: S) -> Self {
        Self::with_capacity(storage, DEFAULT_CAPACITY)
    }

    /// Restore the list from `storage`. Unreadable or corrupt data starts an
    /// empty history instead of failing.
    pub fn with_capacity(storage: S, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let mut entries = match storage.get_string(HISTORY_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<HistoryEntry>>(&raw) {
                Ok(entries) => entries,
                Err(e) => {
                    app_warn!("[History] Failed to parse history: {}", e);
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                app_warn!("[History] {}", e);
                Vec::new()
            }
        };

        let mut seen = std::collections::HashSet::new();
        entries.retain(|entry| seen.insert(entry.url.clone()));
        entries.truncate(capacity);

        let last_id = entries.iter().map(|e| e.id).max().unwrap_or(0);
        Self {
            storage,
            entries,
            capacity,
            last_id,
            persistent: true,
        }
    }

    pub fn list(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn get(&self, id: i64) -> Option<&HistoryEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// False once a write has failed; the list then lives in memory only.
    pub fn is_persistent(&self) -> bool {
        self.persistent
    }

    /// Record a generation. An existing entry with the same url moves to the
    /// front under a new id.
    pub fn add(&mut self, url: &str) -> &[HistoryEntry] {
        if url.trim().is_empty() {
            return &self.entries;
        }

        let now = Utc::now();
        let entry = HistoryEntry {
            id: self.next_id(now),
            url: url.to_string(),
            created_at: now,
        };

        self.entries.retain(|e| e.url != url);
        self.entries.insert(0, entry);
        self.entries.truncate(self.capacity);
        self.persist();
        &self.entries
    }

    pub fn remove(&mut self, id: i64) -> &[HistoryEntry] {
        self.entries.retain(|e| e.id != id);
        self.persist();
        &self.entries
    }

    pub fn clear(&mut self) -> &[HistoryEntry] {
        self.entries.clear();
        self.persist();
        &self.entries
    }

    fn next_id(&mut self, now: DateTime<Utc>) -> i64 {
        match self.last_id.checked_add(1) {
            Some(next) => {
                let id = now.timestamp_millis().max(next);
                self.last_id = id;
                id
            }
            // Out of ids above the loaded ones: go below everything still listed
            None => self
                .entries
                .iter()
                .map(|e| e.id)
                .min()
                .map_or(now.timestamp_millis(), |lowest| lowest.saturating_sub(1)),
        }
    }

    fn persist(&mut self) {
        if !self.persistent {
            return;
        }
        let result = serde_json::to_string(&self.entries)
            .map_err(|e| e.to_string())
            .and_then(|raw| {
                self.storage
                    .set_string(HISTORY_KEY, &raw)
                    .map_err(|e| e.to_string())
            });
        if let Err(e) = result {
            app_warn!("[History] {}. Keeping history in memory for this session.", e);
            self.persistent = false;
        }
    }
}

/// Short label for a history row: `HH:MM` for today, `Oct 3` otherwise.
pub fn format_entry_time<Tz: TimeZone>(created_at: &DateTime<Utc>, now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let local = created_at.with_timezone(&now.timezone());
    if local.date_naive() == now.date_naive() {
        local.format("%H:%M").to_string()
    } else {
        local.format("%b %-d").to_string()
    }
}
