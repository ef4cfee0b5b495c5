//! Bounded, most-recent-first request history.
//!
//! Every mutation rewrites the whole persisted collection. A missing or corrupt blob
//! loads as an empty history.

use super::storage::KeyValueStore;
use crate::model::{Body, Header, HttpMethod, RequestDescriptor};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, MutexGuard};

/// Maximum number of entries kept.
pub const MAX_HISTORY: usize = 10;

/// Key the history blob is stored under.
pub const HISTORY_KEY: &str = "requestHistory";

/// One saved past request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: i64,
    pub method: HttpMethod,
    pub url: String,
    #[serde(default)]
    pub headers: Vec<Header>,
    #[serde(default)]
    pub body: Option<Body>,
    #[serde(default)]
    pub auth_token: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn from_request(id: i64, request: &RequestDescriptor, timestamp: DateTime<Utc>) -> Self {
        Self {
            id,
            method: request.method,
            url: request.url.clone(),
            headers: request.headers.clone(),
            body: request.body.clone(),
            auth_token: request.auth_token.clone(),
            timestamp,
        }
    }

    /// Rebuilds the descriptor this entry was taken from.
    pub fn to_request(&self) -> RequestDescriptor {
        RequestDescriptor {
            method: self.method,
            url: self.url.clone(),
            headers: self.headers.clone(),
            body: self.body.clone(),
            auth_token: self.auth_token.clone(),
        }
    }
}

pub struct HistoryStore {
    storage: Box<dyn KeyValueStore>,
    entries: Mutex<Vec<HistoryEntry>>,
    persist_tokens: bool,
}

impl HistoryStore {
    /// Creates a store and loads whatever `storage` currently holds.
    ///
    /// Bearer tokens are dropped from new entries unless `persist_tokens` is set.
    pub fn new(storage: Box<dyn KeyValueStore>, persist_tokens: bool) -> Self {
        let store = Self {
            storage,
            entries: Mutex::new(Vec::new()),
            persist_tokens,
        };
        store.load();
        store
    }

    /// Replaces the in-memory history with the persisted one.
    pub fn load(&self) -> Vec<HistoryEntry> {
        let loaded = match self.storage.get(HISTORY_KEY) {
            Ok(Some(blob)) => match serde_json::from_str::<Vec<HistoryEntry>>(&blob) {
                Ok(mut entries) => {
                    entries.truncate(MAX_HISTORY);
                    entries
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Persisted history is corrupt, starting empty");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!(error = %e, "Could not read persisted history, starting empty");
                Vec::new()
            }
        };

        tracing::debug!(count = loaded.len(), "Loaded request history");
        let mut entries = self.lock();
        *entries = loaded;
        entries.clone()
    }

    /// Entries, most recent first.
    pub fn list(&self) -> Vec<HistoryEntry> {
        self.lock().clone()
    }

    /// Inserts at the head and evicts everything past [`MAX_HISTORY`].
    ///
    /// The entry's id is bumped past the newest stored id when it would not exceed it, so
    /// ids stay unique and increasing. The stored entry is returned.
    pub fn append(&self, entry: HistoryEntry) -> HistoryEntry {
        let mut entries = self.lock();
        self.insert(&mut entries, entry)
    }

    /// Snapshots `request` as a new entry with a fresh id and appends it.
    pub fn record(&self, request: &RequestDescriptor) -> HistoryEntry {
        let now = Utc::now();
        let entry = HistoryEntry::from_request(now.timestamp_millis(), request, now);
        let mut entries = self.lock();
        self.insert(&mut entries, entry)
    }

    pub fn clear(&self) {
        let mut entries = self.lock();
        entries.clear();
        self.persist(&entries);
    }

    fn insert(&self, entries: &mut Vec<HistoryEntry>, mut entry: HistoryEntry) -> HistoryEntry {
        entry.id = next_id(entries.first().map(|e| e.id), entry.id);
        if !self.persist_tokens {
            entry.auth_token = None;
        }
        entries.insert(0, entry.clone());
        entries.truncate(MAX_HISTORY);
        self.persist(entries);
        entry
    }

    fn persist(&self, entries: &[HistoryEntry]) {
        let result = serde_json::to_string(entries)
            .map_err(|e| e.to_string())
            .and_then(|blob| {
                self.storage
                    .set(HISTORY_KEY, &blob)
                    .map_err(|e| e.to_string())
            });
        if let Err(e) = result {
            tracing::warn!(error = %e, "Failed to persist request history");
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<HistoryEntry>> {
        // A poisoned lock still guards a consistent Vec: every mutation is a single
        // insert/truncate/clear.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// `candidate`, bumped past the newest id so ids stay unique and increasing.
fn next_id(newest: Option<i64>, candidate: i64) -> i64 {
    match newest {
        Some(last) if last >= candidate => last + 1,
        _ => candidate,
    }
}
