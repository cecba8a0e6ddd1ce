//! Persistent storage for the activity log.
//!
//! The log is stored as a single JSON array and rewritten as a unit; append
//! is read-all, push, write-all. Storage failures never propagate: a read
//! that fails (missing file, quota, malformed payload) yields an empty log,
//! a write that fails is a no-op. Both are reported through tracing.

use crate::entry::{ActivityEntry, EntryDraft};
use crate::error::PlaylogError;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Storage backend for the activity log.
///
/// Implementations catch their own failures and degrade to safe defaults so
/// that loss of persisted state is never fatal to the caller.
pub trait LogStore {
    /// All persisted entries, in append order. Empty when nothing is
    /// persisted or the payload cannot be read.
    fn load(&self) -> Vec<ActivityEntry>;

    /// Overwrite the persisted sequence. Idempotent.
    fn save(&self, entries: &[ActivityEntry]);

    /// Remove the entire persisted log as a unit.
    fn clear(&self);
}

/// File-backed store: one JSON file holding the full entry array.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn try_load(&self) -> Result<Vec<ActivityEntry>, PlaylogError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let json = std::fs::read_to_string(&self.path)?;
        let entries: Vec<ActivityEntry> = serde_json::from_str(&json)?;
        Ok(entries)
    }

    fn try_save(&self, entries: &[ActivityEntry]) -> Result<(), PlaylogError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string(entries)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

impl LogStore for JsonFileStore {
    fn load(&self) -> Vec<ActivityEntry> {
        match self.try_load() {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!("Failed to read activity log from {:?}: {}", self.path, e);
                Vec::new()
            }
        }
    }

    fn save(&self, entries: &[ActivityEntry]) {
        if let Err(e) = self.try_save(entries) {
            tracing::warn!("Failed to write activity log to {:?}: {}", self.path, e);
        }
    }

    fn clear(&self) {
        if self.path.exists() {
            if let Err(e) = std::fs::remove_file(&self.path) {
                tracing::warn!("Failed to clear activity log at {:?}: {}", self.path, e);
            }
        }
    }
}

/// In-memory store for tests and embedding without a filesystem.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<Vec<ActivityEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<ActivityEntry>> {
        match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl LogStore for MemoryStore {
    fn load(&self) -> Vec<ActivityEntry> {
        self.lock().clone()
    }

    fn save(&self, entries: &[ActivityEntry]) {
        *self.lock() = entries.to_vec();
    }

    fn clear(&self) {
        self.lock().clear();
    }
}

/// The activity log over an injected store.
///
/// Entries are append-only; the log is the source of truth and statistics
/// are always recomputed from it.
pub struct ActivityLog<S: LogStore> {
    store: S,
}

impl<S: LogStore> ActivityLog<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Snapshot of all entries in append order.
    pub fn entries(&self) -> Vec<ActivityEntry> {
        self.store.load()
    }

    /// Complete a draft entry and persist it, returning the completed entry.
    pub fn append(&self, draft: EntryDraft) -> ActivityEntry {
        let entry = ActivityEntry::from_draft(draft);
        let mut entries = self.store.load();
        entries.push(entry.clone());
        self.store.save(&entries);
        tracing::debug!(id = %entry.id, kind = %entry.kind, "appended activity entry");
        entry
    }

    /// Remove the whole log. There is no partial clear.
    pub fn clear(&self) {
        self.store.clear();
        tracing::info!("activity log cleared");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::EntryKind;
    use tempfile::tempdir;

    #[test]
    fn test_file_store_roundtrip() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("activity-log.json"));

        assert!(store.load().is_empty());

        let entry = ActivityEntry::from_draft(
            EntryDraft::new(EntryKind::SessionStart)
                .with_session_id("s1")
                .with_game("wordle"),
        );
        store.save(std::slice::from_ref(&entry));

        let loaded = store.load();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0], entry);
    }

    #[test]
    fn test_file_store_malformed_payload_reads_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("activity-log.json");
        std::fs::write(&path, "not json {").unwrap();

        let store = JsonFileStore::new(&path);
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_file_store_clear_removes_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("activity-log.json");
        let store = JsonFileStore::new(&path);

        store.save(&[ActivityEntry::from_draft(EntryDraft::new(EntryKind::Action))]);
        assert!(path.exists());

        store.clear();
        assert!(!path.exists());
        assert!(store.load().is_empty());

        // Clearing an already-empty store is a no-op.
        store.clear();
    }

    #[test]
    fn test_append_completes_and_persists() {
        let log = ActivityLog::new(MemoryStore::new());

        let first = log.append(EntryDraft::new(EntryKind::SessionStart).with_game("quiz"));
        let second = log.append(EntryDraft::new(EntryKind::SessionEnd).with_score(3));

        assert!(!first.id.is_empty());
        let entries = log.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id, first.id);
        assert_eq!(entries[1].id, second.id);
    }

    #[test]
    fn test_clear_removes_everything() {
        let log = ActivityLog::new(MemoryStore::new());
        log.append(EntryDraft::new(EntryKind::Guess));
        log.append(EntryDraft::new(EntryKind::Guess));

        log.clear();
        assert!(log.entries().is_empty());
    }

    #[test]
    fn test_append_through_file_store() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("log.json");
        let log = ActivityLog::new(JsonFileStore::new(&path));

        log.append(EntryDraft::new(EntryKind::SessionStart).with_game("wordle"));
        assert!(path.exists());
        assert_eq!(log.entries().len(), 1);
    }
}
