// Persisted translation history
//
// The history is a bounded, most-recent-first list held in memory and
// mirrored as a single JSON array in durable storage. Every mutation
// replaces the stored record wholesale.

pub mod storage;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

pub use storage::{FileStorage, MemoryStorage, RecordStorage};
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// Creation time in milliseconds, bumped when needed to stay unique
    pub id: u64,
    pub source_text: String,
    pub translated_text: String,
    /// Language codes; the detected code when the source was auto-detected
    pub source_language: String,
    pub target_language: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
    /// RFC 3339 creation time
    pub timestamp: String,
}

impl HistoryEntry {
    pub fn new(
        id: u64,
        source_text: impl Into<String>,
        translated_text: impl Into<String>,
        source_language: impl Into<String>,
        target_language: impl Into<String>,
        model_name: Option<String>,
    ) -> Self {
        Self {
            id,
            source_text: source_text.into(),
            translated_text: translated_text.into(),
            source_language: source_language.into(),
            target_language: target_language.into(),
            model_name,
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

pub struct HistoryStore {
    storage: Box<dyn RecordStorage>,
    key: String,
    max_entries: usize,
    entries: Vec<HistoryEntry>,
}

impl HistoryStore {
    pub fn new(storage: Box<dyn RecordStorage>, key: impl Into<String>, max_entries: usize) -> Self {
        Self {
            storage,
            key: key.into(),
            max_entries: max_entries.max(1),
            entries: Vec::new(),
        }
    }

    /// Read the persisted record. Missing or unreadable data yields an empty
    /// history; this never fails.
    pub fn load(&mut self) -> usize {
        let raw = match self.storage.read(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("No persisted history under '{}'", self.key);
                self.entries.clear();
                return 0;
            }
            Err(e) => {
                warn!("Failed to read persisted history, starting empty: {}", e);
                self.entries.clear();
                return 0;
            }
        };

        self.entries = match serde_json::from_str::<Vec<HistoryEntry>>(&raw) {
            Ok(mut entries) => {
                entries.truncate(self.max_entries);
                entries
            }
            Err(e) => {
                warn!("Discarding malformed history record '{}': {}", self.key, e);
                Vec::new()
            }
        };

        info!("Loaded {} history entries", self.entries.len());
        self.entries.len()
    }

    /// Most recent first
    pub fn list(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn get(&self, id: u64) -> Option<&HistoryEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// Identifier for the next entry: the current time in milliseconds, or
    /// one past the newest entry when the clock has not moved on. Saturates
    /// at `u64::MAX` for records carrying an id that large.
    pub fn next_id(&self) -> u64 {
        let now = u64::try_from(Utc::now().timestamp_millis()).unwrap_or_default();
        match self.entries.first() {
            Some(newest) if newest.id >= now => newest.id.saturating_add(1),
            _ => now,
        }
    }

    /// Insert at the front, drop anything beyond the cap, then persist.
    /// On a storage failure the in-memory list is left as it was.
    pub fn append(&mut self, entry: HistoryEntry) -> Result<()> {
        let mut next = Vec::with_capacity(self.max_entries);
        next.push(entry);
        next.extend(self.entries.iter().take(self.max_entries - 1).cloned());

        self.commit(next)?;
        debug!("History now holds {} entries", self.entries.len());
        Ok(())
    }

    /// Returns whether an entry was removed. Unknown ids are a no-op.
    pub fn remove(&mut self, id: u64) -> Result<bool> {
        if self.get(id).is_none() {
            return Ok(false);
        }

        let next = self.entries.iter().filter(|e| e.id != id).cloned().collect();
        self.commit(next)?;
        info!("Removed history entry {}", id);
        Ok(true)
    }

    /// Empty the history and delete the persisted record. Confirmation is the
    /// caller's job.
    pub fn clear(&mut self) -> Result<()> {
        self.storage.remove(&self.key)?;
        self.entries.clear();
        info!("Cleared translation history");
        Ok(())
    }

    fn commit(&mut self, next: Vec<HistoryEntry>) -> Result<()> {
        let serialized = serde_json::to_string(&next)?;
        self.storage.write(&self.key, &serialized)?;
        self.entries = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LingoError;

    const KEY: &str = "translationHistory";

    fn entry(id: u64, text: &str) -> HistoryEntry {
        HistoryEntry::new(id, text, format!("{} (de)", text), "en", "de", None)
    }

    fn store_over(storage: &MemoryStorage, cap: usize) -> HistoryStore {
        let mut store = HistoryStore::new(Box::new(storage.clone()), KEY, cap);
        store.load();
        store
    }

    struct FailingStorage;

    impl RecordStorage for FailingStorage {
        fn read(&self, _key: &str) -> Result<Option<String>> {
            Err(LingoError::Storage("disk on fire".to_string()))
        }
        fn write(&mut self, _key: &str, _value: &str) -> Result<()> {
            Err(LingoError::Storage("disk on fire".to_string()))
        }
        fn remove(&mut self, _key: &str) -> Result<()> {
            Err(LingoError::Storage("disk on fire".to_string()))
        }
    }

    #[test]
    fn test_append_puts_newest_first() {
        let storage = MemoryStorage::new();
        let mut store = store_over(&storage, 50);
        store.append(entry(1, "one")).unwrap();
        store.append(entry(2, "two")).unwrap();

        assert_eq!(store.list()[0].source_text, "two");
        assert_eq!(store.list()[1].source_text, "one");
    }

    #[test]
    fn test_cap_keeps_most_recent() {
        let storage = MemoryStorage::new();
        let mut store = store_over(&storage, 10);
        for i in 0..13 {
            store.append(entry(i, &format!("text {}", i))).unwrap();
        }

        assert_eq!(store.len(), 10);
        let ids: Vec<u64> = store.list().iter().map(|e| e.id).collect();
        assert_eq!(ids, (3..13).rev().collect::<Vec<_>>());
    }

    #[test]
    fn test_clear_survives_restart() {
        let storage = MemoryStorage::new();
        let mut store = store_over(&storage, 50);
        store.append(entry(1, "one")).unwrap();
        store.clear().unwrap();

        assert!(storage.read(KEY).unwrap().is_none());
        let restarted = store_over(&storage, 50);
        assert!(restarted.is_empty());
    }

    #[test]
    fn test_restart_reproduces_entries() {
        let storage = MemoryStorage::new();
        let mut store = store_over(&storage, 50);
        store.append(entry(1, "Hello world")).unwrap();
        store.append(HistoryEntry::new(2, "Guten Tag", "Good day", "de", "en", Some("NLLB-200-600M-distilled".to_string()))).unwrap();
        let before = store.list().to_vec();

        let restarted = store_over(&storage, 50);
        assert_eq!(restarted.list(), before.as_slice());
    }

    #[test]
    fn test_malformed_record_degrades_to_empty() {
        let mut storage = MemoryStorage::new();
        storage.write(KEY, "{not json").unwrap();

        let mut store = HistoryStore::new(Box::new(storage.clone()), KEY, 50);
        assert_eq!(store.load(), 0);

        // Still usable afterwards
        store.append(entry(1, "one")).unwrap();
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_unreadable_storage_degrades_to_empty() {
        let mut store = HistoryStore::new(Box::new(FailingStorage), KEY, 50);
        assert_eq!(store.load(), 0);
        assert!(store.list().is_empty());
    }

    #[test]
    fn test_failed_write_leaves_list_untouched() {
        let mut store = HistoryStore::new(Box::new(FailingStorage), KEY, 50);
        assert!(store.append(entry(1, "one")).is_err());
        assert!(store.is_empty());
    }

    #[test]
    fn test_load_truncates_to_cap() {
        let storage = MemoryStorage::new();
        let mut wide = store_over(&storage, 50);
        for i in 0..20 {
            wide.append(entry(i, "x")).unwrap();
        }

        let narrow = store_over(&storage, 5);
        assert_eq!(narrow.len(), 5);
        assert_eq!(narrow.list()[0].id, 19);
    }

    #[test]
    fn test_remove_unknown_id_is_noop() {
        let storage = MemoryStorage::new();
        let mut store = store_over(&storage, 50);
        store.append(entry(1, "one")).unwrap();

        assert!(!store.remove(42).unwrap());
        assert!(store.remove(1).unwrap());
        assert!(store.is_empty());
        assert_eq!(storage.read(KEY).unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_next_id_is_strictly_increasing() {
        let storage = MemoryStorage::new();
        let mut store = store_over(&storage, 50);
        store.append(entry(u64::MAX - 1, "future")).unwrap();
        assert_eq!(store.next_id(), u64::MAX);
    }

    #[test]
    fn test_max_id_in_record_does_not_overflow() {
        let mut storage = MemoryStorage::new();
        storage
            .write(
                KEY,
                r#"[{"id":18446744073709551615,"sourceText":"a","translatedText":"b","sourceLanguage":"en","targetLanguage":"de","timestamp":"2024-01-01T00:00:00Z"}]"#,
            )
            .unwrap();

        let mut store = HistoryStore::new(Box::new(storage.clone()), KEY, 50);
        assert_eq!(store.load(), 1);
        assert_eq!(store.next_id(), u64::MAX);

        store.append(entry(store.next_id(), "next")).unwrap();
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_record_uses_camel_case_fields() {
        let json = serde_json::to_value(entry(7, "hi")).unwrap();
        assert_eq!(json["sourceText"], "hi");
        assert_eq!(json["targetLanguage"], "de");
        assert!(json.get("modelName").is_none());
    }
}
