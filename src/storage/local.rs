//! Local snapshot backends.
//!
//! [`RedbStore`] keeps every list as JSON bytes in one embedded database:
//!
//! ```text
//! lists table: "{prefix}itinerary" → JSON Vec<ItineraryEntry>
//!              "{prefix}checklist" → JSON Vec<ChecklistEntry>
//!              "{prefix}wishlist"  → JSON Vec<WishlistEntry>
//! ```

use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use anyhow::{Context, Result};
use redb::{Database, TableDefinition};

use super::LocalStore;
use crate::model::ListKey;

const LISTS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("lists");

pub struct RedbStore {
    db: Database,
    prefix: String,
}

impl RedbStore {
    pub fn open(path: &Path, prefix: &str) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .context("Failed to create data directory")?;
        }
        let db = Database::create(path)
            .with_context(|| format!("Failed to open list database at {}", path.display()))?;
        // Ensure table exists so reads never hit a missing table
        let txn = db.begin_write()?;
        { let _ = txn.open_table(LISTS_TABLE)?; }
        txn.commit()?;
        Ok(Self {
            db,
            prefix: prefix.to_string(),
        })
    }

    fn storage_key(&self, key: ListKey) -> String {
        format!("{}{}", self.prefix, key)
    }
}

impl LocalStore for RedbStore {
    fn backend_name(&self) -> &str {
        "redb"
    }

    fn read(&self, key: ListKey) -> Result<Option<String>> {
        let name = self.storage_key(key);
        let rtxn = self.db.begin_read()?;
        let table = rtxn.open_table(LISTS_TABLE)?;
        let value = match table.get(name.as_str())? {
            Some(guard) => Some(
                String::from_utf8(guard.value().to_vec())
                    .with_context(|| format!("{name} is not valid UTF-8"))?,
            ),
            None => None,
        };
        Ok(value)
    }

    fn write(&self, key: ListKey, json: &str) -> Result<()> {
        let name = self.storage_key(key);
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(LISTS_TABLE)?;
            table.insert(name.as_str(), json.as_bytes())?;
        }
        txn.commit()?;
        Ok(())
    }
}

/// In-process store. Nothing survives the process.
#[derive(Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<ListKey, String>>,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store raw text for `key`, bypassing serialization.
    pub fn put_raw(&self, key: ListKey, raw: &str) {
        if let Ok(mut values) = self.values.lock() {
            values.insert(key, raw.to_string());
        }
    }

    /// Make every subsequent write fail (simulates a full disk / quota).
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::Relaxed);
    }
}

impl LocalStore for MemoryStore {
    fn backend_name(&self) -> &str {
        "memory"
    }

    fn read(&self, key: ListKey) -> Result<Option<String>> {
        let values = self.values.lock().map_err(|e| anyhow::anyhow!("lock poisoned: {e}"))?;
        Ok(values.get(&key).cloned())
    }

    fn write(&self, key: ListKey, json: &str) -> Result<()> {
        if self.fail_writes.load(Ordering::Relaxed) {
            anyhow::bail!("write rejected: store is read-only");
        }
        let mut values = self.values.lock().map_err(|e| anyhow::anyhow!("lock poisoned: {e}"))?;
        values.insert(key, json.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{WishlistCategory, WishlistEntry};
    use crate::storage::{load_list, save_list};

    fn create_test_wish(id: &str, name: &str) -> WishlistEntry {
        WishlistEntry {
            id: id.to_string(),
            name: name.to_string(),
            note: "note".to_string(),
            url: Some("https://example.com".to_string()),
            category: WishlistCategory::Shopping,
            checked: true,
        }
    }

    #[test]
    fn test_redb_empty_on_open() {
        let dir = tempfile::tempdir().unwrap();
        let store = RedbStore::open(&dir.path().join("lists.redb"), "trip_").unwrap();

        for key in ListKey::ALL {
            assert!(store.read(key).unwrap().is_none());
        }
    }

    #[test]
    fn test_redb_write_and_read() {
        let dir = tempfile::tempdir().unwrap();
        let store = RedbStore::open(&dir.path().join("lists.redb"), "trip_").unwrap();

        store.write(ListKey::Wishlist, "[]").unwrap();
        assert_eq!(store.read(ListKey::Wishlist).unwrap().as_deref(), Some("[]"));
        assert!(store.read(ListKey::Checklist).unwrap().is_none());

        // Overwrite replaces
        store.write(ListKey::Wishlist, "[1]").unwrap();
        assert_eq!(store.read(ListKey::Wishlist).unwrap().as_deref(), Some("[1]"));
    }

    #[test]
    fn test_redb_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("lists.redb");
        let list = vec![create_test_wish("w1", "Lotte Mart"), create_test_wish("w2", "釜山宅")];

        {
            let store = RedbStore::open(&path, "trip_").unwrap();
            save_list(&store, &list);
        }

        let store = RedbStore::open(&path, "trip_").unwrap();
        assert_eq!(load_list::<WishlistEntry>(&store, Vec::new()), list);
    }

    #[test]
    fn test_redb_prefix_isolates_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lists.redb");

        {
            let store = RedbStore::open(&path, "busan_").unwrap();
            store.write(ListKey::Itinerary, "[]").unwrap();
        }

        let other = RedbStore::open(&path, "tokyo_").unwrap();
        assert!(other.read(ListKey::Itinerary).unwrap().is_none());
    }

    #[test]
    fn test_memory_store_fail_writes() {
        let store = MemoryStore::new();
        store.write(ListKey::Checklist, "[]").unwrap();

        store.set_fail_writes(true);
        assert!(store.write(ListKey::Checklist, "[1]").is_err());
        assert_eq!(store.read(ListKey::Checklist).unwrap().as_deref(), Some("[]"));

        store.set_fail_writes(false);
        store.write(ListKey::Checklist, "[1]").unwrap();
        assert_eq!(store.read(ListKey::Checklist).unwrap().as_deref(), Some("[1]"));
    }
}
