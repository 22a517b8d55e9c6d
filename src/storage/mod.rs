//! Storage abstraction for tripsync.
//!
//! - [`LocalStore`]: synchronous snapshot store, one JSON value per list
//!   ([`RedbStore`] on disk, [`MemoryStore`] for tests and ephemeral runs)
//! - [`RemoteStore`]: the spreadsheet-backed mirror ([`HttpRemote`])
//!
//! The coordinator holds an `Arc<dyn LocalStore>` and an optional
//! `Arc<dyn RemoteStore>`; all persistence goes through them.

pub mod local;
pub mod remote;

use anyhow::Result;
use async_trait::async_trait;

use crate::model::{ListEntry, ListKey, RemoteDocument};

pub use local::{MemoryStore, RedbStore};
pub use remote::HttpRemote;

/// Key/value snapshot store keyed by list.
///
/// Backends report errors; the typed helpers [`load_list`] and
/// [`save_list`] are the layer that swallows them.
pub trait LocalStore: Send + Sync {
    /// Human-readable backend name (e.g., "redb", "memory").
    fn backend_name(&self) -> &str;

    /// Raw JSON stored for `key`, or None if nothing saved.
    fn read(&self, key: ListKey) -> Result<Option<String>>;

    /// Replace the JSON stored for `key`.
    fn write(&self, key: ListKey, json: &str) -> Result<()>;
}

/// Remote mirror of all three lists.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    fn backend_name(&self) -> &str;

    /// Fetch the whole document. Any network, status or decoding problem is
    /// an error; callers treat it as "remote state unknown".
    async fn fetch_all(&self) -> Result<RemoteDocument>;

    /// Write a full or partial document. The server merges by key.
    async fn push(&self, document: &RemoteDocument) -> Result<()>;
}

/// Read `T`'s list, falling back to `default` on any failure.
pub fn load_list<T: ListEntry>(store: &dyn LocalStore, default: Vec<T>) -> Vec<T> {
    let raw = match store.read(T::KEY) {
        Ok(Some(raw)) if !raw.trim().is_empty() => raw,
        Ok(_) => return default,
        Err(e) => {
            tracing::warn!("Could not read {} from {} store: {:#}", T::KEY, store.backend_name(), e);
            return default;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(list) => list,
        Err(e) => {
            tracing::warn!("Stored {} is corrupt, using defaults: {}", T::KEY, e);
            default
        }
    }
}

/// Persist `T`'s list. Best-effort: failures are logged and dropped.
pub fn save_list<T: ListEntry>(store: &dyn LocalStore, list: &[T]) {
    let json = match serde_json::to_string(list) {
        Ok(json) => json,
        Err(e) => {
            tracing::error!("Could not serialize {}: {}", T::KEY, e);
            return;
        }
    };
    if let Err(e) = store.write(T::KEY, &json) {
        tracing::error!("Could not save {} to {} store: {:#}", T::KEY, store.backend_name(), e);
    }
}
