//! Startup reconciliation and gated replication.
//!
//! The coordinator owns the session's copy of the three lists. At startup it
//! fetches the remote document once and decides, per list, whether the remote
//! copy replaces the local one. Only after a fetch that succeeded does it
//! forward later edits to the remote; until then (or forever, if the fetch
//! failed) edits are persisted locally only.

pub mod state;

use std::sync::Arc;

use anyhow::Result;
use futures_util::future::{BoxFuture, FutureExt};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::defaults;
use crate::lists;
use crate::model::{
    Checkable, ChecklistEntry, ItineraryEntry, ListEntry, ListKey, RemoteDocument, TripLists,
    WishlistEntry,
};
use crate::storage::{self, LocalStore, RemoteStore};

pub use state::{FetchOutcome, ReconcileReport, SeedPolicy, SyncState};

pub struct SyncCoordinator {
    lists: TripLists,
    state: SyncState,
    local: Arc<dyn LocalStore>,
    remote: Option<Arc<dyn RemoteStore>>,
    seed_policy: SeedPolicy,
    /// Fire-and-forget remote writes that may still be running.
    in_flight: Vec<JoinHandle<()>>,
}

impl SyncCoordinator {
    /// Start a session from whatever the local store holds.
    ///
    /// `remote: None` means no endpoint is configured; the session then
    /// behaves exactly as if every remote fetch failed.
    pub fn open(
        local: Arc<dyn LocalStore>,
        remote: Option<Arc<dyn RemoteStore>>,
        seed_policy: SeedPolicy,
    ) -> Self {
        let lists = TripLists {
            itinerary: storage::load_list(local.as_ref(), defaults::default_itinerary()),
            checklist: storage::load_list(local.as_ref(), defaults::default_checklist()),
            wishlist: storage::load_list(local.as_ref(), defaults::default_wishlist()),
        };
        info!(
            "Session opened from {} store: {} itinerary, {} checklist, {} wishlist",
            local.backend_name(),
            lists.itinerary.len(),
            lists.checklist.len(),
            lists.wishlist.len()
        );
        Self {
            lists,
            state: SyncState::Unsynced,
            local,
            remote,
            seed_policy,
            in_flight: Vec::new(),
        }
    }

    pub fn lists(&self) -> &TripLists {
        &self.lists
    }

    pub fn list<T: ListEntry>(&self) -> &[T] {
        T::slot(&self.lists)
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    pub fn is_synced(&self) -> bool {
        self.state == SyncState::Synced
    }

    pub fn has_remote(&self) -> bool {
        self.remote.is_some()
    }

    pub fn seed_policy(&self) -> SeedPolicy {
        self.seed_policy
    }

    /// Fetch and apply in one step.
    pub async fn reconcile(&mut self) -> ReconcileReport {
        let outcome = self.begin_reconcile().await;
        self.finish_reconcile(outcome).await
    }

    /// The fetch half of reconciliation.
    ///
    /// The returned future owns everything it needs, so edits can keep
    /// flowing through [`record_mutation`](Self::record_mutation) while it
    /// is pending.
    pub fn begin_reconcile(&self) -> BoxFuture<'static, FetchOutcome> {
        let remote = self.remote.clone();
        async move {
            let Some(remote) = remote else {
                warn!("No remote endpoint configured, running local-only");
                return FetchOutcome::Failed;
            };
            match remote.fetch_all().await {
                Ok(document) => FetchOutcome::Fetched(document),
                Err(e) => {
                    warn!("Fetch from {} failed, running local-only: {:#}", remote.backend_name(), e);
                    FetchOutcome::Failed
                }
            }
        }
        .boxed()
    }

    /// The apply half of reconciliation.
    pub async fn finish_reconcile(&mut self, outcome: FetchOutcome) -> ReconcileReport {
        let mut document = match outcome {
            FetchOutcome::Failed => {
                info!("Remote state unknown; local lists kept, replication disabled");
                return ReconcileReport::LocalOnly;
            }
            FetchOutcome::Fetched(document) => document,
        };

        if self.seed_policy == SeedPolicy::SeedEmptyRemote
            && remote_uninitialized(&document)
            && local_has_data(&self.lists)
        {
            self.seed_remote().await;
            self.state = SyncState::Synced;
            return ReconcileReport::Seeded;
        }

        let mut replaced = Vec::new();
        if self.adopt::<ItineraryEntry>(&mut document) {
            replaced.push(ListKey::Itinerary);
        }
        if self.adopt::<ChecklistEntry>(&mut document) {
            replaced.push(ListKey::Checklist);
        }
        if self.adopt::<WishlistEntry>(&mut document) {
            replaced.push(ListKey::Wishlist);
        }
        self.state = SyncState::Synced;
        info!("Reconciled with remote; replaced {:?}", replaced);
        ReconcileReport::Applied { replaced }
    }

    /// Take the remote list for `T` if it has entries.
    fn adopt<T: ListEntry>(&mut self, document: &mut RemoteDocument) -> bool {
        match T::remote_slot_mut(document).take() {
            Some(list) if !list.is_empty() => {
                debug!("Adopting {} remote {} entries", list.len(), T::KEY);
                // Written through locally; not echoed back to the remote
                storage::save_list(self.local.as_ref(), &list);
                *T::slot_mut(&mut self.lists) = list;
                true
            }
            _ => false,
        }
    }

    async fn seed_remote(&self) {
        let Some(remote) = &self.remote else {
            return;
        };
        info!("Remote is empty, seeding it with local data");
        let document = RemoteDocument::from(&self.lists);
        match remote.push(&document).await {
            Ok(()) => info!("Remote seeded"),
            Err(e) => error!("Seeding {} failed: {:#}", remote.backend_name(), e),
        }
    }

    /// Replace `T`'s list after a user edit.
    ///
    /// Always persisted locally first. Forwarded to the remote only when the
    /// session is synced; the remote write runs in the background and its
    /// failure is only logged.
    pub fn record_mutation<T: ListEntry>(&mut self, list: Vec<T>) {
        storage::save_list(self.local.as_ref(), &list);

        if self.state == SyncState::Synced {
            if let Some(remote) = self.remote.clone() {
                self.forward(remote, RemoteDocument::single(list.clone()), T::KEY);
            }
        } else {
            debug!("Not synced, {} kept local only", T::KEY);
        }

        *T::slot_mut(&mut self.lists) = list;
    }

    fn forward(&mut self, remote: Arc<dyn RemoteStore>, document: RemoteDocument, key: ListKey) {
        self.in_flight.retain(|handle| !handle.is_finished());
        let handle = tokio::spawn(async move {
            match remote.push(&document).await {
                Ok(()) => debug!("Mirrored {} to {}", key, remote.backend_name()),
                Err(e) => error!("Mirroring {} to {} failed: {:#}", key, remote.backend_name(), e),
            }
        });
        self.in_flight.push(handle);
    }

    /// Wait for background remote writes still running.
    pub async fn flush(&mut self) {
        for handle in self.in_flight.drain(..) {
            if let Err(e) = handle.await {
                error!("Remote write task ended abnormally: {}", e);
            }
        }
    }

    // ── Edits ───────────────────────────────────────────────────────

    /// Add an entry; returns it with its assigned id.
    pub fn add<T: ListEntry>(&mut self, entry: T) -> Result<T> {
        let next = lists::add(self.list::<T>(), entry)?;
        let added = next.last().cloned();
        self.record_mutation(next);
        added.ok_or_else(|| anyhow::anyhow!("{} is empty after add", T::KEY))
    }

    pub fn update<T: ListEntry>(&mut self, entry: T) -> Result<()> {
        let next = lists::update(self.list::<T>(), entry)?;
        self.record_mutation(next);
        Ok(())
    }

    /// Returns false when no entry had that id.
    pub fn remove<T: ListEntry>(&mut self, id: &str) -> bool {
        match lists::remove(self.list::<T>(), id) {
            Some(next) => {
                self.record_mutation(next);
                true
            }
            None => false,
        }
    }

    /// Flip an entry's checked flag; returns the new value.
    pub fn toggle<T: ListEntry + Checkable>(&mut self, id: &str) -> Result<bool> {
        let next = lists::toggle(self.list::<T>(), id)?;
        let checked = next
            .iter()
            .find(|e| e.id() == id)
            .is_some_and(|e| e.is_checked());
        self.record_mutation(next);
        Ok(checked)
    }
}

/// Remote has neither itinerary nor wishlist entries.
fn remote_uninitialized(document: &RemoteDocument) -> bool {
    document.is_empty_for::<ItineraryEntry>() && document.is_empty_for::<WishlistEntry>()
}

fn local_has_data(lists: &TripLists) -> bool {
    !lists.itinerary.is_empty() || !lists.wishlist.is_empty()
}
