//! Mutation Coordinator
//!
//! Serialises create, update and delete against the remote store and keeps
//! the local cache in step with it. Contains NO transport logic: the remote
//! adapter is injected.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use dashmap::DashSet;
use ledger_types::{
    LedgerError, ListOrder, OwnerId, RemoteLedgerClient, Transaction, TransactionDraft,
    TransactionId, TransactionPatch,
};
use tokio::sync::{RwLock, watch};
use tracing::{debug, info, warn};

use crate::cache::TransactionCache;
use crate::view::LedgerView;

/// Coordinates mutations for one owner's session.
///
/// Generic over `R: RemoteLedgerClient` so the store can be swapped (REST,
/// SQLite, in-memory) without touching the rules below:
/// - the cache only changes after the remote call succeeded
/// - at most one mutation per id is in flight
/// - a new [`LedgerView`] is published after every cache change
/// - after [`teardown`](Self::teardown) every late result is discarded
pub struct MutationCoordinator<R: RemoteLedgerClient> {
    remote: R,
    owner_id: OwnerId,
    cache: RwLock<TransactionCache>,
    in_flight: DashSet<TransactionId>,
    view: watch::Sender<Arc<LedgerView>>,
    closed: AtomicBool,
}

/// Claim on an id, released on drop.
struct InFlight<'a> {
    ids: &'a DashSet<TransactionId>,
    id: TransactionId,
}

impl<'a> InFlight<'a> {
    fn claim(ids: &'a DashSet<TransactionId>, id: TransactionId) -> Result<Self, LedgerError> {
        if ids.insert(id) {
            Ok(Self { ids, id })
        } else {
            Err(LedgerError::Conflict(id))
        }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.ids.remove(&self.id);
    }
}

impl<R: RemoteLedgerClient> MutationCoordinator<R> {
    /// Creates a coordinator with an empty cache. Call [`load`](Self::load)
    /// to populate it.
    pub fn new(remote: R, owner_id: OwnerId) -> Self {
        let (view, _) = watch::channel(Arc::new(LedgerView::default()));
        Self {
            remote,
            owner_id,
            cache: RwLock::new(TransactionCache::new()),
            in_flight: DashSet::new(),
            view,
            closed: AtomicBool::new(false),
        }
    }

    pub fn owner_id(&self) -> &OwnerId {
        &self.owner_id
    }

    /// Returns a reference to the underlying remote adapter.
    pub fn remote(&self) -> &R {
        &self.remote
    }

    /// Receiver that observes every published view.
    pub fn subscribe(&self) -> watch::Receiver<Arc<LedgerView>> {
        self.view.subscribe()
    }

    /// The latest published view.
    pub fn view(&self) -> Arc<LedgerView> {
        self.view.borrow().clone()
    }

    pub async fn transactions(&self) -> Vec<Transaction> {
        self.cache.read().await.all().to_vec()
    }

    pub async fn get(&self, id: TransactionId) -> Option<Transaction> {
        self.cache.read().await.get(id).cloned()
    }

    pub fn is_in_flight(&self, id: TransactionId) -> bool {
        self.in_flight.contains(&id)
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Session
    // ─────────────────────────────────────────────────────────────────────────────

    /// Replaces the cache with the owner's remote rows.
    ///
    /// On failure the cache keeps its previous contents.
    #[tracing::instrument(skip(self), fields(owner = %self.owner_id))]
    pub async fn load(&self) -> Result<(), LedgerError> {
        self.ensure_open()?;

        let rows = self
            .remote
            .list(&self.owner_id, ListOrder::DateDescending)
            .await
            .map_err(|e| {
                warn!(error = %e, "failed to load transactions");
                LedgerError::Fetch(e)
            })?;

        let mut cache = self.cache.write().await;
        self.ensure_open()?;
        cache.replace_all(rows);
        debug!(count = cache.len(), "transactions loaded");
        self.publish(&cache);
        Ok(())
    }

    /// Closes the session and empties the cache.
    ///
    /// Remote calls still pending complete on their own, but their results
    /// are dropped and the callers get [`LedgerError::SessionClosed`].
    #[tracing::instrument(skip(self), fields(owner = %self.owner_id))]
    pub async fn teardown(&self) {
        self.closed.store(true, Ordering::SeqCst);
        let mut cache = self.cache.write().await;
        cache.clear();
        self.publish(&cache);
        info!("ledger session closed");
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────────────────────

    /// Validates and inserts a new transaction.
    ///
    /// Nothing is sent when validation fails.
    #[tracing::instrument(skip(self, draft), fields(owner = %self.owner_id))]
    pub async fn create(&self, draft: &TransactionDraft) -> Result<Transaction, LedgerError> {
        self.ensure_open()?;

        let new_tx = draft.validate(&self.owner_id).map_err(|e| {
            warn!(error = %e, "rejected new transaction");
            LedgerError::from(e)
        })?;

        let stored = self.remote.insert(new_tx).await.map_err(|e| {
            warn!(error = %e, "remote insert failed");
            LedgerError::Remote(e)
        })?;

        let mut cache = self.cache.write().await;
        self.ensure_open()?;
        cache.upsert(stored.clone());
        self.publish(&cache);
        info!(id = %stored.id, "transaction created");
        Ok(stored)
    }

    /// Sends the fields of `patch` that differ from the cached row.
    ///
    /// A patch with nothing to change returns the cached row without a
    /// remote call. The merged row is valid by construction: a patch cannot
    /// clear the direction or category, and [`ledger_types::Amount`] is
    /// bounded and never negative.
    #[tracing::instrument(skip(self, patch), fields(owner = %self.owner_id, id = %id))]
    pub async fn update(
        &self,
        id: TransactionId,
        patch: TransactionPatch,
    ) -> Result<Transaction, LedgerError> {
        self.ensure_open()?;

        let current = self.get(id).await.ok_or(LedgerError::NotFound(id))?;
        let _claim = InFlight::claim(&self.in_flight, id)?;

        let patch = patch.normalized().changes_against(&current);
        if patch.is_empty() {
            debug!("nothing to update");
            return Ok(current);
        }
        let merged = current.apply(&patch);

        self.remote.update(id, &patch).await.map_err(|e| {
            warn!(error = %e, "remote update failed");
            LedgerError::Remote(e)
        })?;

        let mut cache = self.cache.write().await;
        self.ensure_open()?;
        let Some(latest) = cache.get(id) else {
            warn!("row left the cache while its update was in flight");
            return Ok(merged);
        };
        let updated = latest.apply(&patch);
        cache.upsert(updated.clone());
        self.publish(&cache);
        info!(columns = ?patch.columns(), "transaction updated");
        Ok(updated)
    }

    /// Deletes a transaction remotely, then locally.
    ///
    /// Ids missing from the cache are still sent: the store decides whether
    /// the row exists.
    #[tracing::instrument(skip(self), fields(owner = %self.owner_id, id = %id))]
    pub async fn delete(&self, id: TransactionId) -> Result<(), LedgerError> {
        self.ensure_open()?;
        let _claim = InFlight::claim(&self.in_flight, id)?;

        self.remote.delete(id).await.map_err(|e| {
            warn!(error = %e, "remote delete failed");
            LedgerError::Remote(e)
        })?;

        let mut cache = self.cache.write().await;
        self.ensure_open()?;
        if cache.remove(id).is_some() {
            self.publish(&cache);
        }
        info!("transaction deleted");
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Internals
    // ─────────────────────────────────────────────────────────────────────────────

    fn ensure_open(&self) -> Result<(), LedgerError> {
        if self.is_closed() {
            debug!("discarding work for a closed session");
            return Err(LedgerError::SessionClosed);
        }
        Ok(())
    }

    fn publish(&self, cache: &TransactionCache) {
        self.view
            .send_replace(Arc::new(LedgerView::from_transactions(cache.all().to_vec())));
    }
}
