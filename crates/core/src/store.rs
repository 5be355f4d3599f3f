//! Document store trait — append-only record persistence with live
//! per-owner snapshot subscriptions.
//!
//! The store is an external collaborator behind a trait boundary.
//! Implementations: in-memory (for testing and ephemeral sessions) and
//! SQLite. Two guarantees matter here:
//! - records are namespaced per owner, with no cross-owner visibility;
//! - no ordering is promised between an `append` completing and the
//!   subscription reflecting it — the subscription is the sole source of
//!   truth for history display.

use async_trait::async_trait;
use tokio::sync::watch;

use crate::error::StoreError;
use crate::record::{OwnerId, PredictionRecord, RecordId, RecordSet};

/// One subscription emission: the owner's full record set, or a read failure.
pub type Snapshot = std::result::Result<RecordSet, StoreError>;

/// The core DocumentStore trait.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// The backend name (e.g., "memory", "sqlite").
    fn name(&self) -> &str;

    /// Append a record to its owner's collection.
    ///
    /// The store assigns `id` and `created_at`; whatever the caller put
    /// there is ignored. On failure no partial record remains.
    async fn append(&self, record: PredictionRecord) -> std::result::Result<RecordId, StoreError>;

    /// Open a live snapshot stream over one owner's records.
    ///
    /// The subscription yields the current record set immediately and a
    /// fresh full snapshot after every change.
    async fn subscribe(
        &self,
        owner: &OwnerId,
    ) -> std::result::Result<RecordsSubscription, StoreError>;
}

/// A cancellable handle to a live snapshot stream.
///
/// The consumer owns the lifecycle: dropping the handle (or calling
/// [`cancel`](Self::cancel)) releases the live connection. Built on a
/// `watch` channel because emissions are full snapshots — only the latest
/// one matters, intermediate states may be skipped under load.
pub struct RecordsSubscription {
    rx: watch::Receiver<Snapshot>,
    primed: bool,
}

impl RecordsSubscription {
    /// Wrap a watch receiver whose current value is the initial snapshot.
    pub fn new(rx: watch::Receiver<Snapshot>) -> Self {
        Self { rx, primed: false }
    }

    /// Wait for the next emission.
    ///
    /// The first call returns the snapshot that was current at subscribe
    /// time; later calls wait for a change. Returns `None` once the store
    /// side has gone away.
    pub async fn next(&mut self) -> Option<Snapshot> {
        if !self.primed {
            self.primed = true;
            return Some(self.rx.borrow_and_update().clone());
        }
        match self.rx.changed().await {
            Ok(()) => Some(self.rx.borrow_and_update().clone()),
            Err(_) => None,
        }
    }

    /// The latest snapshot without waiting.
    pub fn current(&self) -> Snapshot {
        self.rx.borrow().clone()
    }

    /// Tear the subscription down. Equivalent to dropping the handle.
    pub fn cancel(self) {}
}
