//! In-memory store — useful for testing and ephemeral sessions.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{RwLock, watch};
use uuid::Uuid;

use rumormill_core::error::StoreError;
use rumormill_core::record::{OwnerId, PredictionRecord, RecordId, RecordSet};
use rumormill_core::store::{DocumentStore, RecordsSubscription, Snapshot};

/// An in-memory store keyed by owner.
///
/// Each owner with a live subscription has a watch channel holding the
/// latest snapshot; every append refreshes it.
pub struct InMemoryStore {
    inner: Arc<RwLock<Inner>>,
}

#[derive(Default)]
struct Inner {
    records: HashMap<OwnerId, RecordSet>,
    watchers: HashMap<OwnerId, watch::Sender<Snapshot>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner::default())),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn append(&self, mut record: PredictionRecord) -> Result<RecordId, StoreError> {
        record.id = RecordId(Uuid::new_v4().to_string());
        record.created_at = Some(Utc::now());
        let id = record.id.clone();
        let owner = record.owner.clone();

        let mut inner = self.inner.write().await;
        inner.records.entry(owner.clone()).or_default().push(record);

        // Senders with no receivers left are pruned instead of refreshed.
        let stale = inner
            .watchers
            .get(&owner)
            .is_some_and(|tx| tx.receiver_count() == 0);
        if stale {
            inner.watchers.remove(&owner);
        } else if let Some(tx) = inner.watchers.get(&owner) {
            let snapshot = inner.records.get(&owner).cloned().unwrap_or_default();
            tx.send_replace(Ok(snapshot));
        }

        Ok(id)
    }

    async fn subscribe(&self, owner: &OwnerId) -> Result<RecordsSubscription, StoreError> {
        let mut inner = self.inner.write().await;

        if let Some(tx) = inner.watchers.get(owner) {
            return Ok(RecordsSubscription::new(tx.subscribe()));
        }

        let current = inner.records.get(owner).cloned().unwrap_or_default();
        let (tx, rx) = watch::channel(Ok(current));
        inner.watchers.insert(owner.clone(), tx);
        Ok(RecordsSubscription::new(rx))
    }
}
