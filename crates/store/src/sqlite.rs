//! SQLite store — durable predictions that survive process restarts.
//!
//! One table, `predictions`, namespaced by `(app_id, owner)`. Subscriptions
//! are backed by per-owner watch channels; every append re-queries the
//! owner's rows and pushes the fresh snapshot.

use std::collections::HashMap;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Row, SqlitePool};
use tokio::sync::{RwLock, watch};
use tracing::{info, warn};
use uuid::Uuid;

use rumormill_core::error::StoreError;
use rumormill_core::record::{Label, OwnerId, PredictionRecord, RecordId, RecordSet};
use rumormill_core::store::{DocumentStore, RecordsSubscription, Snapshot};

/// A durable SQLite-backed document store.
pub struct SqliteStore {
    pool: SqlitePool,
    app_id: String,
    watchers: RwLock<HashMap<OwnerId, watch::Sender<Snapshot>>>,
}

impl SqliteStore {
    /// Open (or create) the database at `path`, scoped to `app_id`.
    ///
    /// Pass `":memory:"` for an in-process ephemeral database (useful for
    /// tests).
    pub async fn new(path: &str, app_id: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(path)
            .map_err(|e| StoreError::Unavailable(format!("Invalid SQLite path: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await
            .map_err(|e| StoreError::Unavailable(format!("Failed to open SQLite: {e}")))?;

        let store = Self {
            pool,
            app_id: app_id.to_string(),
            watchers: RwLock::new(HashMap::new()),
        };
        store.run_migrations().await?;
        info!(path, app_id, "SQLite store initialized");
        Ok(store)
    }

    /// Run schema migrations.
    async fn run_migrations(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS predictions (
                iid         INTEGER PRIMARY KEY AUTOINCREMENT,
                id          TEXT UNIQUE NOT NULL,
                app_id      TEXT NOT NULL,
                owner       TEXT NOT NULL,
                text        TEXT NOT NULL,
                label       TEXT NOT NULL,
                created_at  TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Storage(format!("predictions table: {e}")))?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS predictions_by_owner
            ON predictions (app_id, owner, created_at)
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Storage(format!("owner index: {e}")))?;

        Ok(())
    }

    /// Load one owner's full record set, newest rows first.
    async fn query_owner(&self, owner: &OwnerId) -> Result<RecordSet, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, owner, text, label, created_at
            FROM predictions
            WHERE app_id = ? AND owner = ?
            ORDER BY created_at DESC, iid DESC
            "#,
        )
        .bind(&self.app_id)
        .bind(&owner.0)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::ReadFailed(e.to_string()))?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            let label: String = row
                .try_get("label")
                .map_err(|e| StoreError::Storage(e.to_string()))?;
            let label = label
                .parse::<Label>()
                .map_err(StoreError::Storage)?;
            let created_at: DateTime<Utc> = row
                .try_get("created_at")
                .map_err(|e| StoreError::Storage(e.to_string()))?;

            records.push(PredictionRecord {
                id: RecordId(
                    row.try_get("id")
                        .map_err(|e| StoreError::Storage(e.to_string()))?,
                ),
                owner: OwnerId(
                    row.try_get("owner")
                        .map_err(|e| StoreError::Storage(e.to_string()))?,
                ),
                text: row
                    .try_get("text")
                    .map_err(|e| StoreError::Storage(e.to_string()))?,
                label,
                created_at: Some(created_at),
            });
        }

        Ok(records)
    }

    /// Push a fresh snapshot to the owner's watcher, if one exists.
    /// Read failures travel to subscribers as error emissions.
    ///
    /// The query and the publish both run under the `watchers` write lock:
    /// snapshots go out in query order, so a slow refresh can never
    /// overwrite a newer snapshot with a stale one.
    async fn refresh_watcher(&self, owner: &OwnerId) {
        let mut watchers = self.watchers.write().await;

        let live = match watchers.get(owner) {
            Some(tx) => tx.receiver_count() > 0,
            None => return,
        };
        if !live {
            // Every subscriber is gone; drop the channel instead of feeding it.
            watchers.remove(owner);
            return;
        }

        let snapshot = self.query_owner(owner).await;
        if let Err(e) = &snapshot {
            warn!(owner = %owner, error = %e, "Snapshot refresh failed");
        }
        if let Some(tx) = watchers.get(owner) {
            tx.send_replace(snapshot);
        }
    }
}

#[async_trait]
impl DocumentStore for SqliteStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn append(&self, record: PredictionRecord) -> Result<RecordId, StoreError> {
        let id = RecordId(Uuid::new_v4().to_string());
        let created_at = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO predictions (id, app_id, owner, text, label, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id.0)
        .bind(&self.app_id)
        .bind(&record.owner.0)
        .bind(&record.text)
        .bind(record.label.as_str())
        .bind(created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::WriteFailed(e.to_string()))?;

        self.refresh_watcher(&record.owner).await;
        Ok(id)
    }

    async fn subscribe(&self, owner: &OwnerId) -> Result<RecordsSubscription, StoreError> {
        // The seed query runs under the write lock: an append landing
        // mid-subscribe either refreshes the registered channel or commits
        // before the seed query sees the table. It can never slip between
        // the two and leave the channel holding a stale snapshot.
        let mut watchers = self.watchers.write().await;
        if let Some(tx) = watchers.get(owner) {
            // Existing channel already carries the latest snapshot.
            return Ok(RecordsSubscription::new(tx.subscribe()));
        }

        let current = self.query_owner(owner).await?;
        let (tx, rx) = watch::channel(Ok(current));
        watchers.insert(owner.clone(), tx);
        Ok(RecordsSubscription::new(rx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn record(owner: &str, text: &str) -> PredictionRecord {
        PredictionRecord::new(OwnerId(owner.into()), text, Label::FakeNews)
    }

    #[tokio::test]
    async fn append_then_subscribe_yields_the_record() {
        let store = SqliteStore::new(":memory:", "test-app").await.unwrap();
        let id = store.append(record("u1", "moon landing redux")).await.unwrap();

        let mut sub = store.subscribe(&OwnerId("u1".into())).await.unwrap();
        let snapshot = sub.next().await.unwrap().unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].id, id);
        assert_eq!(snapshot[0].text, "moon landing redux");
        assert!(snapshot[0].created_at.is_some());
    }

    #[tokio::test]
    async fn subscription_refreshes_after_append() {
        let store = SqliteStore::new(":memory:", "test-app").await.unwrap();
        let mut sub = store.subscribe(&OwnerId("u1".into())).await.unwrap();
        assert!(sub.next().await.unwrap().unwrap().is_empty());

        store.append(record("u1", "breaking")).await.unwrap();
        let snapshot = sub.next().await.unwrap().unwrap();
        assert_eq!(snapshot.len(), 1);
    }

    #[tokio::test]
    async fn owners_are_isolated() {
        let store = SqliteStore::new(":memory:", "test-app").await.unwrap();
        store.append(record("u1", "mine")).await.unwrap();

        let mut sub = store.subscribe(&OwnerId("u2".into())).await.unwrap();
        assert!(sub.next().await.unwrap().unwrap().is_empty());
    }

    #[tokio::test]
    async fn newest_rows_come_first() {
        let store = SqliteStore::new(":memory:", "test-app").await.unwrap();
        store.append(record("u1", "first")).await.unwrap();
        store.append(record("u1", "second")).await.unwrap();

        let mut sub = store.subscribe(&OwnerId("u1".into())).await.unwrap();
        let snapshot = sub.next().await.unwrap().unwrap();
        assert_eq!(snapshot[0].text, "second");
        assert_eq!(snapshot[1].text, "first");
    }

    #[tokio::test]
    async fn records_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("predictions.db");
        let path = path.to_str().unwrap();

        {
            let store = SqliteStore::new(path, "test-app").await.unwrap();
            store.append(record("u1", "durable")).await.unwrap();
        }

        let store = SqliteStore::new(path, "test-app").await.unwrap();
        let mut sub = store.subscribe(&OwnerId("u1".into())).await.unwrap();
        let snapshot = sub.next().await.unwrap().unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].text, "durable");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn concurrent_appends_publish_a_complete_snapshot() {
        let store = Arc::new(SqliteStore::new(":memory:", "test-app").await.unwrap());
        let sub = store.subscribe(&OwnerId("u1".into())).await.unwrap();

        let rounds = 16;
        for round in 0..rounds {
            let a = {
                let store = Arc::clone(&store);
                tokio::spawn(async move {
                    store
                        .append(record("u1", &format!("left {round}")))
                        .await
                        .unwrap()
                })
            };
            let b = {
                let store = Arc::clone(&store);
                tokio::spawn(async move {
                    store
                        .append(record("u1", &format!("right {round}")))
                        .await
                        .unwrap()
                })
            };
            a.await.unwrap();
            b.await.unwrap();
        }

        // Every append refreshed the channel before returning, and refreshes
        // publish in query order, so the latest value reflects all of them.
        let snapshot = sub.current().unwrap();
        assert_eq!(snapshot.len(), rounds * 2);
    }

    #[tokio::test]
    async fn subscribe_concurrent_with_append_sees_the_record() {
        for _ in 0..16 {
            let store = Arc::new(SqliteStore::new(":memory:", "test-app").await.unwrap());
            let appender = {
                let store = Arc::clone(&store);
                tokio::spawn(async move {
                    store.append(record("u1", "hot off the press")).await.unwrap()
                })
            };

            let mut sub = store.subscribe(&OwnerId("u1".into())).await.unwrap();
            appender.await.unwrap();

            // Either the seed snapshot already has the record, or the
            // append's refresh is the next emission.
            let mut snapshot = sub.next().await.unwrap().unwrap();
            if snapshot.is_empty() {
                snapshot = sub.next().await.unwrap().unwrap();
            }
            assert_eq!(snapshot.len(), 1);
        }
    }

    #[tokio::test]
    async fn dropped_subscribers_are_pruned_on_the_next_append() {
        let store = SqliteStore::new(":memory:", "test-app").await.unwrap();
        let owner = OwnerId("u1".into());

        let sub = store.subscribe(&owner).await.unwrap();
        assert!(store.watchers.read().await.contains_key(&owner));
        drop(sub);

        store.append(record("u1", "nobody listening")).await.unwrap();
        assert!(!store.watchers.read().await.contains_key(&owner));
    }

    #[tokio::test]
    async fn app_ids_namespace_the_same_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("predictions.db");
        let path = path.to_str().unwrap();

        let a = SqliteStore::new(path, "app-a").await.unwrap();
        a.append(record("u1", "from a")).await.unwrap();

        let b = SqliteStore::new(path, "app-b").await.unwrap();
        let mut sub = b.subscribe(&OwnerId("u1".into())).await.unwrap();
        assert!(sub.next().await.unwrap().unwrap().is_empty());
    }
}
