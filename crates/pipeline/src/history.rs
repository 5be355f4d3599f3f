//! The history feed — forwards store snapshots into the view, newest first.

use tokio::task::JoinHandle;
use tracing::warn;

use rumormill_core::record::sort_newest_first;
use rumormill_core::store::RecordsSubscription;

use crate::view::ViewHandle;

/// A spawned task owning one owner's snapshot subscription.
///
/// On every emission the snapshot is sorted newest-first and published into
/// `ViewState.history`. A read failure sets the user-visible message and
/// leaves the last good history in place — updates stop until the feed is
/// rebuilt (on session/owner change). Dropped or stopped on teardown.
pub struct HistoryFeed {
    handle: JoinHandle<()>,
}

impl HistoryFeed {
    pub fn spawn(mut subscription: RecordsSubscription, view: ViewHandle) -> Self {
        let handle = tokio::spawn(async move {
            while let Some(snapshot) = subscription.next().await {
                match snapshot {
                    Ok(mut records) => {
                        sort_newest_first(&mut records);
                        view.update(|v| v.history = records);
                    }
                    Err(e) => {
                        warn!(error = %e, "History subscription emitted a failure");
                        view.update(|v| {
                            v.message = Some(format!("Failed to load prediction history: {e}"));
                        });
                    }
                }
            }
        });

        Self { handle }
    }

    /// Tear the feed down. Also happens on drop.
    pub fn stop(&self) {
        self.handle.abort();
    }
}

impl Drop for HistoryFeed {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
