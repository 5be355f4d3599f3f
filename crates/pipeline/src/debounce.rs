//! The debounce controller — delays labeling until input pauses, with
//! strict last-write-wins on the pending task.
//!
//! The single pending `JoinHandle` is the only shared resource; every call
//! to [`DebounceController::on_input`] aborts it before arming a new one,
//! so at most one timer is armed at any moment.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use rumormill_core::labeler::Labeler;
use rumormill_core::record::PredictionRecord;
use rumormill_core::session::SessionState;
use rumormill_core::store::DocumentStore;

use crate::view::ViewHandle;

/// Quiet period before a labeling task fires.
pub const DEFAULT_QUIET_PERIOD: Duration = Duration::from_millis(700);

/// Turns raw input events into debounced label-and-persist tasks.
pub struct DebounceController {
    labeler: Arc<dyn Labeler>,
    store: Option<Arc<dyn DocumentStore>>,
    session: watch::Receiver<SessionState>,
    view: ViewHandle,
    quiet_period: Duration,
    pending: Option<JoinHandle<()>>,
}

impl DebounceController {
    pub fn new(
        labeler: Arc<dyn Labeler>,
        session: watch::Receiver<SessionState>,
        view: ViewHandle,
    ) -> Self {
        Self {
            labeler,
            store: None,
            session,
            view,
            quiet_period: DEFAULT_QUIET_PERIOD,
            pending: None,
        }
    }

    /// Attach the store gateway. Without one, inputs only clear the view.
    pub fn with_store(mut self, store: Arc<dyn DocumentStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Override the quiet period.
    pub fn with_quiet_period(mut self, quiet_period: Duration) -> Self {
        self.quiet_period = quiet_period;
        self
    }

    /// Handle one input event (called on every keystroke/edit).
    pub fn on_input(&mut self, text: &str) {
        // Cancel-before-arm: at most one timer is ever armed.
        if let Some(pending) = self.pending.take() {
            pending.abort();
        }

        self.view.update(|v| v.message = None);

        let owner = self.session.borrow().owner().cloned();
        let (Some(owner), Some(store), false) =
            (owner, self.store.clone(), text.trim().is_empty())
        else {
            self.view.update(|v| {
                v.loading = false;
                v.label = None;
            });
            return;
        };

        self.view.update(|v| {
            v.loading = true;
            v.label = None;
        });

        let labeler = Arc::clone(&self.labeler);
        let view = self.view.clone();
        let text = text.to_string();
        let quiet_period = self.quiet_period;

        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(quiet_period).await;

            // Past the quiet period. The labeling and write run detached so
            // a later keystroke cancels only timers that have not fired yet,
            // never an in-flight append.
            tokio::spawn(async move {
                let label = labeler.label(&text);
                debug!(%label, "Labeling task fired");
                view.update(|v| {
                    v.loading = false;
                    v.label = Some(label);
                });

                let record = PredictionRecord::new(owner, text, label);
                if let Err(e) = store.append(record).await {
                    // Persistence failure never rolls back the shown label.
                    warn!(error = %e, "Failed to persist prediction");
                    view.update(|v| {
                        v.message = Some(format!("Failed to save prediction: {e}"));
                    });
                }
            });
        }));
    }

    /// Cancel any pending labeling task.
    pub fn shutdown(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.abort();
        }
    }
}

impl Drop for DebounceController {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::time::advance;

    use rumormill_core::error::StoreError;
    use rumormill_core::record::{Label, OwnerId, RecordId};
    use rumormill_core::store::RecordsSubscription;
    use rumormill_labeler::HeuristicLabeler;
    use rumormill_store::InMemoryStore;

    /// Counts appends; subscribe is unused in these tests.
    struct CountingStore {
        appends: AtomicUsize,
        texts: Mutex<Vec<String>>,
        fail_writes: bool,
    }

    impl CountingStore {
        fn new() -> Self {
            Self {
                appends: AtomicUsize::new(0),
                texts: Mutex::new(vec![]),
                fail_writes: false,
            }
        }

        fn failing() -> Self {
            Self {
                fail_writes: true,
                ..Self::new()
            }
        }
    }

    #[async_trait]
    impl DocumentStore for CountingStore {
        fn name(&self) -> &str {
            "counting"
        }

        async fn append(&self, record: PredictionRecord) -> Result<RecordId, StoreError> {
            if self.fail_writes {
                return Err(StoreError::WriteFailed("simulated outage".into()));
            }
            self.appends.fetch_add(1, Ordering::SeqCst);
            self.texts.lock().unwrap().push(record.text);
            Ok(RecordId("r1".into()))
        }

        async fn subscribe(&self, _owner: &OwnerId) -> Result<RecordsSubscription, StoreError> {
            Err(StoreError::Unavailable("not used by these tests".into()))
        }
    }

    struct FixedLabeler(Label);

    impl Labeler for FixedLabeler {
        fn name(&self) -> &str {
            "fixed"
        }

        fn label(&self, _text: &str) -> Label {
            self.0
        }
    }

    // The controller only ever `borrow()`s session state, so the receiver
    // stays usable after the sender is dropped.
    fn ready_session() -> watch::Receiver<SessionState> {
        let (_tx, rx) = watch::channel(SessionState::Ready(OwnerId("u1".into())));
        rx
    }

    fn pending_session() -> watch::Receiver<SessionState> {
        let (_tx, rx) = watch::channel(SessionState::Pending);
        rx
    }

    /// Let spawned tasks run (and register their timers).
    async fn settle() {
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }
    }

    fn controller(store: Arc<dyn DocumentStore>) -> (DebounceController, ViewHandle) {
        let view = ViewHandle::new();
        let controller = DebounceController::new(
            Arc::new(FixedLabeler(Label::FakeNews)),
            ready_session(),
            view.clone(),
        )
        .with_store(store);
        (controller, view)
    }

    #[tokio::test(start_paused = true)]
    async fn burst_fires_exactly_one_task() {
        let store = Arc::new(CountingStore::new());
        let (mut controller, view) = controller(store.clone());

        controller.on_input("a");
        settle().await;
        advance(Duration::from_millis(300)).await;

        controller.on_input("ab");
        settle().await;
        advance(Duration::from_millis(200)).await;

        controller.on_input("abc");
        settle().await;

        // 699 ms after the last keystroke: still quiet.
        advance(Duration::from_millis(699)).await;
        settle().await;
        assert_eq!(store.appends.load(Ordering::SeqCst), 0);
        assert!(view.current().loading);

        // Quiet period elapses: exactly the final burst's task fires.
        advance(Duration::from_millis(1)).await;
        settle().await;
        assert_eq!(store.appends.load(Ordering::SeqCst), 1);
        assert_eq!(store.texts.lock().unwrap().as_slice(), ["abc"]);
        assert!(!view.current().loading);
        assert_eq!(view.current().label, Some(Label::FakeNews));
    }

    #[tokio::test(start_paused = true)]
    async fn clearing_input_cancels_the_pending_task() {
        let store = Arc::new(CountingStore::new());
        let (mut controller, view) = controller(store.clone());

        controller.on_input("urgent");
        settle().await;
        assert!(view.current().loading);

        advance(Duration::from_millis(300)).await;
        controller.on_input("   ");
        settle().await;

        assert!(!view.current().loading);
        assert!(view.current().label.is_none());

        // Well past where the cancelled timer would have fired.
        advance(Duration::from_millis(2_000)).await;
        settle().await;
        assert_eq!(store.appends.load(Ordering::SeqCst), 0);
        assert!(view.current().label.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn not_ready_session_never_arms_a_timer() {
        let store = Arc::new(CountingStore::new());
        let view = ViewHandle::new();
        let mut controller = DebounceController::new(
            Arc::new(FixedLabeler(Label::FakeNews)),
            pending_session(),
            view.clone(),
        )
        .with_store(store.clone());

        controller.on_input("hello world");
        settle().await;
        assert!(!view.current().loading);

        advance(Duration::from_millis(2_000)).await;
        settle().await;
        assert_eq!(store.appends.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn missing_store_never_arms_a_timer() {
        let view = ViewHandle::new();
        let mut controller = DebounceController::new(
            Arc::new(FixedLabeler(Label::FakeNews)),
            ready_session(),
            view.clone(),
        );

        controller.on_input("hello world");
        settle().await;
        assert!(!view.current().loading);

        advance(Duration::from_millis(2_000)).await;
        settle().await;
        assert!(view.current().label.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn write_failure_keeps_the_label() {
        let store = Arc::new(CountingStore::failing());
        let (mut controller, view) = controller(store);

        controller.on_input("urgent news");
        settle().await;
        advance(DEFAULT_QUIET_PERIOD).await;
        settle().await;

        let state = view.current();
        assert_eq!(state.label, Some(Label::FakeNews));
        assert!(state.message.as_deref().unwrap_or("").contains("save"));
    }

    #[tokio::test(start_paused = true)]
    async fn new_input_clears_the_previous_message() {
        let store = Arc::new(CountingStore::failing());
        let (mut controller, view) = controller(store);

        controller.on_input("urgent news");
        settle().await;
        advance(DEFAULT_QUIET_PERIOD).await;
        settle().await;
        assert!(view.current().message.is_some());

        controller.on_input("take two");
        settle().await;
        assert!(view.current().message.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn end_to_end_with_real_store_and_labeler() {
        let store = Arc::new(InMemoryStore::new());
        let view = ViewHandle::new();
        let mut controller = DebounceController::new(
            Arc::new(HeuristicLabeler::new()),
            ready_session(),
            view.clone(),
        )
        .with_store(store.clone());

        controller.on_input("you won't believe this shocking truth");
        settle().await;
        advance(DEFAULT_QUIET_PERIOD).await;
        settle().await;

        let label = view.current().label.expect("a label was published");
        let mut sub = store.subscribe(&OwnerId("u1".into())).await.unwrap();
        let snapshot = sub.next().await.unwrap().unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].label, label);
    }
}
