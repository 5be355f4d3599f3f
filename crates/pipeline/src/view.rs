//! View state — everything the presentation layer renders, published
//! through a watch channel.

use std::sync::Arc;

use tokio::sync::watch;

use rumormill_core::record::{Label, RecordSet};

/// Pure presentation data. No behavior lives here.
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    /// The most recently published verdict, if any.
    pub label: Option<Label>,

    /// True while a labeling task is pending or running.
    pub loading: bool,

    /// User-visible error message, if any.
    pub message: Option<String>,

    /// The owner's history, newest first.
    pub history: RecordSet,
}

/// Shared write handle to the view channel.
///
/// Cheap to clone; every component that needs to publish state holds one.
#[derive(Clone)]
pub struct ViewHandle {
    tx: Arc<watch::Sender<ViewState>>,
}

impl ViewHandle {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(ViewState::default());
        Self { tx: Arc::new(tx) }
    }

    /// Observe view state changes.
    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.tx.subscribe()
    }

    /// The current view state.
    pub fn current(&self) -> ViewState {
        self.tx.borrow().clone()
    }

    /// Mutate the view state in place and notify subscribers.
    pub fn update(&self, f: impl FnOnce(&mut ViewState)) {
        self.tx.send_modify(f);
    }
}

impl Default for ViewHandle {
    fn default() -> Self {
        Self::new()
    }
}
