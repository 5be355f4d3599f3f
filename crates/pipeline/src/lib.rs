//! The rumormill pipeline — debounced input handling, view state, and the
//! live history feed.
//!
//! Control flow: input event → [`DebounceController`] (gated on session
//! readiness) → labeler → store append; separately, the store's snapshot
//! stream → [`HistoryFeed`] → [`ViewState.history`]. The presentation layer
//! is a plain subscriber of the view channel and owns no sequencing.

pub mod debounce;
pub mod history;
pub mod view;

pub use debounce::{DEFAULT_QUIET_PERIOD, DebounceController};
pub use history::HistoryFeed;
pub use view::{ViewHandle, ViewState};
