//! # Rumormill Core
//!
//! Domain types, traits, and error definitions for the rumormill labeling
//! pipeline. This crate has **zero framework dependencies** — it defines the
//! domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! Every subsystem is defined as a trait here. Implementations live in their
//! respective crates. This enables:
//! - Swapping implementations via configuration
//! - Easy testing with mock/stub implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod error;
pub mod identity;
pub mod labeler;
pub mod record;
pub mod session;
pub mod store;

// Re-export key types at crate root for ergonomics
pub use error::{AuthError, Error, Result, StoreError};
pub use identity::IdentityProvider;
pub use labeler::Labeler;
pub use record::{Label, OwnerId, PredictionRecord, RecordId, RecordSet, sort_newest_first};
pub use session::{Session, SessionState};
pub use store::{DocumentStore, RecordsSubscription, Snapshot};
