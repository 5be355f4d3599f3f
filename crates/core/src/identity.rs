//! Identity provider trait — the external collaborator that establishes a
//! session-scoped owner id.
//!
//! The provider's internal protocol is opaque to this crate; all the
//! pipeline needs is "what is the current id", "mint an anonymous one", and
//! "exchange a bootstrap credential for one".

use async_trait::async_trait;
use tokio::sync::watch;

use crate::error::AuthError;
use crate::record::OwnerId;

/// The core IdentityProvider trait.
///
/// Implementations: local (anonymous UUID / token-derived), mock (tests).
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// The provider name (e.g., "local").
    fn name(&self) -> &str;

    /// The currently established identity, if any.
    async fn current(&self) -> Option<OwnerId>;

    /// Establish a fresh anonymous identity, stable for the process
    /// lifetime. Idempotent: returns the existing identity if one is set.
    async fn sign_in_anonymous(&self) -> std::result::Result<OwnerId, AuthError>;

    /// Exchange an externally supplied bootstrap credential for an identity.
    /// The same token must map to the same owner id across runs.
    async fn exchange_token(&self, token: &str) -> std::result::Result<OwnerId, AuthError>;

    /// Observe identity changes. The receiver holds the current identity
    /// and updates whenever it changes.
    fn on_identity_change(&self) -> watch::Receiver<Option<OwnerId>>;
}
