//! Local identity provider — anonymous UUID identities and token-derived
//! ones, with no external service behind them.

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use tokio::sync::watch;
use tracing::debug;
use uuid::Uuid;

use rumormill_core::error::AuthError;
use rumormill_core::identity::IdentityProvider;
use rumormill_core::record::OwnerId;

/// An in-process identity provider.
///
/// Anonymous sign-in mints a UUID v4, stable for the process lifetime.
/// Token exchange hashes the token, so the same credential maps to the
/// same owner id across runs.
pub struct LocalIdentity {
    current: watch::Sender<Option<OwnerId>>,
}

impl LocalIdentity {
    pub fn new() -> Self {
        let (current, _) = watch::channel(None);
        Self { current }
    }

    fn set_current(&self, id: &OwnerId) {
        self.current.send_replace(Some(id.clone()));
    }
}

impl Default for LocalIdentity {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IdentityProvider for LocalIdentity {
    fn name(&self) -> &str {
        "local"
    }

    async fn current(&self) -> Option<OwnerId> {
        self.current.borrow().clone()
    }

    async fn sign_in_anonymous(&self) -> Result<OwnerId, AuthError> {
        if let Some(existing) = self.current.borrow().clone() {
            return Ok(existing);
        }

        let id = OwnerId(Uuid::new_v4().to_string());
        debug!(owner = %id, "Minted anonymous identity");
        self.set_current(&id);
        Ok(id)
    }

    async fn exchange_token(&self, token: &str) -> Result<OwnerId, AuthError> {
        if token.trim().is_empty() {
            return Err(AuthError::TokenRejected("token is empty".into()));
        }

        let digest = Sha256::digest(token.as_bytes());
        let id = OwnerId(format!("{digest:x}"));
        debug!(owner = %id, "Exchanged bootstrap token for identity");
        self.set_current(&id);
        Ok(id)
    }

    fn on_identity_change(&self) -> watch::Receiver<Option<OwnerId>> {
        self.current.subscribe()
    }
}
