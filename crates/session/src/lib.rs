//! Session gate — tracks whether a usable identity exists before any store
//! operation is allowed.

pub mod local;

pub use local::LocalIdentity;

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{info, warn};

use rumormill_core::error::AuthError;
use rumormill_core::identity::IdentityProvider;
use rumormill_core::record::OwnerId;
use rumormill_core::session::{Session, SessionState};

/// Gates store access on an established identity.
///
/// Created once at startup. `ensure_session` runs at most one sign-in
/// attempt; on failure the gate stays not-ready indefinitely — there is no
/// automatic retry, callers surface the error to the user instead.
pub struct SessionGate {
    provider: Arc<dyn IdentityProvider>,
    state: watch::Sender<SessionState>,
}

impl SessionGate {
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        let (state, _) = watch::channel(SessionState::default());
        Self { provider, state }
    }

    /// Observe the session lifecycle.
    pub fn state(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn is_ready(&self) -> bool {
        self.state.borrow().is_ready()
    }

    /// The confirmed owner id, once ready.
    pub fn owner(&self) -> Option<OwnerId> {
        self.state.borrow().owner().cloned()
    }

    /// Establish a session: reuse the provider's current identity if one
    /// exists, otherwise exchange the bootstrap token (when supplied) or
    /// sign in anonymously.
    pub async fn ensure_session(
        &self,
        bootstrap_token: Option<&str>,
    ) -> std::result::Result<Session, AuthError> {
        if let Some(id) = self.provider.current().await {
            self.state.send_replace(SessionState::Ready(id.clone()));
            return Ok(Session { id, ready: true });
        }

        let attempt = match bootstrap_token {
            Some(token) => self.provider.exchange_token(token).await,
            None => self.provider.sign_in_anonymous().await,
        };

        match attempt {
            Ok(id) => {
                info!(provider = self.provider.name(), owner = %id, "Session established");
                self.state.send_replace(SessionState::Ready(id.clone()));
                Ok(Session { id, ready: true })
            }
            Err(e) => {
                warn!(provider = self.provider.name(), error = %e, "Failed to establish session");
                self.state.send_replace(SessionState::Failed(e.to_string()));
                Err(e)
            }
        }
    }
}
