//! Session state — whether a usable identity exists.
//!
//! A session is created once at process start and lives until process end;
//! there is no explicit teardown. Store operations are gated on `ready`.

use serde::{Deserialize, Serialize};

use crate::record::OwnerId;

/// An established (or pending) user session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Identity string, stable for the process lifetime.
    pub id: OwnerId,

    /// True once an identity id has been confirmed.
    pub ready: bool,
}

/// Observable session lifecycle, published through a `watch` channel.
#[derive(Debug, Clone, Default)]
pub enum SessionState {
    /// No sign-in attempt has completed yet.
    #[default]
    Pending,

    /// An identity id is confirmed; store operations may proceed.
    Ready(OwnerId),

    /// Sign-in failed. Terminal: there is no automatic retry.
    Failed(String),
}

impl SessionState {
    pub fn is_ready(&self) -> bool {
        matches!(self, SessionState::Ready(_))
    }

    /// The confirmed owner id, if the session is ready.
    pub fn owner(&self) -> Option<&OwnerId> {
        match self {
            SessionState::Ready(id) => Some(id),
            _ => None,
        }
    }
}
