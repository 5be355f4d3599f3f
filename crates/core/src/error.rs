//! Error types for the rumormill domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use thiserror::Error;

/// The top-level error type for all rumormill operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Session / identity errors ---
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    // --- Store errors ---
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// Identity could not be established or is not usable.
///
/// Any of these blocks every store operation until resolved; there is no
/// automatic retry.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("Sign-in failed: {0}")]
    SignInFailed(String),

    #[error("Bootstrap token rejected: {0}")]
    TokenRejected(String),

    #[error("No identity established yet")]
    NotReady,
}

/// A store operation failed.
///
/// `Clone` because read failures travel inside snapshot emissions.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("Write failed: {0}")]
    WriteFailed(String),

    #[error("Read failed: {0}")]
    ReadFailed(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Storage error: {0}")]
    Storage(String),
}
