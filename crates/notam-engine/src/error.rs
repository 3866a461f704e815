//! Error types for notam-engine

use notam_core::IdentityKey;
use thiserror::Error;

/// A computation stopped because newer inputs arrived
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Computation cancelled")]
pub struct Cancelled;

/// Failure of the external status store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Notice not in briefing: {0}")]
    UnknownNotice(IdentityKey),

    /// The in-memory view already reflects the change
    #[error("Status change kept in memory but not persisted: {0}")]
    Store(#[from] StoreError),
}
