//! Error taxonomy for the document store client

use thiserror::Error;

/// Errors surfaced by [`DocumentStore`](super::DocumentStore) implementations
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store cannot be reached or authenticated against. Fatal at
    /// start-up, before any writes are attempted.
    #[error("credential error: {0}")]
    Credential(String),

    /// HTTP transport failure
    #[error("store request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The store rejected a write group. The whole group failed; nothing
    /// in it was applied.
    #[error("write group rejected (HTTP {status}): {message}")]
    CommitRejected { status: u16, message: String },

    /// A read request was rejected
    #[error("read rejected (HTTP {status}): {message}")]
    ReadRejected { status: u16, message: String },

    /// The store answered with something the client cannot interpret
    #[error("unexpected response from store: {0}")]
    InvalidResponse(String),
}
