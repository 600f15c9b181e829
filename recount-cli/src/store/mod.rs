//! Document-store client
//!
//! An explicit client handle is constructed once at start-up and threaded
//! through the pipeline; nothing in the crate holds ambient store state.

pub mod batch;
pub mod client;
pub mod credentials;
pub mod error;
pub mod value;

#[cfg(test)]
pub mod memory;

pub use batch::{auto_id, DocumentKey, DocumentWrite};
pub use client::{DocumentStore, FirestoreClient, StoredDocument};
pub use credentials::{
    load_service_account, EnvTokenProvider, ServiceAccountKey, StaticTokenProvider, TokenProvider,
};
pub use error::StoreError;
pub use value::{Fields, Value};
