//! In-memory [`DocumentStore`] used by pipeline tests
//!
//! Mirrors the store's semantics where the pipeline can observe them:
//! upsert-by-key overwrites, generated keys allocate fresh ids, and a
//! rejected commit applies nothing from its group. Specific commit calls
//! can be made to fail (1-based call index) to exercise the fail-open
//! batch policy.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use super::batch::{auto_id, DocumentKey, DocumentWrite};
use super::client::{DocumentStore, StoredDocument};
use super::error::StoreError;
use super::value::Fields;

#[derive(Default)]
pub struct MemoryStore {
    collections: Mutex<HashMap<String, BTreeMap<String, Fields>>>,
    commits: Mutex<Vec<(String, usize)>>,
    fail_commits: Mutex<HashSet<usize>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject the n-th commit call (1-based, counted across collections)
    pub fn fail_commit(&self, call: usize) {
        self.fail_commits.lock().unwrap().insert(call);
    }

    /// Preload a document, bypassing commit accounting
    pub fn insert(&self, collection: &str, id: &str, fields: Fields) {
        self.collections
            .lock()
            .unwrap()
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), fields);
    }

    pub fn document(&self, collection: &str, id: &str) -> Option<Fields> {
        self.collections
            .lock()
            .unwrap()
            .get(collection)
            .and_then(|docs| docs.get(id).cloned())
    }

    pub fn count(&self, collection: &str) -> usize {
        self.collections
            .lock()
            .unwrap()
            .get(collection)
            .map(|docs| docs.len())
            .unwrap_or(0)
    }

    /// (collection, write count) per commit call, in call order
    pub fn commit_calls(&self) -> Vec<(String, usize)> {
        self.commits.lock().unwrap().clone()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn commit(
        &self,
        collection: &str,
        writes: Vec<DocumentWrite>,
    ) -> Result<(), StoreError> {
        let call = {
            let mut commits = self.commits.lock().unwrap();
            commits.push((collection.to_string(), writes.len()));
            commits.len()
        };

        if self.fail_commits.lock().unwrap().contains(&call) {
            return Err(StoreError::CommitRejected {
                status: 503,
                message: format!("injected failure for commit {call}"),
            });
        }

        let mut collections = self.collections.lock().unwrap();
        let docs = collections.entry(collection.to_string()).or_default();
        for write in writes {
            let id = match write.key {
                DocumentKey::Assigned(id) => id,
                DocumentKey::Generated => auto_id(),
            };
            docs.insert(id, write.fields);
        }
        Ok(())
    }

    async fn get_one(&self, collection: &str) -> Result<Option<StoredDocument>, StoreError> {
        Ok(self
            .collections
            .lock()
            .unwrap()
            .get(collection)
            .and_then(|docs| docs.iter().next())
            .map(|(id, fields)| StoredDocument {
                id: id.clone(),
                fields: fields.clone(),
            }))
    }

    async fn list(&self, collection: &str) -> Result<Vec<StoredDocument>, StoreError> {
        Ok(self
            .collections
            .lock()
            .unwrap()
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .map(|(id, fields)| StoredDocument {
                        id: id.clone(),
                        fields: fields.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default())
    }
}
