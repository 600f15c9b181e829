//! Firestore REST client
//!
//! The pipeline depends on three store capabilities only: batched atomic
//! upserts (`commit`), a single-document existence probe (`get_one`), and a
//! full collection read (`list`, used to derive the inventory baseline).
//! Everything else of the store's query surface is out of bounds.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use super::batch::{auto_id, DocumentKey, DocumentWrite};
use super::credentials::{ServiceAccountKey, TokenProvider};
use super::error::StoreError;
use super::value::{decode_fields, encode_fields, Fields};

const BASE_URL: &str = "https://firestore.googleapis.com/v1";

/// Page size for collection listing
const LIST_PAGE_SIZE: usize = 300;

/// A document read back from the store
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub id: String,
    pub fields: Fields,
}

/// The store capabilities the import pipeline consumes
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Apply one atomic write group to a collection. Either every write in
    /// the group is applied or none is.
    async fn commit(
        &self,
        collection: &str,
        writes: Vec<DocumentWrite>,
    ) -> Result<(), StoreError>;

    /// Read at most one document from a collection (existence probe)
    async fn get_one(&self, collection: &str) -> Result<Option<StoredDocument>, StoreError>;

    /// Read every document in a collection
    async fn list(&self, collection: &str) -> Result<Vec<StoredDocument>, StoreError>;
}

/// Firestore REST implementation of [`DocumentStore`]
pub struct FirestoreClient {
    http: reqwest::Client,
    project_id: String,
    tokens: Box<dyn TokenProvider>,
}

impl FirestoreClient {
    pub fn new(credentials: &ServiceAccountKey, tokens: Box<dyn TokenProvider>) -> Self {
        Self {
            http: reqwest::Client::new(),
            project_id: credentials.project_id.clone(),
            tokens,
        }
    }

    /// `projects/{project}/databases/(default)/documents`
    fn documents_root(&self) -> String {
        format!(
            "projects/{}/databases/(default)/documents",
            self.project_id
        )
    }

    /// Fully-qualified document name for a write
    fn document_name(&self, collection: &str, id: &str) -> String {
        format!("{}/{}/{}", self.documents_root(), collection, id)
    }

    async fn bearer(&self) -> Result<String, StoreError> {
        self.tokens.access_token().await
    }
}

/// Trailing path segment of a fully-qualified document name
fn document_id_from_name(name: &str) -> String {
    name.rsplit('/').next().unwrap_or(name).to_string()
}

/// Best-effort extraction of the error message from a store error body
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")?
                .get("message")
                .and_then(|m| m.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.chars().take(200).collect())
}

#[derive(Debug, Deserialize)]
struct ApiDocument {
    name: String,
    #[serde(default)]
    fields: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListDocumentsResponse {
    #[serde(default)]
    documents: Vec<ApiDocument>,
    next_page_token: Option<String>,
}

impl ApiDocument {
    fn into_stored(self) -> Result<StoredDocument, StoreError> {
        Ok(StoredDocument {
            id: document_id_from_name(&self.name),
            fields: decode_fields(&self.fields)?,
        })
    }
}

#[async_trait]
impl DocumentStore for FirestoreClient {
    async fn commit(
        &self,
        collection: &str,
        writes: Vec<DocumentWrite>,
    ) -> Result<(), StoreError> {
        let token = self.bearer().await?;

        let wire_writes: Vec<serde_json::Value> = writes
            .iter()
            .map(|write| {
                let id = match &write.key {
                    DocumentKey::Assigned(id) => id.clone(),
                    // The REST commit endpoint has no server-side id
                    // allocation; generate one client-side like the SDKs do
                    DocumentKey::Generated => auto_id(),
                };
                json!({
                    "update": {
                        "name": self.document_name(collection, &id),
                        "fields": encode_fields(&write.fields),
                    }
                })
            })
            .collect();

        let url = format!("{}/{}:commit", BASE_URL, self.documents_root());
        let response = self
            .http
            .post(&url)
            .bearer_auth(&token)
            .json(&json!({ "writes": wire_writes }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::CommitRejected {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }
        Ok(())
    }

    async fn get_one(&self, collection: &str) -> Result<Option<StoredDocument>, StoreError> {
        let token = self.bearer().await?;
        let url = format!("{}/{}/{}", BASE_URL, self.documents_root(), collection);
        let response = self
            .http
            .get(&url)
            .bearer_auth(&token)
            .query(&[("pageSize", "1")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::ReadRejected {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        let page: ListDocumentsResponse = response.json().await?;
        page.documents
            .into_iter()
            .next()
            .map(ApiDocument::into_stored)
            .transpose()
    }

    async fn list(&self, collection: &str) -> Result<Vec<StoredDocument>, StoreError> {
        let token = self.bearer().await?;
        let url = format!("{}/{}/{}", BASE_URL, self.documents_root(), collection);

        let mut documents = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .http
                .get(&url)
                .bearer_auth(&token)
                .query(&[("pageSize", LIST_PAGE_SIZE.to_string())]);
            if let Some(ref t) = page_token {
                request = request.query(&[("pageToken", t)]);
            }

            let response = request.send().await?;
            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(StoreError::ReadRejected {
                    status: status.as_u16(),
                    message: error_message(&body),
                });
            }

            let page: ListDocumentsResponse = response.json().await?;
            for doc in page.documents {
                documents.push(doc.into_stored()?);
            }

            match page.next_page_token {
                Some(t) if !t.is_empty() => page_token = Some(t),
                _ => break,
            }
        }

        Ok(documents)
    }
}
