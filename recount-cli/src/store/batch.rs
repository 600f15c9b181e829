//! Write-group building blocks: document keys, writes, auto-ids

use rand::Rng;

use super::value::Fields;

/// Alphabet the store's own SDKs draw auto-ids from
const AUTO_ID_ALPHABET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Length of a client-generated document id
const AUTO_ID_LEN: usize = 20;

/// How a document in a write group is addressed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentKey {
    /// Upsert by caller-supplied id (overwrite semantics)
    Assigned(String),
    /// Let the store allocate a fresh id; used when the source row has no
    /// natural key
    Generated,
}

/// One (key, document) pair inside a write group
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentWrite {
    pub key: DocumentKey,
    pub fields: Fields,
}

impl DocumentWrite {
    /// Upsert-by-key write
    pub fn assigned(id: impl Into<String>, fields: Fields) -> Self {
        Self {
            key: DocumentKey::Assigned(id.into()),
            fields,
        }
    }

    /// Write under a store-generated id
    pub fn generated(fields: Fields) -> Self {
        Self {
            key: DocumentKey::Generated,
            fields,
        }
    }
}

/// Generate a document id the way the store's client SDKs do: 20 characters
/// drawn uniformly from the 62-character alphabet.
pub fn auto_id() -> String {
    let mut rng = rand::rng();
    (0..AUTO_ID_LEN)
        .map(|_| AUTO_ID_ALPHABET[rng.random_range(0..AUTO_ID_ALPHABET.len())] as char)
        .collect()
}
