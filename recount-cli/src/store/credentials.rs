//! Service-account credentials and token acquisition
//!
//! Token acquisition is deliberately thin: the client only needs a bearer
//! token, and where that token comes from is an operator concern. The
//! shipped provider reads it from the environment; tests inject a static
//! one.

use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;

use super::error::StoreError;

/// Environment variable the default token provider reads
pub const DEFAULT_TOKEN_ENV: &str = "GOOGLE_OAUTH_ACCESS_TOKEN";

/// The subset of a service-account key file the client needs
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub project_id: String,
    #[serde(default)]
    pub client_email: String,
}

/// Load and parse a service-account key file
pub fn load_service_account(path: &Path) -> Result<ServiceAccountKey> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read credentials file: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Invalid service-account key file: {}", path.display()))
}

/// Supplies bearer tokens for store requests
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn access_token(&self) -> Result<String, StoreError>;
}

/// Reads the access token from an environment variable
#[derive(Debug, Clone)]
pub struct EnvTokenProvider {
    var: String,
}

impl EnvTokenProvider {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl Default for EnvTokenProvider {
    fn default() -> Self {
        Self::new(DEFAULT_TOKEN_ENV)
    }
}

#[async_trait]
impl TokenProvider for EnvTokenProvider {
    async fn access_token(&self) -> Result<String, StoreError> {
        match std::env::var(&self.var) {
            Ok(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
            _ => Err(StoreError::Credential(format!(
                "no access token in ${} (set it with e.g. `gcloud auth print-access-token`)",
                self.var
            ))),
        }
    }
}

/// Fixed token, for tests and scripted runs
#[derive(Debug, Clone)]
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn access_token(&self) -> Result<String, StoreError> {
        Ok(self.token.clone())
    }
}
