//! Minimal blocking client for the Cloud Firestore REST API
//!
//! Covers exactly what the uploader needs: service-account authentication
//! and `createDocument` calls with server-assigned ids.

mod auth;
mod value;

use std::fmt;
use std::time::Duration;

use indexmap::IndexMap;
use serde::Deserialize;
use thiserror::Error;

use crate::model::CellValue;

pub use auth::{ServiceAccountKey, TokenProvider};
pub use value::{fields_to_wire, to_wire};

const FIRESTORE_BASE_URL: &str = "https://firestore.googleapis.com/v1";

/// Per-request timeout; the only time bound in the pipeline.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum FirestoreError {
    #[error("failed to read credentials file {path}: {source}")]
    KeyFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse credentials file: {0}")]
    KeyParse(#[from] serde_json::Error),

    #[error("failed to sign token assertion: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("token exchange rejected: status={status}, body={body}")]
    TokenExchange { status: u16, body: String },

    #[error("Firestore rejected the write: status={status}, body={body}")]
    Api { status: u16, body: String },

    #[error("malformed Firestore response: {0}")]
    MalformedResponse(String),
}

/// Destination collection, nested under a factory document:
/// `factories/{factory_id}/{collection}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionPath {
    pub factory_id: String,
    pub collection: String,
}

impl CollectionPath {
    pub fn new(factory_id: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            factory_id: factory_id.into(),
            collection: collection.into(),
        }
    }

    /// Path relative to the database's document root
    pub fn relative(&self) -> String {
        format!("factories/{}/{}", self.factory_id, self.collection)
    }
}

impl fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.relative())
    }
}

#[derive(Debug, Deserialize)]
struct CreatedDocument {
    name: String,
}

/// Blocking Firestore client bound to one project's default database
pub struct FirestoreClient {
    http: reqwest::blocking::Client,
    tokens: TokenProvider,
    project_id: String,
}

impl FirestoreClient {
    /// Build a client from a service-account key. The project id defaults to
    /// the key's own, unless overridden.
    pub fn new(
        key: ServiceAccountKey,
        project_override: Option<String>,
    ) -> Result<Self, FirestoreError> {
        let project_id = project_override.unwrap_or_else(|| key.project_id.clone());
        let http = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        let tokens = TokenProvider::new(key)?;
        Ok(Self {
            http,
            tokens,
            project_id,
        })
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// Create a document with a server-assigned id, returning that id.
    pub fn create_document(
        &mut self,
        path: &CollectionPath,
        fields: &IndexMap<String, CellValue>,
    ) -> Result<String, FirestoreError> {
        let token = self.tokens.access_token(&self.http)?;
        let url = format!(
            "{}/projects/{}/databases/(default)/documents/{}",
            FIRESTORE_BASE_URL,
            self.project_id,
            path.relative()
        );
        let body = serde_json::json!({ "fields": fields_to_wire(fields) });

        tracing::debug!("POST {} ({} fields)", url, fields.len());
        let response = self
            .http
            .post(&url)
            .bearer_auth(&token)
            .json(&body)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(FirestoreError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let created: CreatedDocument = response.json()?;
        let doc_id = created
            .name
            .rsplit('/')
            .next()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| {
                FirestoreError::MalformedResponse(format!(
                    "document name has no id segment: {:?}",
                    created.name
                ))
            })?;
        Ok(doc_id.to_string())
    }
}
