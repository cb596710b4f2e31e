//! Content API seam
//!
//! The console never owns content: every create, update, delete and upload
//! goes through a [`ContentBackend`]. Payloads cross this seam as raw JSON
//! in the backend's wire format; decoding into typed entities happens in
//! [`crate::content`].

mod rest;

pub use rest::RestBackend;

use async_trait::async_trait;
use cms_common::entities::{EntityKind, UploadedFile};
use cms_common::{EntityId, Role};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Content API errors
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Parse error: {0}")]
    Parse(String),
}

impl BackendError {
    /// Raw backend payload, when there is one
    pub fn details(&self) -> Option<&str> {
        match self {
            BackendError::Api { body, .. } if !body.is_empty() => Some(body),
            _ => None,
        }
    }
}

/// Signed-in console user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: i64,
    pub email: String,
    #[serde(default)]
    pub name: String,
    pub role: Role,
}

impl SessionUser {
    /// Stand-in user when session checks are disabled
    pub fn local_admin() -> Self {
        Self {
            id: 0,
            email: "admin@localhost".to_string(),
            name: "Local admin".to_string(),
            role: Role::Admin,
        }
    }
}

/// File received from the browser, forwarded to the upload endpoint
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

#[async_trait]
pub trait ContentBackend: Send + Sync {
    /// Every entity of `kind`
    async fn list(&self, kind: EntityKind) -> Result<Vec<Value>, BackendError>;

    async fn fetch(&self, kind: EntityKind, id: EntityId) -> Result<Value, BackendError>;

    /// POST a new entity; returns the stored entity with its issued id
    async fn create(&self, kind: EntityKind, body: Value) -> Result<Value, BackendError>;

    /// PUT an existing entity; returns the stored entity
    async fn update(&self, kind: EntityKind, id: EntityId, body: Value) -> Result<Value, BackendError>;

    async fn delete(&self, kind: EntityKind, id: EntityId) -> Result<(), BackendError>;

    async fn upload(&self, file: UploadRequest) -> Result<UploadedFile, BackendError>;

    /// Resolve a session cookie value; `None` when the session is unknown
    async fn current_user(&self, session: &str) -> Result<Option<SessionUser>, BackendError>;
}
