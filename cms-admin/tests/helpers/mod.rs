//! Shared fixtures for the cms-admin integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use axum::{body::Body, http::Request, Router};
use cms_admin::backend::{BackendError, ContentBackend, SessionUser, UploadRequest};
use cms_admin::drafts::DraftStore;
use cms_admin::{build_router, AdminSettings, AppState};
use cms_common::entities::{EntityKind, UploadedFile};
use cms_common::{EntityId, Role};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// In-memory content API
#[derive(Default)]
pub struct MemoryBackend {
    rows: Mutex<HashMap<EntityKind, Vec<Value>>>,
    next_id: AtomicI64,
    failing: Mutex<HashSet<i64>>,
    sessions: Mutex<HashMap<String, SessionUser>>,
    pub upload_fails: std::sync::atomic::AtomicBool,
    pub list_calls: AtomicUsize,
    pub create_calls: AtomicUsize,
    pub update_calls: AtomicUsize,
    pub delete_calls: AtomicUsize,
}

impl MemoryBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            next_id: AtomicI64::new(1000),
            ..Default::default()
        })
    }

    /// Seed rows of `kind` exactly as given
    pub fn seed(&self, kind: EntityKind, rows: Vec<Value>) {
        self.rows.lock().unwrap().entry(kind).or_default().extend(rows);
    }

    /// Make every update and delete of `id` fail
    pub fn fail_on(&self, id: i64) {
        self.failing.lock().unwrap().insert(id);
    }

    pub fn add_session(&self, session: &str, role: Role) {
        let user = SessionUser {
            id: 7,
            email: format!("{:?}@example.org", role).to_lowercase(),
            name: "Test user".to_string(),
            role,
        };
        self.sessions.lock().unwrap().insert(session.to_string(), user);
    }

    pub fn stored(&self, kind: EntityKind, id: i64) -> Option<Value> {
        self.rows
            .lock()
            .unwrap()
            .get(&kind)
            .and_then(|rows| rows.iter().find(|row| row["id"] == id).cloned())
    }

    pub fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }

    fn check(&self, id: EntityId) -> Result<(), BackendError> {
        if self.failing.lock().unwrap().contains(&id.0) {
            return Err(BackendError::Api {
                status: 500,
                body: format!("refusing {}", id),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ContentBackend for MemoryBackend {
    async fn list(&self, kind: EntityKind) -> Result<Vec<Value>, BackendError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.rows.lock().unwrap().get(&kind).cloned().unwrap_or_default())
    }

    async fn fetch(&self, kind: EntityKind, id: EntityId) -> Result<Value, BackendError> {
        self.stored(kind, id.0)
            .ok_or_else(|| BackendError::NotFound(format!("{} {}", kind, id)))
    }

    async fn create(&self, kind: EntityKind, mut body: Value) -> Result<Value, BackendError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        body["id"] = id.into();
        self.rows.lock().unwrap().entry(kind).or_default().push(body.clone());
        Ok(body)
    }

    async fn update(&self, kind: EntityKind, id: EntityId, mut body: Value) -> Result<Value, BackendError> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        self.check(id)?;
        body["id"] = id.0.into();
        let mut rows = self.rows.lock().unwrap();
        let rows = rows.entry(kind).or_default();
        match rows.iter_mut().find(|row| row["id"] == id.0) {
            Some(row) => *row = body.clone(),
            None => return Err(BackendError::NotFound(format!("{} {}", kind, id))),
        }
        Ok(body)
    }

    async fn delete(&self, kind: EntityKind, id: EntityId) -> Result<(), BackendError> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        self.check(id)?;
        let mut rows = self.rows.lock().unwrap();
        if let Some(rows) = rows.get_mut(&kind) {
            rows.retain(|row| row["id"] != id.0);
        }
        Ok(())
    }

    async fn upload(&self, file: UploadRequest) -> Result<UploadedFile, BackendError> {
        if self.upload_fails.load(Ordering::SeqCst) {
            return Err(BackendError::Network("connection reset".to_string()));
        }
        Ok(UploadedFile {
            id: EntityId(self.next_id.fetch_add(1, Ordering::SeqCst)),
            url: format!("/uploads/{}", file.file_name),
            mime: file.mime,
            name: file.file_name,
            size: file.bytes.len() as u64,
            width: None,
            height: None,
        })
    }

    async fn current_user(&self, session: &str) -> Result<Option<SessionUser>, BackendError> {
        Ok(self.sessions.lock().unwrap().get(session).cloned())
    }
}

pub fn settings(auth_disabled: bool) -> AdminSettings {
    AdminSettings {
        session_cookie: "session".to_string(),
        auth_disabled,
        page_size: 25,
    }
}

/// App state over `backend`, session checks disabled
pub async fn setup_state(backend: Arc<MemoryBackend>) -> AppState {
    setup_state_with(backend, settings(true)).await
}

pub async fn setup_state_with(backend: Arc<MemoryBackend>, settings: AdminSettings) -> AppState {
    let drafts = DraftStore::in_memory().await.expect("in-memory drafts");
    AppState::new(backend, drafts, settings)
}

pub async fn setup_app(backend: Arc<MemoryBackend>) -> Router {
    build_router(setup_state(backend).await)
}

pub fn test_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn json_request(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}
