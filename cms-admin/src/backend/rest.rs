//! HTTP client for the content API

use async_trait::async_trait;
use cms_common::config::TomlConfig;
use cms_common::entities::{EntityKind, UploadedFile};
use cms_common::EntityId;
use reqwest::{header, RequestBuilder, Response, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

use super::{BackendError, ContentBackend, SessionUser, UploadRequest};

const USER_AGENT: &str = concat!("cms-admin/", env!("CARGO_PKG_VERSION"));

/// Content API client over REST
pub struct RestBackend {
    http_client: reqwest::Client,
    base_url: String,
    api_token: Option<String>,
    session_cookie: String,
}

impl RestBackend {
    pub fn new(config: &TomlConfig) -> Result<Self, BackendError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| BackendError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            api_token: config.api_token.clone(),
            session_cookie: config.session_cookie.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn entity_url(&self, kind: EntityKind, id: Option<EntityId>) -> String {
        match id {
            Some(id) => self.url(&format!("/api/{}/{}", kind.path(), id)),
            None => self.url(&format!("/api/{}", kind.path())),
        }
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder, what: &str) -> Result<Response, BackendError> {
        let response = self
            .authorized(request)
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(BackendError::NotFound(what.to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    async fn json(&self, request: RequestBuilder, what: &str) -> Result<Value, BackendError> {
        let value: Value = self
            .send(request, what)
            .await?
            .json()
            .await
            .map_err(|e| BackendError::Parse(e.to_string()))?;
        Ok(unwrap_data(value))
    }
}

/// Strip a `{"data": ...}` envelope if the API uses one
fn unwrap_data(value: Value) -> Value {
    match value {
        Value::Object(mut map)
            if map.contains_key("data") && map.keys().all(|k| k == "data" || k == "meta") =>
        {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

#[async_trait]
impl ContentBackend for RestBackend {
    async fn list(&self, kind: EntityKind) -> Result<Vec<Value>, BackendError> {
        let url = self.entity_url(kind, None);
        debug!(kind = %kind, url = %url, "Listing content");
        match self.json(self.http_client.get(&url), kind.path()).await? {
            Value::Array(items) => {
                info!(kind = %kind, count = items.len(), "Fetched content list");
                Ok(items)
            }
            other => Err(BackendError::Parse(format!(
                "Expected a list of {}, got {}",
                kind,
                other
            ))),
        }
    }

    async fn fetch(&self, kind: EntityKind, id: EntityId) -> Result<Value, BackendError> {
        let url = self.entity_url(kind, Some(id));
        self.json(self.http_client.get(&url), &format!("{} {}", kind, id))
            .await
    }

    async fn create(&self, kind: EntityKind, body: Value) -> Result<Value, BackendError> {
        let url = self.entity_url(kind, None);
        debug!(kind = %kind, "Creating content");
        self.json(self.http_client.post(&url).json(&body), kind.path())
            .await
    }

    async fn update(&self, kind: EntityKind, id: EntityId, body: Value) -> Result<Value, BackendError> {
        let url = self.entity_url(kind, Some(id));
        debug!(kind = %kind, id = %id, "Updating content");
        self.json(self.http_client.put(&url).json(&body), &format!("{} {}", kind, id))
            .await
    }

    async fn delete(&self, kind: EntityKind, id: EntityId) -> Result<(), BackendError> {
        let url = self.entity_url(kind, Some(id));
        debug!(kind = %kind, id = %id, "Deleting content");
        self.send(self.http_client.delete(&url), &format!("{} {}", kind, id))
            .await?;
        Ok(())
    }

    async fn upload(&self, file: UploadRequest) -> Result<UploadedFile, BackendError> {
        let part = reqwest::multipart::Part::bytes(file.bytes)
            .file_name(file.file_name.clone())
            .mime_str(&file.mime)
            .map_err(|e| BackendError::Parse(format!("Invalid mime type {}: {}", file.mime, e)))?;
        let form = reqwest::multipart::Form::new().part("files", part);

        let url = self.url("/api/upload");
        let value = self
            .json(self.http_client.post(&url).multipart(form), &file.file_name)
            .await?;

        // the upload endpoint answers with an array of stored files
        let first = match value {
            Value::Array(mut files) if !files.is_empty() => files.swap_remove(0),
            Value::Array(_) => {
                return Err(BackendError::Parse("Upload returned no files".to_string()));
            }
            other => other,
        };
        let uploaded: UploadedFile =
            serde_json::from_value(first).map_err(|e| BackendError::Parse(e.to_string()))?;
        info!(name = %uploaded.name, size = uploaded.size, "Uploaded file");
        Ok(uploaded)
    }

    async fn current_user(&self, session: &str) -> Result<Option<SessionUser>, BackendError> {
        let url = self.url("/api/auth/user");
        let request = self
            .http_client
            .get(&url)
            .header(header::COOKIE, format!("{}={}", self.session_cookie, session));

        match self.json(request, "session").await {
            Ok(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|e| BackendError::Parse(e.to_string())),
            Err(BackendError::NotFound(_)) => Ok(None),
            Err(BackendError::Api { status, .. }) if status == 401 || status == 403 => Ok(None),
            Err(e) => Err(e),
        }
    }
}
