//! Media uploads
//!
//! `POST /api/uploads` takes one multipart field named `file` and forwards
//! it to the content API's upload endpoint. Failures answer 502 with
//! `"retry": true` so the form can offer a manual retry.

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    routing::post,
    Json, Router,
};
use cms_common::entities::UploadedFile;
use tracing::{info, warn};

use crate::backend::UploadRequest;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Largest accepted upload
pub const MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// POST /api/uploads
pub async fn upload_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<UploadedFile>> {
    let mut file = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Malformed upload: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("upload").to_string();
        let mime = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Malformed upload: {}", e)))?;
        file = Some(UploadRequest {
            file_name,
            mime,
            bytes: bytes.to_vec(),
        });
        break;
    }

    let file = file.ok_or_else(|| ApiError::BadRequest("Missing multipart field 'file'".to_string()))?;
    if file.bytes.is_empty() {
        return Err(ApiError::BadRequest("Uploaded file is empty".to_string()));
    }

    let name = file.file_name.clone();
    info!(name = %name, mime = %file.mime, size = file.bytes.len(), "Forwarding upload");
    match state.backend.upload(file).await {
        Ok(uploaded) => Ok(Json(uploaded)),
        Err(e) => {
            warn!(name = %name, error = %e, "Upload failed");
            Err(ApiError::UploadFailed(e.to_string()))
        }
    }
}

pub fn upload_routes() -> Router<AppState> {
    Router::new()
        .route("/api/uploads", post(upload_file))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
}
