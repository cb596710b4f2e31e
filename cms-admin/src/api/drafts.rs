//! Local draft endpoints
//!
//! - `GET /api/drafts/:kind` list saved drafts
//! - `GET|PUT|DELETE /api/drafts/:kind/:key` read, save, discard

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use cms_common::entities::EntityKind;
use serde_json::Value;

use crate::drafts::{Draft, DraftSummary};
use crate::error::{ApiError, ApiResult};
use crate::AppState;

fn kind(segment: &str) -> ApiResult<EntityKind> {
    Ok(segment.parse::<EntityKind>()?)
}

/// GET /api/drafts/:kind
pub async fn list_drafts(
    State(state): State<AppState>,
    Path(kind_segment): Path<String>,
) -> ApiResult<Json<Vec<DraftSummary>>> {
    let kind = kind(&kind_segment)?;
    Ok(Json(state.drafts.list(kind.path()).await?))
}

/// GET /api/drafts/:kind/:key
pub async fn get_draft(
    State(state): State<AppState>,
    Path((kind_segment, key)): Path<(String, String)>,
) -> ApiResult<Json<Draft>> {
    let kind = kind(&kind_segment)?;
    state
        .drafts
        .get(kind.path(), &key)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Draft {}/{}", kind, key)))
}

/// PUT /api/drafts/:kind/:key
///
/// Stores the body as-is; drafts are not validated.
pub async fn save_draft(
    State(state): State<AppState>,
    Path((kind_segment, key)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> ApiResult<Json<Draft>> {
    let kind = kind(&kind_segment)?;
    let draft = state.drafts.save(kind.path(), &key, body).await?;
    tracing::debug!(kind = %kind, key = %key, "Saved draft");
    Ok(Json(draft))
}

/// DELETE /api/drafts/:kind/:key
pub async fn delete_draft(
    State(state): State<AppState>,
    Path((kind_segment, key)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    let kind = kind(&kind_segment)?;
    if state.drafts.delete(kind.path(), &key).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("Draft {}/{}", kind, key)))
    }
}

pub fn draft_routes() -> Router<AppState> {
    Router::new()
        .route("/api/drafts/:kind", get(list_drafts))
        .route(
            "/api/drafts/:kind/:key",
            get(get_draft).put(save_draft).delete(delete_draft),
        )
}
