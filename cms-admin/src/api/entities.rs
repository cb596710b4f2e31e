//! Flat-entity CRUD API
//!
//! The same handler set is mounted once per content type under
//! `/api/{kind}`:
//! - `GET|POST /api/{kind}` list (search, filters, sort, pages) / create
//! - `GET|PUT|DELETE /api/{kind}/:id`
//! - `POST /api/{kind}/refresh` re-fetch from the content API
//! - `POST /api/{kind}/actions/available` menu for a selection
//! - `POST /api/{kind}/actions` run a bulk action

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use cms_common::bulk::{BulkReport, BulkRequest};
use cms_common::entities::{
    Article, Collection, Entity, NhsCondition, NhsMedicine, Pack, Quiz, Section, SubSection, Tip,
};
use cms_common::journey::Journey;
use cms_common::listing::{self, ListPage, ListQuery};
use cms_common::{EntityId, StatusAction};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::backend::SessionUser;
use crate::content;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Decode a form body into `T`
fn decode<T: Entity>(body: Value) -> ApiResult<T> {
    serde_json::from_value(body)
        .map_err(|e| ApiError::BadRequest(format!("Invalid {} body: {}", T::KIND, e)))
}

/// GET /api/{kind}
pub async fn list<T: Entity>(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<ListPage<T>>> {
    content::ensure_loaded::<T>(&state).await?;
    let rows = state.content.of::<T>().all().await;
    Ok(Json(listing::list(rows, &query, state.settings.page_size)))
}

/// GET /api/videos
///
/// Articles whose content type is video
pub async fn list_videos(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<ListPage<Article>>> {
    content::ensure_loaded::<Article>(&state).await?;
    let rows: Vec<Article> = state
        .content
        .articles
        .all()
        .await
        .into_iter()
        .filter(|article| article.is_video())
        .collect();
    Ok(Json(listing::list(rows, &query, state.settings.page_size)))
}

/// GET /api/{kind}/:id
pub async fn get_one<T: Entity>(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<T>> {
    Ok(Json(content::get::<T>(&state, EntityId(id)).await?))
}

/// POST /api/{kind}
pub async fn create<T: Entity>(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> ApiResult<(StatusCode, Json<T>)> {
    let item = decode::<T>(body)?;
    let saved = content::create(&state, item).await?;
    Ok((StatusCode::CREATED, Json(saved)))
}

/// PUT /api/{kind}/:id
pub async fn update<T: Entity>(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<Value>,
) -> ApiResult<Json<T>> {
    if id == 0 {
        return Err(ApiError::BadRequest("Use POST to create".to_string()));
    }
    let item = decode::<T>(body)?;
    Ok(Json(content::update(&state, EntityId(id), item).await?))
}

/// DELETE /api/{kind}/:id
pub async fn remove<T: Entity>(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    content::delete_one::<T>(&state, EntityId(id), user.role).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/{kind}/refresh
pub async fn refresh<T: Entity>(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let count = content::refresh::<T>(&state).await?;
    Ok(Json(json!({ "kind": T::KIND, "count": count })))
}

#[derive(Debug, Deserialize)]
pub struct SelectionRequest {
    #[serde(default)]
    pub ids: Vec<EntityId>,
}

#[derive(Debug, Serialize)]
pub struct AvailableActions {
    pub actions: Vec<StatusAction>,
}

/// POST /api/{kind}/actions/available
pub async fn available<T: Entity>(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    Json(selection): Json<SelectionRequest>,
) -> ApiResult<Json<AvailableActions>> {
    let actions = content::available_actions::<T>(&state, &selection.ids, user.role).await?;
    Ok(Json(AvailableActions { actions }))
}

/// POST /api/{kind}/actions
pub async fn run_action<T: Entity>(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    Json(request): Json<BulkRequest>,
) -> ApiResult<Json<BulkReport>> {
    tracing::info!(
        kind = %T::KIND,
        action = ?request.action,
        count = request.ids.len(),
        user = %user.email,
        "Running bulk action"
    );
    Ok(Json(content::run_bulk::<T>(&state, request, user.role).await?))
}

fn routes_for<T: Entity>(router: Router<AppState>) -> Router<AppState> {
    let base = format!("/api/{}", T::KIND.path());
    router
        .route(&base, get(list::<T>).post(create::<T>))
        .route(&format!("{}/refresh", base), post(refresh::<T>))
        .route(&format!("{}/actions", base), post(run_action::<T>))
        .route(&format!("{}/actions/available", base), post(available::<T>))
        .route(
            &format!("{}/:id", base),
            get(get_one::<T>).put(update::<T>).delete(remove::<T>),
        )
}

/// CRUD routes for every content type
pub fn entity_api_routes() -> Router<AppState> {
    let router = Router::new().route("/api/videos", get(list_videos));
    let router = routes_for::<Article>(router);
    let router = routes_for::<Collection>(router);
    let router = routes_for::<Section>(router);
    let router = routes_for::<SubSection>(router);
    let router = routes_for::<Tip>(router);
    let router = routes_for::<Quiz>(router);
    let router = routes_for::<Pack>(router);
    let router = routes_for::<NhsCondition>(router);
    let router = routes_for::<NhsMedicine>(router);
    routes_for::<Journey>(router)
}
