//! Journey tree editing API
//!
//! Edits apply to the cached journey only; `POST /api/journeys/:id/save`
//! writes the whole tree to the content API. Node ids in paths are parsed
//! as server ids when numeric and as local ids otherwise.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use cms_common::journey::{
    Journey, ReorderOutcome, SectionPatch, SectionValues, StepPatch, StepPosition, StepValues,
    Unit, UnitPatch, UnitPosition, UnitValues,
};
use cms_common::{EntityId, NodeId};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::content;
use crate::error::ApiResult;
use crate::AppState;

fn node(segment: &str) -> NodeId {
    match segment.parse() {
        Ok(id) => id,
        Err(never) => match never {},
    }
}

/// Apply `f` to a cached journey; returns the updated tree and `f`'s result
async fn edit<R, F>(state: &AppState, journey_id: i64, f: F) -> ApiResult<(Journey, R)>
where
    F: FnOnce(&mut Journey) -> cms_common::Result<R>,
{
    content::ensure_loaded::<Journey>(state).await?;
    Ok(state.content.journeys.try_modify(EntityId(journey_id), f).await?)
}

#[derive(Debug, Serialize)]
pub struct Created {
    pub id: NodeId,
    pub journey: Journey,
}

#[derive(Debug, Serialize)]
pub struct Reordered {
    pub outcome: ReorderOutcome,
    pub journey: Journey,
}

#[derive(Debug, Deserialize)]
pub struct IndexMove {
    pub source: usize,
    pub destination: usize,
}

#[derive(Debug, Deserialize)]
pub struct UnitMove {
    pub source: UnitPosition,
    pub destination: UnitPosition,
}

#[derive(Debug, Deserialize)]
pub struct StepMove {
    pub source: StepPosition,
    pub destination: StepPosition,
}

// ========================================
// Sections
// ========================================

/// POST /api/journeys/:id/sections
pub async fn add_section(
    State(state): State<AppState>,
    Path(journey_id): Path<i64>,
    Json(values): Json<SectionValues>,
) -> ApiResult<(StatusCode, Json<Created>)> {
    let (journey, id) = edit(&state, journey_id, |j| j.add_section(values)).await?;
    Ok((StatusCode::CREATED, Json(Created { id, journey })))
}

/// PATCH /api/journeys/:id/sections/:section_id
pub async fn edit_section(
    State(state): State<AppState>,
    Path((journey_id, section_id)): Path<(i64, String)>,
    Json(patch): Json<SectionPatch>,
) -> ApiResult<Json<Journey>> {
    let section = node(&section_id);
    let (journey, ()) = edit(&state, journey_id, |j| j.edit_section(&section, patch)).await?;
    Ok(Json(journey))
}

/// DELETE /api/journeys/:id/sections/:section_id
pub async fn delete_section(
    State(state): State<AppState>,
    Path((journey_id, section_id)): Path<(i64, String)>,
) -> ApiResult<Json<Journey>> {
    let section = node(&section_id);
    let (journey, _) = edit(&state, journey_id, |j| j.delete_section(&section)).await?;
    Ok(Json(journey))
}

/// POST /api/journeys/:id/sections/reorder
pub async fn reorder_sections(
    State(state): State<AppState>,
    Path(journey_id): Path<i64>,
    Json(mv): Json<IndexMove>,
) -> ApiResult<Json<Reordered>> {
    let (journey, outcome) = edit(&state, journey_id, |j| {
        j.reorder_sections(mv.source, mv.destination)
    })
    .await?;
    Ok(Json(Reordered { outcome, journey }))
}

// ========================================
// Units
// ========================================

/// GET /api/journeys/:id/sections/:section_id/units/:unit_id
pub async fn get_unit(
    State(state): State<AppState>,
    Path((journey_id, section_id, unit_id)): Path<(i64, String, String)>,
) -> ApiResult<Json<Unit>> {
    let journey = content::get::<Journey>(&state, EntityId(journey_id)).await?;
    let unit = journey.unit(&node(&section_id), &node(&unit_id))?;
    Ok(Json(unit.clone()))
}

/// POST /api/journeys/:id/sections/:section_id/units
pub async fn add_unit(
    State(state): State<AppState>,
    Path((journey_id, section_id)): Path<(i64, String)>,
    Json(values): Json<UnitValues>,
) -> ApiResult<(StatusCode, Json<Created>)> {
    content::ensure_loaded::<Journey>(&state).await?;
    let section = node(&section_id);
    let id = state
        .content
        .add_unit(EntityId(journey_id), &section, values)
        .await?;
    let journey = content::get::<Journey>(&state, EntityId(journey_id)).await?;
    Ok((StatusCode::CREATED, Json(Created { id, journey })))
}

/// PATCH /api/journeys/:id/sections/:section_id/units/:unit_id
pub async fn edit_unit(
    State(state): State<AppState>,
    Path((journey_id, section_id, unit_id)): Path<(i64, String, String)>,
    Json(patch): Json<UnitPatch>,
) -> ApiResult<Json<Journey>> {
    let (section, unit) = (node(&section_id), node(&unit_id));
    let (journey, ()) = edit(&state, journey_id, |j| j.edit_unit(&section, &unit, patch)).await?;
    Ok(Json(journey))
}

/// DELETE /api/journeys/:id/sections/:section_id/units/:unit_id
pub async fn delete_unit(
    State(state): State<AppState>,
    Path((journey_id, section_id, unit_id)): Path<(i64, String, String)>,
) -> ApiResult<Json<Journey>> {
    let (section, unit) = (node(&section_id), node(&unit_id));
    let (journey, _) = edit(&state, journey_id, |j| j.delete_unit(&section, &unit)).await?;
    Ok(Json(journey))
}

#[derive(Debug, Serialize)]
pub struct Toggled {
    pub published: bool,
    pub journey: Journey,
}

/// POST /api/journeys/:id/sections/:section_id/units/:unit_id/toggle-published
pub async fn toggle_unit_published(
    State(state): State<AppState>,
    Path((journey_id, section_id, unit_id)): Path<(i64, String, String)>,
) -> ApiResult<Json<Toggled>> {
    let (section, unit) = (node(&section_id), node(&unit_id));
    let (journey, published) = edit(&state, journey_id, |j| {
        j.toggle_unit_published(&section, &unit)
    })
    .await?;
    Ok(Json(Toggled { published, journey }))
}

/// POST /api/journeys/:id/units/move
pub async fn move_unit(
    State(state): State<AppState>,
    Path(journey_id): Path<i64>,
    Json(mv): Json<UnitMove>,
) -> ApiResult<Json<Reordered>> {
    let (journey, outcome) = edit(&state, journey_id, |j| {
        j.move_unit(&mv.source, &mv.destination)
    })
    .await?;
    Ok(Json(Reordered { outcome, journey }))
}

// ========================================
// Steps
// ========================================

/// POST /api/journeys/:id/sections/:section_id/units/:unit_id/steps
pub async fn add_step(
    State(state): State<AppState>,
    Path((journey_id, section_id, unit_id)): Path<(i64, String, String)>,
    Json(values): Json<StepValues>,
) -> ApiResult<(StatusCode, Json<Created>)> {
    let (section, unit) = (node(&section_id), node(&unit_id));
    let (journey, id) = edit(&state, journey_id, |j| j.add_step(&section, &unit, values)).await?;
    Ok((StatusCode::CREATED, Json(Created { id, journey })))
}

/// PATCH /api/journeys/:id/sections/:section_id/units/:unit_id/steps/:step_id
pub async fn edit_step(
    State(state): State<AppState>,
    Path((journey_id, section_id, unit_id, step_id)): Path<(i64, String, String, String)>,
    Json(patch): Json<StepPatch>,
) -> ApiResult<Json<Journey>> {
    let (section, unit, step) = (node(&section_id), node(&unit_id), node(&step_id));
    let (journey, ()) = edit(&state, journey_id, |j| {
        j.edit_step(&section, &unit, &step, patch)
    })
    .await?;
    Ok(Json(journey))
}

/// DELETE /api/journeys/:id/sections/:section_id/units/:unit_id/steps/:step_id
pub async fn delete_step(
    State(state): State<AppState>,
    Path((journey_id, section_id, unit_id, step_id)): Path<(i64, String, String, String)>,
) -> ApiResult<Json<Journey>> {
    let (section, unit, step) = (node(&section_id), node(&unit_id), node(&step_id));
    let (journey, _) = edit(&state, journey_id, |j| j.delete_step(&section, &unit, &step)).await?;
    Ok(Json(journey))
}

/// POST /api/journeys/:id/steps/move
pub async fn move_step(
    State(state): State<AppState>,
    Path(journey_id): Path<i64>,
    Json(mv): Json<StepMove>,
) -> ApiResult<Json<Reordered>> {
    let (journey, outcome) = edit(&state, journey_id, |j| {
        j.move_step(&mv.source, &mv.destination)
    })
    .await?;
    Ok(Json(Reordered { outcome, journey }))
}

// ========================================
// Persistence
// ========================================

/// POST /api/journeys/:id/save
///
/// Writes the cached tree to the content API and replaces the cache with
/// the stored result (local node ids become server ids).
pub async fn save_journey(
    State(state): State<AppState>,
    Path(journey_id): Path<i64>,
) -> ApiResult<Json<Journey>> {
    let journey = content::get::<Journey>(&state, EntityId(journey_id)).await?;
    let saved = content::save(&state, journey).await?;
    info!(journey_id, sections = saved.sections.len(), "Saved journey");
    Ok(Json(saved))
}

/// Journey editor routes
pub fn journey_routes() -> Router<AppState> {
    const UNIT: &str = "/api/journeys/:id/sections/:section_id/units/:unit_id";
    Router::new()
        .route("/api/journeys/:id/save", post(save_journey))
        .route("/api/journeys/:id/sections", post(add_section))
        .route("/api/journeys/:id/sections/reorder", post(reorder_sections))
        .route(
            "/api/journeys/:id/sections/:section_id",
            delete(delete_section).patch(edit_section),
        )
        .route("/api/journeys/:id/sections/:section_id/units", post(add_unit))
        .route(UNIT, get(get_unit).patch(edit_unit).delete(delete_unit))
        .route(&format!("{}/toggle-published", UNIT), post(toggle_unit_published))
        .route(&format!("{}/steps", UNIT), post(add_step))
        .route(
            &format!("{}/steps/:step_id", UNIT),
            delete(delete_step).patch(edit_step),
        )
        .route("/api/journeys/:id/units/move", post(move_unit))
        .route("/api/journeys/:id/steps/move", post(move_step))
}
