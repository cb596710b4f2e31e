//! Content operations shared by the admin API handlers
//!
//! Each store is fetched from the content API once, on first use, and
//! patched from backend responses afterwards. Store locks are never held
//! across a backend call; the load guard only serializes fetches.

use cms_common::bulk::{self, BulkFailure, BulkReport, BulkRequest};
use cms_common::entities::Entity;
use cms_common::{ContentStatus, EntityId, EntityStore, Role, StatusAction};
use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::backend::BackendError;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

async fn fetch_into<T: Entity>(state: &AppState, store: &EntityStore<T>) -> ApiResult<usize> {
    let raw = state.backend.list(T::KIND).await?;
    let items = raw
        .into_iter()
        .map(T::from_wire)
        .collect::<cms_common::Result<Vec<T>>>()
        .map_err(|e| {
            ApiError::Upstream(BackendError::Parse(format!("Malformed {} payload: {}", T::KIND, e)))
        })?;
    let count = items.len();
    store.replace_all(items).await;
    Ok(count)
}

/// Load the store for `T` unless it already is
///
/// Concurrent first requests share one fetch.
pub async fn ensure_loaded<T: Entity>(state: &AppState) -> ApiResult<()> {
    let store = state.content.of::<T>();
    if store.is_loaded().await {
        return Ok(());
    }
    let _guard = store.load_guard().await;
    if store.is_loaded().await {
        return Ok(());
    }
    let count = fetch_into(state, store).await?;
    info!(kind = %T::KIND, count, "Loaded content store");
    Ok(())
}

/// Re-fetch the store for `T` regardless of its state
pub async fn refresh<T: Entity>(state: &AppState) -> ApiResult<usize> {
    let store = state.content.of::<T>();
    let _guard = store.load_guard().await;
    let count = fetch_into(state, store).await?;
    info!(kind = %T::KIND, count, "Refreshed content store");
    Ok(count)
}

/// One entity, from the store or, failing that, from the content API
///
/// Rows fetched individually are added to the store.
pub async fn get<T: Entity>(state: &AppState, id: EntityId) -> ApiResult<T> {
    ensure_loaded::<T>(state).await?;
    let store = state.content.of::<T>();
    if let Some(item) = store.get(id).await {
        return Ok(item);
    }

    match state.backend.fetch(T::KIND, id).await {
        Ok(raw) => {
            let item = T::from_wire(raw)
                .map_err(|e| ApiError::Upstream(BackendError::Parse(e.to_string())))?;
            debug!(kind = %T::KIND, id = %id, "Fetched entity missing from store");
            store.upsert(item.clone()).await;
            Ok(item)
        }
        Err(BackendError::NotFound(_)) => Err(ApiError::NotFound(format!("{} {}", T::KIND, id))),
        Err(e) => Err(e.into()),
    }
}

/// Validate and persist an entity
///
/// New entities (`id == 0`) are created, others replaced. The store is
/// patched with the entity the backend returns; nothing changes locally when
/// validation or the backend call fails.
pub async fn save<T: Entity>(state: &AppState, mut item: T) -> ApiResult<T> {
    item.normalize();
    item.validate()?;

    let dangling = state.content.check_references(&item.references()).await;
    if !dangling.is_empty() {
        return Err(ApiError::Validation(dangling));
    }

    let wire = item.to_wire()?;
    let stored = if item.id().is_new() {
        state.backend.create(T::KIND, wire).await?
    } else {
        state.backend.update(T::KIND, item.id(), wire).await?
    };
    let saved = T::from_wire(stored)
        .map_err(|e| ApiError::Upstream(BackendError::Parse(e.to_string())))?;

    info!(kind = %T::KIND, id = %saved.id(), created = item.id().is_new(), "Saved content");
    state.content.of::<T>().upsert(saved.clone()).await;
    Ok(saved)
}

/// Create an entity from form input
///
/// New content always starts as a draft; any submitted status is ignored.
pub async fn create<T: Entity>(state: &AppState, mut item: T) -> ApiResult<T> {
    item.set_id(EntityId::NEW);
    item.set_status(ContentStatus::Draft);
    save(state, item).await
}

/// Replace an entity from form input, keeping its stored status
///
/// Status only changes through [`run_bulk`].
pub async fn update<T: Entity>(state: &AppState, id: EntityId, mut item: T) -> ApiResult<T> {
    let existing = get::<T>(state, id).await?;
    item.set_id(id);
    if let Some(status) = existing.status() {
        item.set_status(status);
    }
    save(state, item).await
}

async fn selection<T: Entity>(state: &AppState, ids: &[EntityId]) -> ApiResult<Vec<T>> {
    if ids.is_empty() {
        return Err(ApiError::BadRequest("No items selected".to_string()));
    }
    ensure_loaded::<T>(state).await?;
    let store = state.content.of::<T>();
    let mut rows = Vec::with_capacity(ids.len());
    for id in ids {
        let row = store
            .get(*id)
            .await
            .ok_or_else(|| ApiError::NotFound(format!("{} {}", T::KIND, id)))?;
        rows.push(row);
    }
    Ok(rows)
}

/// Actions to offer for `rows`, given the user's role
///
/// Types outside the publishing workflow only offer deletion.
fn offered<T: Entity>(rows: &[T], role: Role) -> Vec<StatusAction> {
    let statuses: Option<Vec<ContentStatus>> = rows.iter().map(Entity::status).collect();
    match statuses {
        Some(statuses) => bulk::available_actions(&statuses, role),
        None if !rows.is_empty() && role.may(StatusAction::Delete) => vec![StatusAction::Delete],
        None => Vec::new(),
    }
}

pub async fn available_actions<T: Entity>(
    state: &AppState,
    ids: &[EntityId],
    role: Role,
) -> ApiResult<Vec<StatusAction>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let rows = selection::<T>(state, ids).await?;
    Ok(offered(&rows, role))
}

/// Run one action over a selection
///
/// Backend requests run concurrently; each confirmed success is applied to
/// the store and each failure is reported against its id.
pub async fn run_bulk<T: Entity>(state: &AppState, request: BulkRequest, role: Role) -> ApiResult<BulkReport> {
    let rows = selection::<T>(state, &request.ids).await?;

    if !offered(&rows, role).contains(&request.action) {
        return Err(ApiError::Conflict(format!(
            "{:?} is not available for the selected {}",
            request.action,
            T::KIND
        )));
    }

    let report = match request.action {
        StatusAction::Delete => delete_rows(state, rows).await?,
        action => transition_rows(state, rows, action).await?,
    };
    if !report.is_complete() {
        warn!(
            kind = %T::KIND,
            action = ?report.action,
            failed = report.failed.len(),
            "Bulk action partially failed"
        );
    }
    Ok(report)
}

/// Delete one entity under the same rules as a bulk delete
pub async fn delete_one<T: Entity>(state: &AppState, id: EntityId, role: Role) -> ApiResult<()> {
    let row = get::<T>(state, id).await?;
    if !offered(std::slice::from_ref(&row), role).contains(&StatusAction::Delete) {
        return Err(ApiError::Conflict(format!("{} {} cannot be deleted", T::KIND, id)));
    }
    let blocked = bulk::blocked_deletes(std::slice::from_ref(&row));
    if !blocked.is_empty() {
        return Err(ApiError::DeleteBlocked(blocked));
    }
    state.backend.delete(T::KIND, id).await?;
    state.content.of::<T>().remove(id).await;
    info!(kind = %T::KIND, id = %id, "Deleted content");
    Ok(())
}

async fn delete_rows<T: Entity>(state: &AppState, rows: Vec<T>) -> ApiResult<BulkReport> {
    let blocked = bulk::blocked_deletes(&rows);
    if !blocked.is_empty() {
        warn!(kind = %T::KIND, count = blocked.len(), "Delete blocked by child content");
        return Err(ApiError::DeleteBlocked(blocked));
    }

    let ids: Vec<EntityId> = rows.iter().map(Entity::id).collect();
    let results = join_all(ids.iter().map(|id| state.backend.delete(T::KIND, *id))).await;

    let store = state.content.of::<T>();
    let mut report = BulkReport::new(StatusAction::Delete);
    for (id, result) in ids.into_iter().zip(results) {
        match result {
            Ok(()) => {
                store.remove(id).await;
                report.succeeded.push(id);
            }
            Err(e) => report.failed.push(BulkFailure {
                id,
                message: e.to_string(),
            }),
        }
    }
    info!(
        kind = %T::KIND,
        deleted = report.succeeded.len(),
        failed = report.failed.len(),
        "Bulk delete finished"
    );
    Ok(report)
}

async fn transition_rows<T: Entity>(
    state: &AppState,
    rows: Vec<T>,
    action: StatusAction,
) -> ApiResult<BulkReport> {
    let updates = rows.into_iter().map(|mut row| async move {
        let id = row.id();
        let result = async {
            let from = row
                .status()
                .ok_or_else(|| BackendError::Parse(format!("{} {} has no status", T::KIND, id)))?;
            let target = action
                .apply(from)
                .map_err(|e| BackendError::Parse(e.to_string()))?;
            row.set_status(target);
            let wire = row.to_wire().map_err(|e| BackendError::Parse(e.to_string()))?;
            let stored = state.backend.update(T::KIND, id, wire).await?;
            T::from_wire(stored).map_err(|e| BackendError::Parse(e.to_string()))
        }
        .await;
        (id, result)
    });

    let results = join_all(updates).await;

    let store = state.content.of::<T>();
    let mut report = BulkReport::new(action);
    for (id, result) in results {
        match result {
            Ok(saved) => {
                report.succeeded.push(id);
                store.upsert(saved).await;
            }
            Err(e) => report.failed.push(BulkFailure {
                id,
                message: e.to_string(),
            }),
        }
    }
    info!(
        kind = %T::KIND,
        action = ?action,
        updated = report.succeeded.len(),
        failed = report.failed.len(),
        "Bulk status change finished"
    );
    Ok(report)
}
