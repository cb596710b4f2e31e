//! Bulk-action rules for table selections
//!
//! A menu over N selected rows offers only the actions legal from every
//! selected row's status and permitted for the user's role. Deleting
//! containers that still hold child content is refused before any backend
//! call is made.

use serde::{Deserialize, Serialize};

use crate::entities::{ChildRefs, Entity};
use crate::{ContentStatus, EntityId, Role, StatusAction};

/// Actions to offer for a selection whose rows have `statuses`
///
/// Empty selections offer nothing. Order follows [`StatusAction::ALL`].
pub fn available_actions(statuses: &[ContentStatus], role: Role) -> Vec<StatusAction> {
    if statuses.is_empty() {
        return Vec::new();
    }
    StatusAction::ALL
        .into_iter()
        .filter(|action| role.may(*action))
        .filter(|action| statuses.iter().all(|status| status.permits(*action)))
        .collect()
}

/// Container that cannot be deleted while it holds children
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockedDelete {
    pub id: EntityId,
    pub label: String,
    pub children: ChildRefs,
}

/// Rows in `rows` that still hold child content
pub fn blocked_deletes<T: Entity>(rows: &[T]) -> Vec<BlockedDelete> {
    rows.iter()
        .filter_map(|row| {
            let children = row.child_refs();
            (!children.is_empty()).then(|| BlockedDelete {
                id: row.id(),
                label: row.label().to_string(),
                children,
            })
        })
        .collect()
}

/// Body of a bulk action request
#[derive(Debug, Clone, Deserialize)]
pub struct BulkRequest {
    pub ids: Vec<EntityId>,
    pub action: StatusAction,
}

/// Per-id failure inside a bulk action
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BulkFailure {
    pub id: EntityId,
    pub message: String,
}

/// Result of a bulk action: confirmed successes and per-id failures
#[derive(Debug, Clone, Serialize)]
pub struct BulkReport {
    pub action: StatusAction,
    pub succeeded: Vec<EntityId>,
    pub failed: Vec<BulkFailure>,
}

impl BulkReport {
    pub fn new(action: StatusAction) -> Self {
        Self {
            action,
            succeeded: Vec::new(),
            failed: Vec::new(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}
