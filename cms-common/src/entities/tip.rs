use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Entity, EntityKind};
use crate::store::{ContentStore, EntityStore};
use crate::validation::ValidationErrors;
use crate::{ContentStatus, EntityId};

const TIP_BODY_MAX_CHARS: usize = 500;

/// Short piece of advice shown in the app
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tip {
    #[serde(default)]
    pub id: EntityId,
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub status: ContentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Entity for Tip {
    const KIND: EntityKind = EntityKind::Tip;

    fn id(&self) -> EntityId {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }

    fn label(&self) -> &str {
        &self.title
    }

    fn status(&self) -> Option<ContentStatus> {
        Some(self.status)
    }

    fn set_status(&mut self, status: ContentStatus) {
        self.status = status;
    }

    fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require_text("title", &self.title);
        errors.require_text("body", &self.body);
        if self.body.chars().count() > TIP_BODY_MAX_CHARS {
            errors.push("body", format!("At most {} characters", TIP_BODY_MAX_CHARS));
        }
        errors.into_result()
    }

    fn select(store: &ContentStore) -> &EntityStore<Self> {
        &store.tips
    }
}
