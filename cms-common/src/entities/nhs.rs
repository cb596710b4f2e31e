//! NHS-sourced reference content: conditions and medicines

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Entity, EntityKind};
use crate::store::{ContentStore, EntityStore};
use crate::validation::ValidationErrors;
use crate::{ContentStatus, EntityId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NhsCondition {
    #[serde(default)]
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub source_url: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub status: ContentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NhsMedicine {
    #[serde(default)]
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub source_url: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub status: ContentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

fn validate_nhs_page(name: &str, source_url: &str) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    errors.require_text("name", name);
    errors.require_url("source_url", source_url);
    errors.into_result()
}

impl Entity for NhsCondition {
    const KIND: EntityKind = EntityKind::Condition;

    fn id(&self) -> EntityId {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }

    fn label(&self) -> &str {
        &self.name
    }

    fn status(&self) -> Option<ContentStatus> {
        Some(self.status)
    }

    fn set_status(&mut self, status: ContentStatus) {
        self.status = status;
    }

    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    fn validate(&self) -> Result<(), ValidationErrors> {
        validate_nhs_page(&self.name, &self.source_url)
    }

    fn select(store: &ContentStore) -> &EntityStore<Self> {
        &store.conditions
    }
}

impl Entity for NhsMedicine {
    const KIND: EntityKind = EntityKind::Medicine;

    fn id(&self) -> EntityId {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }

    fn label(&self) -> &str {
        &self.name
    }

    fn status(&self) -> Option<ContentStatus> {
        Some(self.status)
    }

    fn set_status(&mut self, status: ContentStatus) {
        self.status = status;
    }

    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    fn validate(&self) -> Result<(), ValidationErrors> {
        validate_nhs_page(&self.name, &self.source_url)
    }

    fn select(store: &ContentStore) -> &EntityStore<Self> {
        &store.medicines
    }
}
