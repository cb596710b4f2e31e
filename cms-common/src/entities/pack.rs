use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{references_from, Entity, EntityKind, Reference, UploadedFile};
use crate::store::{ContentStore, EntityStore};
use crate::validation::ValidationErrors;
use crate::{ContentStatus, EntityId};

/// Curated bundle of articles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pack {
    #[serde(default)]
    pub id: EntityId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: ContentStatus,
    #[serde(default)]
    pub image: Option<UploadedFile>,
    #[serde(default)]
    pub articles: Vec<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Entity for Pack {
    const KIND: EntityKind = EntityKind::Pack;

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

    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    fn references(&self) -> Vec<Reference> {
        references_from("articles", EntityKind::Article, &self.articles)
    }

    fn normalize(&mut self) {
        // a pack lists each article once, first occurrence wins
        let mut seen = std::collections::HashSet::new();
        self.articles.retain(|id| seen.insert(*id));
    }

    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require_text("title", &self.title);
        errors.into_result()
    }

    fn select(store: &ContentStore) -> &EntityStore<Self> {
        &store.packs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_drops_duplicate_articles() {
        let mut pack: Pack =
            serde_json::from_value(json!({"title": "Starter", "articles": [3, 1, 3, 2, 1]}))
                .unwrap();
        pack.normalize();
        assert_eq!(pack.articles, vec![EntityId(3), EntityId(1), EntityId(2)]);
    }
}
