//! Taxonomy containers: collections, sections and sub-sections
//!
//! Containers hold arrays of child ids and may only be deleted while empty.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{references_from, ChildRefs, Entity, EntityKind, Reference, UploadedFile};
use crate::store::{ContentStore, EntityStore};
use crate::validation::ValidationErrors;
use crate::{ContentStatus, EntityId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
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
    #[serde(default)]
    pub videos: Vec<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    #[serde(default)]
    pub id: EntityId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: ContentStatus,
    #[serde(default)]
    pub articles: Vec<EntityId>,
    #[serde(default)]
    pub videos: Vec<EntityId>,
    #[serde(default)]
    pub collections: Vec<EntityId>,
    #[serde(default)]
    pub sub_sections: Vec<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubSection {
    #[serde(default)]
    pub id: EntityId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: ContentStatus,
    /// Parent section
    #[serde(default)]
    pub section: Option<EntityId>,
    #[serde(default)]
    pub articles: Vec<EntityId>,
    #[serde(default)]
    pub videos: Vec<EntityId>,
    #[serde(default)]
    pub collections: Vec<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

fn validate_title(title: &str) -> Result<(), ValidationErrors> {
    let mut errors = ValidationErrors::new();
    errors.require_text("title", title);
    errors.into_result()
}

impl Entity for Collection {
    const KIND: EntityKind = EntityKind::Collection;

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

    fn child_refs(&self) -> ChildRefs {
        ChildRefs {
            articles: self.articles.len(),
            videos: self.videos.len(),
            ..Default::default()
        }
    }

    fn references(&self) -> Vec<Reference> {
        let mut refs = references_from("articles", EntityKind::Article, &self.articles);
        refs.extend(references_from("videos", EntityKind::Article, &self.videos));
        refs
    }

    fn validate(&self) -> Result<(), ValidationErrors> {
        validate_title(&self.title)
    }

    fn select(store: &ContentStore) -> &EntityStore<Self> {
        &store.collections
    }
}

impl Entity for Section {
    const KIND: EntityKind = EntityKind::Section;

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

    fn child_refs(&self) -> ChildRefs {
        ChildRefs {
            articles: self.articles.len(),
            videos: self.videos.len(),
            collections: self.collections.len(),
            sub_sections: self.sub_sections.len(),
        }
    }

    fn references(&self) -> Vec<Reference> {
        let mut refs = references_from("articles", EntityKind::Article, &self.articles);
        refs.extend(references_from("videos", EntityKind::Article, &self.videos));
        refs.extend(references_from("collections", EntityKind::Collection, &self.collections));
        refs.extend(references_from("sub_sections", EntityKind::SubSection, &self.sub_sections));
        refs
    }

    fn validate(&self) -> Result<(), ValidationErrors> {
        validate_title(&self.title)
    }

    fn select(store: &ContentStore) -> &EntityStore<Self> {
        &store.sections
    }
}

impl Entity for SubSection {
    const KIND: EntityKind = EntityKind::SubSection;

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

    fn child_refs(&self) -> ChildRefs {
        ChildRefs {
            articles: self.articles.len(),
            videos: self.videos.len(),
            collections: self.collections.len(),
            ..Default::default()
        }
    }

    fn references(&self) -> Vec<Reference> {
        let mut refs = Vec::new();
        if let Some(section) = self.section {
            refs.push(Reference::new("section", EntityKind::Section, section));
        }
        refs.extend(references_from("articles", EntityKind::Article, &self.articles));
        refs.extend(references_from("videos", EntityKind::Article, &self.videos));
        refs.extend(references_from("collections", EntityKind::Collection, &self.collections));
        refs
    }

    fn validate(&self) -> Result<(), ValidationErrors> {
        validate_title(&self.title)
    }

    fn select(store: &ContentStore) -> &EntityStore<Self> {
        &store.sub_sections
    }
}
