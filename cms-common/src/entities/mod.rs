//! Content entity models
//!
//! Each flat entity type implements [`Entity`], which gives the store, the
//! listing engine and the admin service one uniform handle on ids, status,
//! child containment, foreign keys, validation and the backend wire format.

mod article;
mod media;
mod nhs;
mod pack;
mod quiz;
mod taxonomy;
mod tip;

pub use article::{Article, ArticleCard, ArticleContent};
pub use media::UploadedFile;
pub use nhs::{NhsCondition, NhsMedicine};
pub use pack::Pack;
pub use quiz::{Quiz, QuizAnswer, QuizType};
pub use taxonomy::{Collection, Section, SubSection};
pub use tip::Tip;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::store::{ContentStore, EntityStore};
use crate::validation::ValidationErrors;
use crate::{ContentStatus, EntityId, Error, Result};

/// Entity types served by the content API
///
/// Serialized as the API path segment (`sub-sections`, `quizzes`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    #[serde(rename = "articles")]
    Article,
    #[serde(rename = "collections")]
    Collection,
    #[serde(rename = "sections")]
    Section,
    #[serde(rename = "sub-sections")]
    SubSection,
    #[serde(rename = "tips")]
    Tip,
    #[serde(rename = "quizzes")]
    Quiz,
    #[serde(rename = "packs")]
    Pack,
    #[serde(rename = "conditions")]
    Condition,
    #[serde(rename = "medicines")]
    Medicine,
    #[serde(rename = "journeys")]
    Journey,
}

impl EntityKind {
    pub const ALL: [EntityKind; 10] = [
        EntityKind::Article,
        EntityKind::Collection,
        EntityKind::Section,
        EntityKind::SubSection,
        EntityKind::Tip,
        EntityKind::Quiz,
        EntityKind::Pack,
        EntityKind::Condition,
        EntityKind::Medicine,
        EntityKind::Journey,
    ];

    /// Path segment used by both the content API and the admin API
    pub fn path(self) -> &'static str {
        match self {
            EntityKind::Article => "articles",
            EntityKind::Collection => "collections",
            EntityKind::Section => "sections",
            EntityKind::SubSection => "sub-sections",
            EntityKind::Tip => "tips",
            EntityKind::Quiz => "quizzes",
            EntityKind::Pack => "packs",
            EntityKind::Condition => "conditions",
            EntityKind::Medicine => "medicines",
            EntityKind::Journey => "journeys",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

impl FromStr for EntityKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        EntityKind::ALL
            .into_iter()
            .find(|kind| kind.path() == s)
            .ok_or_else(|| Error::NotFound(format!("Unknown content type: {}", s)))
    }
}

/// Counts of child content held by a container entity
///
/// Containers may only be deleted while every count is zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ChildRefs {
    pub articles: usize,
    pub videos: usize,
    pub collections: usize,
    pub sub_sections: usize,
}

impl ChildRefs {
    pub fn is_empty(&self) -> bool {
        self.articles == 0 && self.videos == 0 && self.collections == 0 && self.sub_sections == 0
    }
}

/// Foreign key held by an entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    /// Form field holding the key, e.g. `sections.0`
    pub field: String,
    pub kind: EntityKind,
    pub id: EntityId,
}

impl Reference {
    pub fn new(field: impl Into<String>, kind: EntityKind, id: EntityId) -> Self {
        Self {
            field: field.into(),
            kind,
            id,
        }
    }
}

/// Collect references for every id in `ids` under `field.<index>`
pub(crate) fn references_from(field: &str, kind: EntityKind, ids: &[EntityId]) -> Vec<Reference> {
    ids.iter()
        .enumerate()
        .map(|(i, id)| Reference::new(format!("{}.{}", field, i), kind, *id))
        .collect()
}

/// Common behaviour of every stored content type
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const KIND: EntityKind;

    fn id(&self) -> EntityId;

    fn set_id(&mut self, id: EntityId);

    /// Display label used in tables and dialogs
    fn label(&self) -> &str;

    /// Moderation status, `None` for types outside the publishing workflow
    fn status(&self) -> Option<ContentStatus>;

    fn set_status(&mut self, _status: ContentStatus) {}

    fn category(&self) -> Option<&str> {
        None
    }

    fn created_at(&self) -> Option<DateTime<Utc>> {
        None
    }

    /// Child content blocking deletion
    fn child_refs(&self) -> ChildRefs {
        ChildRefs::default()
    }

    /// Foreign keys to other entities
    fn references(&self) -> Vec<Reference> {
        Vec::new()
    }

    /// Canonicalize form state before validation (e.g. drop fields the
    /// current shape does not use)
    fn normalize(&mut self) {}

    /// Form validation
    fn validate(&self) -> std::result::Result<(), ValidationErrors> {
        Ok(())
    }

    /// Encode for the content API
    fn to_wire(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }

    /// Decode a content API payload
    fn from_wire(value: Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// The store holding this entity type
    fn select(store: &ContentStore) -> &EntityStore<Self>;
}
