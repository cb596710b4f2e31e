//! Articles and videos
//!
//! An article's required fields depend on its `content_type` tag. Each shape
//! is a variant of [`ArticleContent`] with its own validator; videos are
//! articles of the `video` shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{references_from, Entity, EntityKind, Reference, UploadedFile};
use crate::blocks::{self, ContentBlock, FlatBlock};
use crate::store::{ContentStore, EntityStore};
use crate::validation::ValidationErrors;
use crate::{ContentStatus, EntityId, Result};

const SUMMARY_MAX_CHARS: usize = 300;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    #[serde(default)]
    pub id: EntityId,
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub status: ContentStatus,
    #[serde(default)]
    pub thumbnail: Option<UploadedFile>,
    #[serde(default)]
    pub sections: Vec<EntityId>,
    #[serde(default)]
    pub sub_sections: Vec<EntityId>,
    #[serde(default)]
    pub collections: Vec<EntityId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub content: ArticleContent,
}

/// Content shape, selected by the `content_type` tag
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "content_type", rename_all = "snake_case")]
pub enum ArticleContent {
    Video {
        #[serde(default)]
        video_url: String,
        #[serde(default)]
        duration_seconds: Option<u32>,
        #[serde(default)]
        transcript: Option<String>,
    },
    NhsArticle {
        #[serde(default)]
        source_url: String,
        #[serde(default)]
        nhs_condition: Option<EntityId>,
        #[serde(default)]
        body: String,
    },
    WebPage {
        #[serde(default)]
        blocks: Vec<ContentBlock>,
    },
    ArticleCards {
        #[serde(default)]
        cards: Vec<ArticleCard>,
    },
}

/// One card of an `article_cards` deck
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleCard {
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub image: Option<UploadedFile>,
}

impl ArticleContent {
    pub fn content_type(&self) -> &'static str {
        match self {
            ArticleContent::Video { .. } => "video",
            ArticleContent::NhsArticle { .. } => "nhs_article",
            ArticleContent::WebPage { .. } => "web_page",
            ArticleContent::ArticleCards { .. } => "article_cards",
        }
    }

    pub fn is_video(&self) -> bool {
        matches!(self, ArticleContent::Video { .. })
    }

    fn validate(&self, errors: &mut ValidationErrors) {
        match self {
            ArticleContent::Video {
                video_url,
                duration_seconds,
                ..
            } => {
                errors.require_url("video_url", video_url);
                if *duration_seconds == Some(0) {
                    errors.push("duration_seconds", "Must be greater than zero");
                }
            }
            ArticleContent::NhsArticle { source_url, .. } => {
                errors.require_url("source_url", source_url);
            }
            ArticleContent::WebPage { blocks } => {
                let block_errors = blocks::validate_blocks(blocks);
                for err in block_errors.errors() {
                    errors.push(err.path.clone(), err.message.clone());
                }
            }
            ArticleContent::ArticleCards { cards } => {
                if cards.is_empty() {
                    errors.push("cards", "A card deck needs at least one card");
                }
                for (i, card) in cards.iter().enumerate() {
                    errors.require_text(format!("cards.{}.title", i), &card.title);
                    errors.require_text(format!("cards.{}.body", i), &card.body);
                }
            }
        }
    }
}

impl Article {
    pub fn new(title: impl Into<String>, content: ArticleContent) -> Self {
        Self {
            id: EntityId::NEW,
            title: title.into(),
            summary: String::new(),
            category: None,
            status: ContentStatus::Draft,
            thumbnail: None,
            sections: Vec::new(),
            sub_sections: Vec::new(),
            collections: Vec::new(),
            created_at: None,
            updated_at: None,
            content,
        }
    }

    pub fn is_video(&self) -> bool {
        self.content.is_video()
    }
}

impl Entity for Article {
    const KIND: EntityKind = EntityKind::Article;

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

    fn references(&self) -> Vec<Reference> {
        let mut refs = references_from("sections", EntityKind::Section, &self.sections);
        refs.extend(references_from("sub_sections", EntityKind::SubSection, &self.sub_sections));
        refs.extend(references_from("collections", EntityKind::Collection, &self.collections));
        if let ArticleContent::NhsArticle {
            nhs_condition: Some(id),
            ..
        } = &self.content
        {
            refs.push(Reference::new("nhs_condition", EntityKind::Condition, *id));
        }
        refs
    }

    fn normalize(&mut self) {
        self.title = self.title.trim().to_string();
        if matches!(&self.category, Some(c) if c.trim().is_empty()) {
            self.category = None;
        }
    }

    fn validate(&self) -> std::result::Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require_text("title", &self.title);
        if self.summary.chars().count() > SUMMARY_MAX_CHARS {
            errors.push(
                "summary",
                format!("At most {} characters", SUMMARY_MAX_CHARS),
            );
        }
        self.content.validate(&mut errors);
        errors.into_result()
    }

    /// Web-page blocks travel flat; every other shape is sent as-is
    fn to_wire(&self) -> Result<Value> {
        let mut value = serde_json::to_value(self)?;
        if let ArticleContent::WebPage { blocks } = &self.content {
            value["blocks"] = serde_json::to_value(blocks::flatten(blocks))?;
        }
        Ok(value)
    }

    fn from_wire(mut value: Value) -> Result<Self> {
        if value.get("content_type").and_then(Value::as_str) == Some("web_page") {
            if let Some(raw) = value.get_mut("blocks").map(Value::take) {
                let flat: Vec<FlatBlock> = if raw.is_null() {
                    Vec::new()
                } else {
                    serde_json::from_value(raw)?
                };
                value["blocks"] = serde_json::to_value(blocks::nest(flat)?)?;
            }
        }
        Ok(serde_json::from_value(value)?)
    }

    fn select(store: &ContentStore) -> &EntityStore<Self> {
        &store.articles
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn video(url: &str) -> Article {
        Article::new(
            "Breathing exercises",
            ArticleContent::Video {
                video_url: url.to_string(),
                duration_seconds: Some(95),
                transcript: None,
            },
        )
    }

    #[test]
    fn test_content_type_tag_selects_shape() {
        let article: Article = serde_json::from_value(json!({
            "id": 5,
            "title": "Sleep",
            "status": "published",
            "content_type": "nhs_article",
            "source_url": "https://www.nhs.uk/live-well/sleep-and-tiredness/"
        }))
        .unwrap();
        assert_eq!(article.id, EntityId(5));
        assert_eq!(article.content.content_type(), "nhs_article");
        assert!(article.validate().is_ok());
    }

    #[test]
    fn test_video_requires_url() {
        let errors = video("").validate().unwrap_err();
        assert!(errors.has("video_url"));
        assert!(video("https://cdn.example.org/v.mp4").validate().is_ok());
    }

    #[test]
    fn test_is_video_follows_content_shape() {
        assert!(video("https://cdn.example.org/v.mp4").is_video());
        let page = Article::new("x", ArticleContent::WebPage { blocks: vec![] });
        assert!(!page.is_video());
    }

    #[test]
    fn test_each_shape_has_its_own_required_fields() {
        let nhs = Article::new(
            "x",
            ArticleContent::NhsArticle {
                source_url: String::new(),
                nhs_condition: None,
                body: String::new(),
            },
        );
        assert!(nhs.validate().unwrap_err().has("source_url"));

        let page = Article::new("x", ArticleContent::WebPage { blocks: vec![] });
        assert!(page.validate().unwrap_err().has("blocks"));

        let deck = Article::new(
            "x",
            ArticleContent::ArticleCards {
                cards: vec![ArticleCard {
                    title: "One".into(),
                    body: "".into(),
                    image: None,
                }],
            },
        );
        let errors = deck.validate().unwrap_err();
        assert!(errors.has("cards.0.body"));
        assert!(!errors.has("cards.0.title"));
    }

    #[test]
    fn test_missing_title_reported_with_shape_errors() {
        let mut article = video("");
        article.title = "  ".into();
        let errors = article.validate().unwrap_err();
        assert!(errors.has("title"));
        assert!(errors.has("video_url"));
    }

    #[test]
    fn test_references_include_condition() {
        let mut article = Article::new(
            "x",
            ArticleContent::NhsArticle {
                source_url: "https://www.nhs.uk/a".into(),
                nhs_condition: Some(EntityId(77)),
                body: String::new(),
            },
        );
        article.sections = vec![EntityId(1)];
        let refs = article.references();
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[1].kind, EntityKind::Condition);
    }

    #[test]
    fn test_web_page_wire_is_flat() {
        let article = Article::new(
            "Page",
            ArticleContent::WebPage {
                blocks: vec![ContentBlock::AccordionGroup {
                    title: "FAQ".into(),
                    children: vec![ContentBlock::RichText { body: "a".into() }],
                }],
            },
        );
        let wire = article.to_wire().unwrap();
        let blocks = wire["blocks"].as_array().unwrap();
        assert_eq!(blocks.len(), 2);
        assert!(blocks[0]["group_id"].is_string());
        assert_eq!(blocks[1]["accordion_group_id"], blocks[0]["group_id"]);

        let back = Article::from_wire(wire).unwrap();
        assert_eq!(back, article);
    }
}
