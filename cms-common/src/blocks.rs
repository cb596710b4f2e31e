//! Web-page content blocks
//!
//! A web page is an ordered list of [`ContentBlock`]s, each tagged by its
//! `__component` name. Accordion groups own their child blocks in memory.
//!
//! The content API stores the list flat: a group carries a `group_id` and
//! each of its children follows as a top-level entry carrying a matching
//! `accordion_group_id`. [`flatten`] produces that shape on write and
//! [`nest`] rebuilds the tree on read; `nest(flatten(blocks)) == blocks`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::entities::UploadedFile;
use crate::validation::ValidationErrors;
use crate::{Error, Result};

/// One block of a web page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "__component")]
pub enum ContentBlock {
    #[serde(rename = "blocks.divider")]
    Divider,

    #[serde(rename = "blocks.image")]
    Image {
        image: UploadedFile,
        #[serde(default)]
        alt_text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        caption: Option<String>,
    },

    #[serde(rename = "blocks.quote")]
    Quote {
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        attribution: Option<String>,
    },

    #[serde(rename = "blocks.video")]
    Video {
        url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<String>,
    },

    #[serde(rename = "blocks.card")]
    Card {
        title: String,
        #[serde(default)]
        body: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        link: Option<String>,
    },

    #[serde(rename = "blocks.rich-text")]
    RichText { body: String },

    #[serde(rename = "blocks.accordion-group")]
    AccordionGroup {
        title: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        children: Vec<ContentBlock>,
    },
}

impl ContentBlock {
    /// `__component` tag of this block
    pub fn component(&self) -> &'static str {
        match self {
            ContentBlock::Divider => "blocks.divider",
            ContentBlock::Image { .. } => "blocks.image",
            ContentBlock::Quote { .. } => "blocks.quote",
            ContentBlock::Video { .. } => "blocks.video",
            ContentBlock::Card { .. } => "blocks.card",
            ContentBlock::RichText { .. } => "blocks.rich-text",
            ContentBlock::AccordionGroup { .. } => "blocks.accordion-group",
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self, ContentBlock::AccordionGroup { .. })
    }
}

/// Flat wire form of a block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatBlock {
    #[serde(flatten)]
    pub block: ContentBlock,

    /// Set on accordion groups
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,

    /// Set on children of an accordion group
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accordion_group_id: Option<String>,
}

impl FlatBlock {
    fn plain(block: ContentBlock) -> Self {
        Self {
            block,
            group_id: None,
            accordion_group_id: None,
        }
    }
}

/// Denormalize a block tree for the content API
///
/// Each group gets a fresh `group_id`; its children are emitted right after
/// it, in order, tagged with that id.
pub fn flatten(blocks: &[ContentBlock]) -> Vec<FlatBlock> {
    let mut flat = Vec::with_capacity(blocks.len());
    for block in blocks {
        match block {
            ContentBlock::AccordionGroup { title, children } => {
                let group_id = Uuid::new_v4().to_string();
                flat.push(FlatBlock {
                    block: ContentBlock::AccordionGroup {
                        title: title.clone(),
                        children: Vec::new(),
                    },
                    group_id: Some(group_id.clone()),
                    accordion_group_id: None,
                });
                for child in children {
                    flat.push(FlatBlock {
                        block: child.clone(),
                        group_id: None,
                        accordion_group_id: Some(group_id.clone()),
                    });
                }
            }
            other => flat.push(FlatBlock::plain(other.clone())),
        }
    }
    flat
}

/// Rebuild the block tree from the flat wire form
///
/// Children are attached to their group in the order they appear, wherever
/// they appear in the list. Fails on a child whose group is unknown, on a
/// group nested inside a group, and on duplicate group ids.
pub fn nest(flat: Vec<FlatBlock>) -> Result<Vec<ContentBlock>> {
    // Pass 1: position of every group among the top-level blocks
    let mut group_positions: HashMap<String, usize> = HashMap::new();
    let mut top_level = 0usize;
    for entry in &flat {
        if entry.accordion_group_id.is_some() {
            continue;
        }
        if let (true, Some(group_id)) = (entry.block.is_group(), &entry.group_id) {
            if group_positions.insert(group_id.clone(), top_level).is_some() {
                return Err(Error::InvalidInput(format!(
                    "Duplicate accordion group id: {}",
                    group_id
                )));
            }
        }
        top_level += 1;
    }

    // Pass 2: partition by back-reference
    let mut tree: Vec<ContentBlock> = Vec::with_capacity(top_level);
    let mut pending: Vec<(usize, ContentBlock)> = Vec::new();
    for entry in flat {
        match entry.accordion_group_id {
            None => tree.push(entry.block),
            Some(group_id) => {
                if entry.block.is_group() {
                    return Err(Error::InvalidInput(format!(
                        "Accordion group nested inside group {}",
                        group_id
                    )));
                }
                let position = *group_positions.get(&group_id).ok_or_else(|| {
                    Error::InvalidInput(format!("Unknown accordion group: {}", group_id))
                })?;
                pending.push((position, entry.block));
            }
        }
    }

    for (position, child) in pending {
        if let Some(ContentBlock::AccordionGroup { children, .. }) = tree.get_mut(position) {
            children.push(child);
        }
    }

    Ok(tree)
}

/// Validate a web page's blocks; paths are relative to the block list
pub fn validate_blocks(blocks: &[ContentBlock]) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    if blocks.is_empty() {
        errors.push("blocks", "A web page needs at least one block");
    }
    for (i, block) in blocks.iter().enumerate() {
        validate_block(&mut errors, &format!("blocks.{}", i), block, false);
    }
    errors
}

fn validate_block(errors: &mut ValidationErrors, path: &str, block: &ContentBlock, in_group: bool) {
    match block {
        ContentBlock::Divider => {}
        ContentBlock::Image { image, alt_text, .. } => {
            errors.require_url(format!("{}.image.url", path), &image.url);
            if !image.is_image() {
                errors.push(format!("{}.image.mime", path), "Must be an image");
            }
            errors.require_text(format!("{}.alt_text", path), alt_text);
        }
        ContentBlock::Quote { text, .. } => errors.require_text(format!("{}.text", path), text),
        ContentBlock::Video { url, .. } => errors.require_url(format!("{}.url", path), url),
        ContentBlock::Card { title, link, .. } => {
            errors.require_text(format!("{}.title", path), title);
            errors.optional_url(format!("{}.link", path), link.as_deref());
        }
        ContentBlock::RichText { body } => errors.require_text(format!("{}.body", path), body),
        ContentBlock::AccordionGroup { title, children } => {
            if in_group {
                errors.push(path, "Accordion groups cannot be nested");
                return;
            }
            errors.require_text(format!("{}.title", path), title);
            if children.is_empty() {
                errors.push(format!("{}.children", path), "An accordion group needs at least one item");
            }
            for (j, child) in children.iter().enumerate() {
                validate_block(errors, &format!("{}.children.{}", path, j), child, true);
            }
        }
    }
}
