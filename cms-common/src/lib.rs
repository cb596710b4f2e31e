//! # CMS Common Library
//!
//! Shared code for the content admin console:
//! - Entity models and their form validation
//! - Journey tree editor
//! - Publishing workflow and bulk-action rules
//! - Web-page content blocks
//! - Table listing (search, filters, sort, pagination)
//! - Authoritative in-memory stores and the change event bus
//! - Configuration loading

pub mod blocks;
pub mod bulk;
pub mod config;
pub mod entities;
pub mod error;
pub mod events;
pub mod ids;
pub mod journey;
pub mod listing;
pub mod store;
pub mod validation;
pub mod workflow;

pub use error::{Error, Result};
pub use ids::{EntityId, NodeId};
pub use store::{ContentStore, EntityStore};
pub use workflow::{ContentStatus, Role, StatusAction};
