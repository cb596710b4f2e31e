use serde::{Deserialize, Serialize};

use crate::EntityId;

/// Metadata returned by the content API's upload endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
    pub id: EntityId,
    pub url: String,
    pub mime: String,
    pub name: String,
    pub size: u64,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
}

impl UploadedFile {
    pub fn is_image(&self) -> bool {
        self.mime.starts_with("image/")
    }
}
