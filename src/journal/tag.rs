//! Tags used to categorize and filter journal entries.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

/// Identifier of a tag (UUID v4)
pub type TagId = String;

/// Default tag color (hex)
pub const DEFAULT_TAG_COLOR: &str = "#3b82f6";

/// A user-defined tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    /// Unique identifier
    pub id: TagId,
    /// Display name
    pub name: String,
    /// Hex color code, e.g. `#3b82f6`
    pub color: String,
}

impl Tag {
    /// Create a tag with the default color
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(Error::ValidationFailed("tag name cannot be empty".into()));
        }
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            name,
            color: DEFAULT_TAG_COLOR.to_string(),
        })
    }

    /// Create a tag with an explicit color
    pub fn with_color(name: impl Into<String>, color: impl Into<String>) -> Result<Self> {
        let mut tag = Self::new(name)?;
        tag.color = color.into();
        Ok(tag)
    }
}
