//! Catalog item model
//!
//! Items are fetched on demand and never mutated once retrieved.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Length of every catalog item identifier
pub const ITEM_ID_LEN: usize = 32;

/// A catalog item identifier: exactly 32 ASCII alphanumeric characters
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ItemId(String);

/// Returned when a string does not have the identifier shape
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{0}' is not a 32-character alphanumeric item id")]
pub struct InvalidItemId(pub String);

impl ItemId {
    /// Parses an identifier, rejecting anything that is not 32 alphanumerics
    pub fn parse(raw: &str) -> Result<Self, InvalidItemId> {
        if raw.len() == ITEM_ID_LEN && raw.bytes().all(|b| b.is_ascii_alphanumeric()) {
            Ok(Self(raw.to_string()))
        } else {
            Err(InvalidItemId(raw.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ItemId {
    type Error = InvalidItemId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ItemId> for String {
    fn from(id: ItemId) -> Self {
        id.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Item metadata as returned by the portal's item endpoint
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: ItemId,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub owner: String,

    /// Sharing level (private, shared, org, public)
    #[serde(default)]
    pub access: String,

    #[serde(rename = "type", default)]
    pub item_type: String,

    #[serde(default)]
    pub type_keywords: Vec<String>,

    #[serde(default)]
    pub org_id: Option<String>,

    /// Creation time in epoch milliseconds
    #[serde(default)]
    pub created: Option<i64>,
}

impl Item {
    /// Builds an item with empty owner, access and keywords
    pub fn new(id: ItemId, title: impl Into<String>, item_type: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            owner: String::new(),
            access: String::new(),
            item_type: item_type.into(),
            type_keywords: Vec::new(),
            org_id: None,
            created: None,
        }
    }

    pub fn has_keyword(&self, keyword: &str) -> bool {
        self.type_keywords.iter().any(|k| k == keyword)
    }

    /// True for item types whose content lives in draft/published resources
    pub fn has_dual_resources(&self) -> bool {
        DUAL_RESOURCE_TYPES.contains(&self.item_type.as_str())
    }
}

/// Item types that keep their content as draft and published resources
pub const DUAL_RESOURCE_TYPES: &[&str] = &["StoryMap", "StoryMap Theme"];

/// The reference-bearing payloads of an item
///
/// `secondary` is only ever present for dual-resource item types, where it
/// holds the published copy next to the draft in `primary`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemPayloads {
    pub primary: Option<Value>,
    pub secondary: Option<Value>,
}

impl ItemPayloads {
    pub fn primary(value: Value) -> Self {
        Self {
            primary: Some(value),
            secondary: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.primary.is_none() && self.secondary.is_none()
    }
}
