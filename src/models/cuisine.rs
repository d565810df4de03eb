//! Cuisine type registry keyed by lowercase name.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Emoji used for cuisines registered on the fly.
pub const DEFAULT_EMOJI: &str = "🍽️";

/// Display data for one cuisine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CuisineType {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default = "default_emoji")]
    pub emoji: String,
}

fn default_emoji() -> String {
    DEFAULT_EMOJI.to_string()
}

impl CuisineType {
    pub fn new(emoji: impl Into<String>) -> Self {
        Self {
            color: Some("primary".to_string()),
            emoji: emoji.into(),
        }
    }

    /// Label shown next to the key, e.g. `🍕 italien`.
    pub fn label(&self, key: &str) -> String {
        format!("{} {}", self.emoji, key)
    }
}

/// Mapping from normalized cuisine key to its display data.
pub type CuisineTypes = BTreeMap<String, CuisineType>;

/// Lowercase and trim a user-typed cuisine name.
pub fn normalize_cuisine(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// The four cuisines a fresh notebook starts with.
pub fn default_cuisine_types() -> CuisineTypes {
    [
        ("français", "🥖"),
        ("italien", "🍕"),
        ("asiatique", "🍜"),
        ("japonais", "🍣"),
    ]
    .into_iter()
    .map(|(key, emoji)| (key.to_string(), CuisineType::new(emoji)))
    .collect()
}
