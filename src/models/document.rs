//! The notebook document: the single unit of persistence.

use std::collections::HashSet;

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{
    default_cuisine_types, normalize_cuisine, Coordinates, CuisineType, CuisineTypes, Entry,
    EntryId, ListKind, Ratings, DEFAULT_EMOJI,
};
use crate::errors::SyncError;

/// Schema version written into `metadata.version`.
pub const DOCUMENT_VERSION: &str = "1.0";

/// Opaque token identifying one stored version of the remote document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct RevisionToken(pub String);

impl RevisionToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RevisionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Descriptive header some notebooks carry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct NotebookInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// Bookkeeping refreshed on every save.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_entries: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_by: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Counts and average rating shown in the header of the notebook.
#[derive(Debug, Clone, PartialEq)]
pub struct NotebookStats {
    pub tested: usize,
    pub wishlist: usize,
    pub average_rating: Option<f64>,
}

/// The complete notebook: both lists, the cuisine registry and metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<NotebookInfo>,
    #[serde(default)]
    pub cuisine_types: CuisineTypes,
    #[serde(default)]
    pub tested: Vec<Entry>,
    #[serde(default)]
    pub wishlist: Vec<Entry>,
    #[serde(default)]
    pub metadata: Metadata,
}

impl Document {
    /// Sample notebook used when neither the remote store nor the cache has data.
    pub fn seed() -> Self {
        let tested = Entry {
            id: EntryId::Number(1),
            name: "Le Comptoir du Relais".to_string(),
            cuisine: "français".to_string(),
            location: "6ème arrondissement".to_string(),
            address: Some("9 Carrefour de l'Odéon, 75006 Paris".to_string()),
            coordinates: Some(Coordinates {
                lat: 48.8534,
                lng: 2.3387,
            }),
            price_range: Some("€€".to_string()),
            photo: None,
            comment: Some("Bistrot authentique avec une cuisine excellente !".to_string()),
            date_added: "2024-12-15".to_string(),
            ratings: Some(Ratings::new(4.5, 4.0, 4.5, 4.0)),
            date_visited: Some("2024-12-15".to_string()),
            reason: None,
            extra: Map::new(),
        };
        let wishlist = Entry {
            id: EntryId::Number(4),
            name: "L'Ami Jean".to_string(),
            cuisine: "français".to_string(),
            location: "7ème arrondissement".to_string(),
            address: Some("27 rue Malar, 75007 Paris".to_string()),
            coordinates: Some(Coordinates {
                lat: 48.8584,
                lng: 2.3019,
            }),
            price_range: Some("€€€".to_string()),
            photo: None,
            comment: None,
            date_added: "2024-12-01".to_string(),
            ratings: None,
            date_visited: None,
            reason: Some("Recommandé par un ami pour la cuisine basque".to_string()),
            extra: Map::new(),
        };

        Self {
            config: None,
            cuisine_types: default_cuisine_types(),
            tested: vec![tested],
            wishlist: vec![wishlist],
            metadata: Metadata {
                version: Some(DOCUMENT_VERSION.to_string()),
                total_entries: Some(2),
                ..Default::default()
            },
        }
    }

    /// Empty notebook with the default cuisines, written when the remote file is missing.
    pub fn empty() -> Self {
        Self {
            cuisine_types: default_cuisine_types(),
            metadata: Metadata {
                version: Some(DOCUMENT_VERSION.to_string()),
                total_entries: Some(0),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    pub fn list(&self, kind: ListKind) -> &[Entry] {
        match kind {
            ListKind::Tested => &self.tested,
            ListKind::Wishlist => &self.wishlist,
        }
    }

    pub fn list_mut(&mut self, kind: ListKind) -> &mut Vec<Entry> {
        match kind {
            ListKind::Tested => &mut self.tested,
            ListKind::Wishlist => &mut self.wishlist,
        }
    }

    /// Locate an entry in either list.
    pub fn find(&self, id: &EntryId) -> Option<(ListKind, &Entry)> {
        [ListKind::Tested, ListKind::Wishlist]
            .into_iter()
            .find_map(|kind| self.list(kind).iter().find(|e| &e.id == id).map(|e| (kind, e)))
    }

    pub fn contains_id(&self, id: &EntryId) -> bool {
        self.find(id).is_some()
    }

    /// Position of `id` within `kind`.
    pub fn position(&self, kind: ListKind, id: &EntryId) -> Option<usize> {
        self.list(kind).iter().position(|e| &e.id == id)
    }

    pub fn total_entries(&self) -> usize {
        self.tested.len() + self.wishlist.len()
    }

    /// Normalize a cuisine name and register it if unknown. Returns the key.
    pub fn ensure_cuisine(&mut self, raw: &str) -> String {
        let key = normalize_cuisine(raw);
        if !key.is_empty() && !self.cuisine_types.contains_key(&key) {
            tracing::debug!("Registering new cuisine type '{}'", key);
            self.cuisine_types
                .insert(key.clone(), CuisineType::new(DEFAULT_EMOJI));
        }
        key
    }

    /// Check identifier uniqueness across both lists.
    pub fn validate(&self) -> Result<(), SyncError> {
        let mut seen = HashSet::new();
        for kind in [ListKind::Tested, ListKind::Wishlist] {
            for entry in self.list(kind) {
                if !seen.insert(&entry.id) {
                    return Err(SyncError::Validation(format!(
                        "entry id {} appears more than once",
                        entry.id
                    )));
                }
            }
        }
        Ok(())
    }

    /// Refresh metadata before a save.
    pub fn touch(&mut self, editor: Option<&str>) {
        self.metadata.last_updated = Some(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true));
        self.metadata.version = Some(DOCUMENT_VERSION.to_string());
        self.metadata.total_entries = Some(self.total_entries());
        if let Some(editor) = editor {
            self.metadata.updated_by = Some(editor.to_string());
        }
    }

    pub fn stats(&self) -> NotebookStats {
        let ratings: Vec<f64> = self
            .tested
            .iter()
            .filter_map(Entry::weighted_rating)
            .collect();
        let average_rating = if ratings.is_empty() {
            None
        } else {
            Some(ratings.iter().sum::<f64>() / ratings.len() as f64)
        };

        NotebookStats {
            tested: self.tested.len(),
            wishlist: self.wishlist.len(),
            average_rating,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EntryDraft;

    #[test]
    fn test_seed_is_valid() {
        let doc = Document::seed();
        assert!(doc.validate().is_ok());
        assert_eq!(doc.total_entries(), 2);
        assert_eq!(doc.cuisine_types.len(), 4);
    }

    #[test]
    fn test_validate_rejects_id_in_both_lists() {
        let mut doc = Document::seed();
        let mut copy = doc.tested[0].clone();
        copy.normalize_for(ListKind::Wishlist);
        doc.wishlist.push(copy);
        assert!(matches!(doc.validate(), Err(SyncError::Validation(_))));
    }

    #[test]
    fn test_ensure_cuisine_registers_unknown_keys() {
        let mut doc = Document::empty();
        assert_eq!(doc.ensure_cuisine(" Libanais"), "libanais");
        assert_eq!(doc.cuisine_types["libanais"].emoji, DEFAULT_EMOJI);
        assert_eq!(doc.ensure_cuisine("ITALIEN"), "italien");
        assert_eq!(doc.cuisine_types["italien"].emoji, "🍕");
    }

    #[test]
    fn test_stats_average_weighted_rating() {
        let mut doc = Document::empty();
        assert_eq!(doc.stats().average_rating, None);

        let mut draft = EntryDraft::new("Le Bistrot", "français");
        draft.ratings = Some(Ratings::new(5.0, 4.0, 4.0, 3.0));
        doc.tested
            .push(draft.into_entry(EntryId::Number(10), ListKind::Tested, "2025-01-10"));

        let stats = doc.stats();
        assert_eq!(stats.tested, 1);
        assert!((stats.average_rating.unwrap() - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_touch_updates_metadata() {
        let mut doc = Document::seed();
        doc.touch(Some("gianni"));
        assert_eq!(doc.metadata.total_entries, Some(2));
        assert_eq!(doc.metadata.updated_by.as_deref(), Some("gianni"));
        assert!(doc.metadata.last_updated.is_some());
    }
}
