//! Restaurant entry model matching the stored JSON entry shape.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::SyncError;

/// Lowest and highest accepted sub-rating.
pub const RATING_MIN: f64 = 1.0;
pub const RATING_MAX: f64 = 5.0;

/// Weights applied to the sub-ratings, in `plats, vins, accueil, lieu` order.
const WEIGHTS: [f64; 4] = [2.0, 1.5, 1.5, 1.0];

/// Which list an entry lives in.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ListKind {
    Tested,
    Wishlist,
}

impl ListKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListKind::Tested => "tested",
            ListKind::Wishlist => "wishlist",
        }
    }

    pub fn other(&self) -> Self {
        match self {
            ListKind::Tested => ListKind::Wishlist,
            ListKind::Wishlist => ListKind::Tested,
        }
    }
}

impl std::fmt::Display for ListKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque entry identifier. Older documents use millisecond timestamps,
/// some hand-edited ones use strings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(untagged)]
pub enum EntryId {
    Number(i64),
    Text(String),
}

impl std::fmt::Display for EntryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntryId::Number(n) => write!(f, "{}", n),
            EntryId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for EntryId {
    fn from(id: i64) -> Self {
        EntryId::Number(id)
    }
}

impl From<&str> for EntryId {
    fn from(id: &str) -> Self {
        EntryId::Text(id.to_string())
    }
}

/// Geocoded position of a restaurant.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// The four sub-ratings of a tested restaurant, on a half-step 1–5 scale.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Ratings {
    pub plats: f64,
    pub vins: f64,
    pub accueil: f64,
    pub lieu: f64,
}

impl Ratings {
    pub fn new(plats: f64, vins: f64, accueil: f64, lieu: f64) -> Self {
        Self {
            plats,
            vins,
            accueil,
            lieu,
        }
    }

    /// Weighted rating: dishes count double, wine and welcome one and a half.
    pub fn weighted(&self) -> f64 {
        let values = [self.plats, self.vins, self.accueil, self.lieu];
        let total: f64 = values.iter().zip(WEIGHTS).map(|(v, w)| v * w).sum();
        total / WEIGHTS.iter().sum::<f64>()
    }

    /// Check every sub-rating is within range and on a half step.
    pub fn validate(&self) -> Result<(), SyncError> {
        for (name, value) in [
            ("plats", self.plats),
            ("vins", self.vins),
            ("accueil", self.accueil),
            ("lieu", self.lieu),
        ] {
            if !(RATING_MIN..=RATING_MAX).contains(&value) {
                return Err(SyncError::Validation(format!(
                    "rating '{}' must be between {} and {}, got {}",
                    name, RATING_MIN, RATING_MAX, value
                )));
            }
            if (value * 2.0).fract() != 0.0 {
                return Err(SyncError::Validation(format!(
                    "rating '{}' must be a multiple of 0.5, got {}",
                    name, value
                )));
            }
        }
        Ok(())
    }
}

impl Default for Ratings {
    fn default() -> Self {
        Self::new(RATING_MAX, RATING_MAX, RATING_MAX, RATING_MAX)
    }
}

/// One restaurant, tested or wishlisted.
///
/// Tested entries carry `ratings` and `date_visited`; wishlist entries may carry
/// a `reason`. Fields this crate does not know about are kept in `extra` so they
/// survive a load/save cycle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    pub id: EntryId,
    pub name: String,
    #[serde(rename = "type", default)]
    pub cuisine: String,
    #[serde(default)]
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_range: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default)]
    pub date_added: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ratings: Option<Ratings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_visited: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Entry {
    /// Weighted rating, if this entry has been rated.
    pub fn weighted_rating(&self) -> Option<f64> {
        self.ratings.as_ref().map(Ratings::weighted)
    }

    /// Drop the fields that do not belong in `kind`.
    pub fn normalize_for(&mut self, kind: ListKind) {
        match kind {
            ListKind::Tested => {
                self.reason = None;
                if self.date_visited.is_none() {
                    self.date_visited = Some(self.date_added.clone());
                }
            }
            ListKind::Wishlist => {
                self.ratings = None;
                self.date_visited = None;
            }
        }
    }

    /// Validate an entry for insertion into `kind`.
    pub fn validate_for(&self, kind: ListKind) -> Result<(), SyncError> {
        if self.name.trim().is_empty() {
            return Err(SyncError::Validation("name is required".to_string()));
        }
        match (kind, &self.ratings) {
            (ListKind::Tested, None) => Err(SyncError::Validation(format!(
                "tested entry '{}' needs all four ratings",
                self.name
            ))),
            (ListKind::Tested, Some(ratings)) => ratings.validate(),
            (ListKind::Wishlist, Some(_)) => Err(SyncError::Validation(format!(
                "wishlist entry '{}' cannot carry ratings",
                self.name
            ))),
            (ListKind::Wishlist, None) => Ok(()),
        }
    }
}

/// Fields supplied by the caller when adding a restaurant. The coordinator
/// assigns the identifier and the dates.
#[derive(Debug, Clone, Default)]
pub struct EntryDraft {
    pub name: String,
    pub cuisine: String,
    pub location: String,
    pub address: Option<String>,
    pub coordinates: Option<Coordinates>,
    pub price_range: Option<String>,
    pub photo: Option<String>,
    pub comment: Option<String>,
    pub ratings: Option<Ratings>,
    pub reason: Option<String>,
}

impl EntryDraft {
    pub fn new(name: impl Into<String>, cuisine: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cuisine: cuisine.into(),
            ..Default::default()
        }
    }

    pub fn into_entry(self, id: EntryId, kind: ListKind, today: &str) -> Entry {
        let mut entry = Entry {
            id,
            name: self.name.trim().to_string(),
            cuisine: self.cuisine,
            location: self.location,
            address: self.address,
            coordinates: self.coordinates,
            price_range: self.price_range,
            photo: self.photo,
            comment: self.comment,
            date_added: today.to_string(),
            ratings: self.ratings,
            date_visited: None,
            reason: self.reason,
            extra: Map::new(),
        };
        entry.normalize_for(kind);
        entry
    }
}
