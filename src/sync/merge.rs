//! Merge-by-identifier of a local and a remote document.

use crate::models::{Document, ListKind};

/// Merge `local` into `remote`.
///
/// The remote copy wins for every identifier it contains, in either list.
/// Local entries whose identifier the remote does not know are appended to
/// their list in local order. Cuisine types are unioned with the remote
/// definition taking precedence.
pub fn merge_documents(local: &Document, remote: &Document) -> Document {
    let mut merged = remote.clone();

    for kind in [ListKind::Tested, ListKind::Wishlist] {
        for entry in local.list(kind) {
            if !remote.contains_id(&entry.id) {
                merged.list_mut(kind).push(entry.clone());
            }
        }
    }

    for (key, cuisine) in &local.cuisine_types {
        merged
            .cuisine_types
            .entry(key.clone())
            .or_insert_with(|| cuisine.clone());
    }

    if merged.config.is_none() {
        merged.config = local.config.clone();
    }

    merged
}
