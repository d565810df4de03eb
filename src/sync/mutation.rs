//! Edits a user can make to the notebook.

use crate::errors::SyncError;
use crate::models::{Document, Entry, EntryId, ListKind, Ratings};

/// One user edit, kept as a value so it can be re-applied on top of a
/// freshly merged document after a conflict.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    Add {
        kind: ListKind,
        entry: Entry,
    },
    Update {
        kind: ListKind,
        entry: Entry,
    },
    Delete {
        kind: ListKind,
        id: EntryId,
    },
    /// Rate a wishlist entry and move it to the tested list.
    MoveToTested {
        id: EntryId,
        ratings: Ratings,
        comment: Option<String>,
        visited_on: String,
    },
}

impl Mutation {
    /// Identifier of the entry this mutation targets.
    pub fn target(&self) -> &EntryId {
        match self {
            Mutation::Add { entry, .. } | Mutation::Update { entry, .. } => &entry.id,
            Mutation::Delete { id, .. } | Mutation::MoveToTested { id, .. } => id,
        }
    }

    /// Apply to `document`, failing if the target is missing or invalid.
    pub fn apply(&self, document: &mut Document) -> Result<(), SyncError> {
        match self {
            Mutation::Add { kind, entry } => {
                if document.contains_id(&entry.id) {
                    return Err(SyncError::Validation(format!(
                        "an entry with id {} already exists",
                        entry.id
                    )));
                }
                let entry = prepare(document, *kind, entry.clone())?;
                document.list_mut(*kind).push(entry);
            }
            Mutation::Update { kind, entry } => {
                let index = locate(document, *kind, &entry.id)?;
                let mut entry = entry.clone();
                if entry.date_added.is_empty() {
                    entry.date_added = document.list(*kind)[index].date_added.clone();
                }
                let entry = prepare(document, *kind, entry)?;
                document.list_mut(*kind)[index] = entry;
            }
            Mutation::Delete { kind, id } => {
                let index = locate(document, *kind, id)?;
                document.list_mut(*kind).remove(index);
            }
            Mutation::MoveToTested {
                id,
                ratings,
                comment,
                visited_on,
            } => {
                ratings.validate()?;
                let index = locate(document, ListKind::Wishlist, id)?;
                let entry = document.wishlist.remove(index);
                document.tested.push(rated(entry, ratings, comment, visited_on));
            }
        }
        Ok(())
    }

    /// Re-apply after a merge. Targets that disappeared remotely are skipped;
    /// targets the merge brought back are overwritten with the local edit.
    pub fn replay(&self, document: &mut Document) {
        match self {
            Mutation::Add { kind, entry } => {
                if !document.contains_id(&entry.id) {
                    let mut entry = entry.clone();
                    entry.cuisine = document.ensure_cuisine(&entry.cuisine);
                    document.list_mut(*kind).push(entry);
                }
            }
            Mutation::Update { kind, entry } => {
                if let Some(index) = document.position(*kind, &entry.id) {
                    let mut entry = entry.clone();
                    entry.cuisine = document.ensure_cuisine(&entry.cuisine);
                    document.list_mut(*kind)[index] = entry;
                } else {
                    tracing::info!("Entry {} was removed remotely; dropping local edit", entry.id);
                }
            }
            Mutation::Delete { kind, id } => {
                if let Some(index) = document.position(*kind, id) {
                    document.list_mut(*kind).remove(index);
                }
            }
            Mutation::MoveToTested {
                id,
                ratings,
                comment,
                visited_on,
            } => {
                if let Some(index) = document.position(ListKind::Wishlist, id) {
                    let entry = document.wishlist.remove(index);
                    if document.position(ListKind::Tested, id).is_none() {
                        document.tested.push(rated(entry, ratings, comment, visited_on));
                    }
                }
            }
        }
    }
}

fn locate(document: &Document, kind: ListKind, id: &EntryId) -> Result<usize, SyncError> {
    document
        .position(kind, id)
        .ok_or_else(|| SyncError::Validation(format!("no {} entry with id {}", kind, id)))
}

/// Normalize and validate an entry for `kind`, registering its cuisine.
fn prepare(document: &mut Document, kind: ListKind, mut entry: Entry) -> Result<Entry, SyncError> {
    entry.normalize_for(kind);
    entry.validate_for(kind)?;
    entry.cuisine = document.ensure_cuisine(&entry.cuisine);
    Ok(entry)
}

fn rated(mut entry: Entry, ratings: &Ratings, comment: &Option<String>, visited_on: &str) -> Entry {
    entry.ratings = Some(*ratings);
    entry.date_visited = Some(visited_on.to_string());
    if let Some(comment) = comment.as_ref().filter(|c| !c.trim().is_empty()) {
        entry.comment = Some(comment.clone());
    }
    entry.reason = None;
    entry
}
