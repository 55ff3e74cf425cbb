use ms_core::ids::EntryId;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LibraryError {
    /// The candidate has the same content as an entry already present.
    #[error("duplicate of entry {existing_id} ({reason})")]
    DuplicateEntry {
        existing_id: EntryId,
        reason: &'static str,
    },

    /// The candidate carries an id already used by another entry.
    #[error("entry id already in use: {0}")]
    IdConflict(EntryId),

    #[error("entry not found: {0}")]
    NotFound(EntryId),
}
