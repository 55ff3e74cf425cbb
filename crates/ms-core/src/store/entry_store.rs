use thiserror::Error;

use crate::entry::{normalize_tags, CategoryFilter, Entry};
use crate::ids::EntryId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EntryStoreError {
    #[error("entry id already present: {0}")]
    DuplicateId(EntryId),
}

/// Authoritative ordered sequence of entries for the running session.
///
/// A pure container: it performs no I/O and never consults the
/// deduplicator. Callers run the duplicate check before `insert`.
///
/// 当前会话中条目的权威有序序列。纯容器，不做 I/O，也不调用去重器。
#[derive(Debug, Default, Clone)]
pub struct EntryStore {
    entries: Vec<Entry>,
}

impl EntryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry. Rejects a second entry carrying an id already present.
    pub fn insert(&mut self, entry: Entry) -> Result<(), EntryStoreError> {
        if self.position(&entry.id).is_some() {
            return Err(EntryStoreError::DuplicateId(entry.id));
        }
        self.entries.push(entry);
        Ok(())
    }

    /// Remove the entry with `id`. Absent ids are not an error.
    pub fn remove(&mut self, id: &EntryId) -> Option<Entry> {
        let index = self.position(id)?;
        Some(self.entries.remove(index))
    }

    /// Put `new_entry` in place of the entry with `id`.
    ///
    /// The stored entry takes `id`. Position is preserved when `id` is present;
    /// otherwise the entry is appended. Any other entry already carrying the
    /// same id as `new_entry` is dropped so ids stay unique.
    pub fn replace(&mut self, id: &EntryId, mut new_entry: Entry) -> &Entry {
        if new_entry.id != *id {
            if let Some(stale) = self.position(&new_entry.id) {
                self.entries.remove(stale);
            }
            new_entry.id = id.clone();
        }

        let index = match self.position(id) {
            Some(index) => {
                self.entries[index] = new_entry;
                index
            }
            None => {
                self.entries.push(new_entry);
                self.entries.len() - 1
            }
        };
        &self.entries[index]
    }

    /// Replace the whole content, skipping entries whose id was already seen.
    ///
    /// Returns how many entries were skipped.
    pub fn replace_all(&mut self, entries: Vec<Entry>) -> usize {
        self.entries.clear();
        let mut skipped = 0;
        for entry in entries {
            if self.insert(entry).is_err() {
                skipped += 1;
            }
        }
        skipped
    }

    pub fn find(&self, id: &EntryId) -> Option<&Entry> {
        self.entries.iter().find(|e| e.id == *id)
    }

    pub fn find_mut(&mut self, id: &EntryId) -> Option<&mut Entry> {
        self.entries.iter_mut().find(|e| e.id == *id)
    }

    pub fn all(&self) -> &[Entry] {
        &self.entries
    }

    pub fn filter(&self, filter: CategoryFilter) -> Vec<&Entry> {
        self.entries.iter().filter(|e| filter.matches(e)).collect()
    }

    /// Case-insensitive substring search over tags. A blank term matches all.
    pub fn search_tags(&self, term: &str) -> Vec<&Entry> {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return self.entries.iter().collect();
        }
        self.entries
            .iter()
            .filter(|e| e.metadata.tags.iter().any(|t| t.to_lowercase().contains(&term)))
            .collect()
    }

    /// Replace the tags of an entry. Returns `false` when the id is unknown.
    pub fn update_tags<I, S>(&mut self, id: &EntryId, tags: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        match self.find_mut(id) {
            Some(entry) => {
                entry.metadata.tags = normalize_tags(tags);
                true
            }
            None => false,
        }
    }

    /// Total size of the entries whose bytes are kept inline.
    pub fn stored_size_bytes(&self) -> u64 {
        self.entries
            .iter()
            .filter(|e| e.has_inline_payload())
            .map(|e| e.metadata.size_bytes)
            .sum()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn position(&self, id: &EntryId) -> Option<usize> {
        self.entries.iter().position(|e| e.id == *id)
    }
}
