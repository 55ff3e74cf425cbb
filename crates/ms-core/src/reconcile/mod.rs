//! Repair of persisted records into session-usable entries.
//!
//! Per record:
//!
//! - inline payload: durable; a missing thumbnail on a thumbnailable kind
//!   yields a [`ThumbnailJob`];
//! - remote payload: durable; a job is only produced when the locator is an
//!   inline `data:` URL, since anything else would need a network fetch;
//! - no payload: the content was transient at save time, so the entry is kept
//!   and flagged `needs_reacquisition`.
//!
//! A blank id is replaced by one derived from the record's position and
//! creation time, so repairing the same records twice yields identical
//! entries. Running the reconciler again over its own output yields the same
//! flags, count and jobs.

use crate::entry::{Entry, MimeType, Payload, PersistedRecord};
use crate::ids::EntryId;

/// Request to derive a thumbnail from local bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThumbnailJob {
    pub entry_id: EntryId,
    pub source_mime: MimeType,
    pub source: Vec<u8>,
}

impl ThumbnailJob {
    /// Build a job for `entry` if it wants a thumbnail.
    pub fn for_entry(entry: &Entry) -> Option<Self> {
        if !entry.wants_thumbnail() {
            return None;
        }
        let (source_mime, source) = entry.payload.as_ref()?.local_source()?;
        Some(Self {
            entry_id: entry.id.clone(),
            source_mime,
            source,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    pub entries: Vec<Entry>,
    pub thumbnail_jobs: Vec<ThumbnailJob>,
}

impl Reconciliation {
    pub fn flagged_count(&self) -> usize {
        self.entries.iter().filter(|e| e.needs_reacquisition).count()
    }
}

pub struct Reconciler;

impl Reconciler {
    /// Turn loaded records into entries, preserving order and count.
    pub fn repair(records: Vec<PersistedRecord>) -> Reconciliation {
        let entries = records
            .into_iter()
            .map(PersistedRecord::into_entry)
            .collect();
        Self::reconcile(entries)
    }

    /// Re-run the repair decision over entries already in a session.
    pub fn repair_entries(entries: &[Entry]) -> Reconciliation {
        Self::reconcile(entries.to_vec())
    }

    fn reconcile(entries: Vec<Entry>) -> Reconciliation {
        let mut out = Reconciliation::default();
        for (index, mut entry) in entries.into_iter().enumerate() {
            if entry.id.is_empty() {
                entry.id = recovered_id(index, &entry);
                #[cfg(feature = "tracing")]
                tracing::warn!(
                    entry_id = %entry.id,
                    name = %entry.metadata.name,
                    "Loaded record had a blank id; assigned a recovered one"
                );
            }

            match entry.payload {
                Some(Payload::Inline { .. }) | Some(Payload::Remote { .. }) => {
                    entry.needs_reacquisition = false;
                    if let Some(job) = ThumbnailJob::for_entry(&entry) {
                        out.thumbnail_jobs.push(job);
                    }
                }
                // Only reachable through `repair_entries` within the session
                // that still holds the handle.
                Some(Payload::Transient { .. }) => {
                    entry.needs_reacquisition = false;
                }
                None => {
                    entry.needs_reacquisition = true;
                }
            }
            out.entries.push(entry);
        }
        out
    }
}

fn recovered_id(index: usize, entry: &Entry) -> EntryId {
    EntryId::from(format!(
        "recovered-{}-{index}",
        entry.metadata.created_at.timestamp_millis()
    ))
}
