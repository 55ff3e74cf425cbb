//! Content-identity duplicate detection.
//!
//! Rules are evaluated in order and the first match wins:
//!
//! 1. Exact payload equality against an entry with a durable payload.
//! 2. A local upload with the same name and byte size as an existing local
//!    upload created inside the recent-upload window.
//!
//! Entries flagged for re-acquisition never match rule 2, so re-supplying a
//! lost file goes through [`Deduplicator::find_reacquisition_target`] instead.

use std::time::Duration;

use crate::entry::{Entry, EntryOrigin};
use crate::ids::EntryId;

/// Recent-upload window inherited from the gallery's re-drop heuristic.
///
/// Tunable, not load-bearing.
pub const DEFAULT_RECENT_UPLOAD_WINDOW: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DuplicateMatch {
    /// Same bytes or the same remote locator.
    SamePayload(EntryId),
    /// Same file dropped again before the earlier copy settled.
    RecentUpload(EntryId),
}

impl DuplicateMatch {
    pub fn existing_id(&self) -> &EntryId {
        match self {
            DuplicateMatch::SamePayload(id) | DuplicateMatch::RecentUpload(id) => id,
        }
    }

    pub fn reason(&self) -> &'static str {
        match self {
            DuplicateMatch::SamePayload(_) => "same_payload",
            DuplicateMatch::RecentUpload(_) => "recent_upload",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Deduplicator {
    window_ms: i64,
}

impl Default for Deduplicator {
    fn default() -> Self {
        Self::new(DEFAULT_RECENT_UPLOAD_WINDOW)
    }
}

impl Deduplicator {
    pub fn new(window: Duration) -> Self {
        Self {
            window_ms: i64::try_from(window.as_millis()).unwrap_or(i64::MAX),
        }
    }

    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms.max(0) as u64)
    }

    /// Check `candidate` against `existing` at wall-clock time `now_ms`.
    pub fn check<'a, I>(&self, candidate: &Entry, existing: I, now_ms: i64) -> Option<DuplicateMatch>
    where
        I: IntoIterator<Item = &'a Entry>,
        I::IntoIter: Clone,
    {
        let existing = existing.into_iter();

        if let Some(payload) = candidate.payload.as_ref() {
            let same = existing.clone().find(|e| {
                e.has_durable_payload()
                    && e.payload
                        .as_ref()
                        .is_some_and(|p| p.same_content(payload))
            });
            if let Some(found) = same {
                return Some(DuplicateMatch::SamePayload(found.id.clone()));
            }
        }

        if candidate.origin != EntryOrigin::LocalUpload {
            return None;
        }

        existing
            .filter(|e| e.origin == EntryOrigin::LocalUpload && !e.needs_reacquisition)
            .find(|e| self.same_file(candidate, e) && self.is_recent(e, now_ms))
            .map(|e| DuplicateMatch::RecentUpload(e.id.clone()))
    }

    /// Find a flagged entry that `candidate` re-supplies.
    ///
    /// Matches on name and byte size; the time window does not apply because
    /// the lost entry is typically from an earlier session. The candidate must
    /// share the flagged entry's origin or be a local upload.
    pub fn find_reacquisition_target<'a, I>(&self, candidate: &Entry, existing: I) -> Option<EntryId>
    where
        I: IntoIterator<Item = &'a Entry>,
    {
        if !candidate.has_durable_payload() && !candidate.has_transient_payload() {
            return None;
        }
        existing
            .into_iter()
            .find(|e| {
                e.needs_reacquisition
                    && (candidate.origin == e.origin || candidate.origin == EntryOrigin::LocalUpload)
                    && self.same_file(candidate, e)
            })
            .map(|e| e.id.clone())
    }

    fn same_file(&self, a: &Entry, b: &Entry) -> bool {
        a.metadata.name == b.metadata.name && a.metadata.size_bytes == b.metadata.size_bytes
    }

    fn is_recent(&self, existing: &Entry, now_ms: i64) -> bool {
        let created_ms = existing.metadata.created_at.timestamp_millis();
        now_ms.saturating_sub(created_ms) < self.window_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{EntryMetadata, MediaKind, MimeType, Payload};
    use chrono::{TimeZone, Utc};

    const NOW_MS: i64 = 1_700_000_000_000;

    fn upload(name: &str, size: u64, created_ms: i64, payload: Payload) -> Entry {
        let created_at = Utc.timestamp_millis_opt(created_ms).single().unwrap();
        Entry::new(
            EntryMetadata::new(name, size, MediaKind::Video).with_created_at(created_at),
            payload,
            EntryOrigin::LocalUpload,
        )
    }

    fn bytes(data: &[u8]) -> Payload {
        Payload::inline(MimeType("video/mp4".into()), data.to_vec())
    }

    #[test]
    fn test_same_bytes_is_duplicate() {
        let dedup = Deduplicator::default();
        let existing = vec![upload("a.mp4", 1, NOW_MS - 3_600_000, bytes(b"A"))];
        let candidate = upload("renamed.mp4", 1, NOW_MS, bytes(b"A"));

        let found = dedup.check(&candidate, &existing, NOW_MS).unwrap();
        assert_eq!(found, DuplicateMatch::SamePayload(existing[0].id.clone()));
    }

    #[test]
    fn test_same_locator_is_duplicate_for_any_origin() {
        let dedup = Deduplicator::default();
        let mut existing = upload("x", 0, NOW_MS, Payload::remote("https://e.com/v.mp4"));
        existing.origin = EntryOrigin::RemoteUrl;
        let mut candidate = upload("y", 0, NOW_MS, Payload::remote("https://e.com/v.mp4"));
        candidate.origin = EntryOrigin::PlaylistImport;

        assert!(matches!(
            dedup.check(&candidate, [&existing], NOW_MS),
            Some(DuplicateMatch::SamePayload(_))
        ));
    }

    #[test]
    fn test_recent_redrop_is_duplicate() {
        let dedup = Deduplicator::default();
        let existing = vec![upload("a.mp4", 10, NOW_MS - 30_000, Payload::transient("h1"))];
        let candidate = upload("a.mp4", 10, NOW_MS, Payload::transient("h2"));

        assert_eq!(
            dedup.check(&candidate, &existing, NOW_MS),
            Some(DuplicateMatch::RecentUpload(existing[0].id.clone()))
        );
    }

    #[test]
    fn test_redrop_outside_window_is_allowed() {
        let dedup = Deduplicator::default();
        let existing = vec![upload("a.mp4", 10, NOW_MS - 60_000, Payload::transient("h1"))];
        let candidate = upload("a.mp4", 10, NOW_MS, Payload::transient("h2"));

        assert!(dedup.check(&candidate, &existing, NOW_MS).is_none());
    }

    #[test]
    fn test_window_is_tunable() {
        let dedup = Deduplicator::new(Duration::from_secs(5));
        let existing = vec![upload("a.mp4", 10, NOW_MS - 10_000, Payload::transient("h1"))];
        let candidate = upload("a.mp4", 10, NOW_MS, Payload::transient("h2"));

        assert!(dedup.check(&candidate, &existing, NOW_MS).is_none());
        assert_eq!(dedup.window(), Duration::from_secs(5));
    }

    #[test]
    fn test_flagged_entries_are_exempt_from_recent_rule() {
        let dedup = Deduplicator::default();
        let mut lost = upload("a.mp4", 10, NOW_MS - 1_000, Payload::transient("h1"));
        lost.payload = None;
        lost.needs_reacquisition = true;
        let candidate = upload("a.mp4", 10, NOW_MS, bytes(b"A"));

        assert!(dedup.check(&candidate, [&lost], NOW_MS).is_none());
        assert_eq!(
            dedup.find_reacquisition_target(&candidate, [&lost]),
            Some(lost.id.clone())
        );
    }

    #[test]
    fn test_reacquisition_requires_same_name_and_size() {
        let dedup = Deduplicator::default();
        let mut lost = upload("a.mp4", 10, NOW_MS, Payload::transient("h1"));
        lost.payload = None;
        lost.needs_reacquisition = true;

        let other_size = upload("a.mp4", 11, NOW_MS, bytes(b"A"));
        assert!(dedup.find_reacquisition_target(&other_size, [&lost]).is_none());
    }

    #[test]
    fn test_remote_candidate_does_not_replace_flagged_upload() {
        let dedup = Deduplicator::default();
        let mut lost = upload("clip.mp4", 0, NOW_MS, Payload::transient("h1"));
        lost.payload = None;
        lost.needs_reacquisition = true;

        let mut remote = upload("clip.mp4", 0, NOW_MS, Payload::remote("https://e.com/clip.mp4"));
        remote.origin = EntryOrigin::RemoteUrl;
        assert!(dedup.find_reacquisition_target(&remote, [&lost]).is_none());

        let local = upload("clip.mp4", 0, NOW_MS, bytes(b""));
        assert_eq!(dedup.find_reacquisition_target(&local, [&lost]), Some(lost.id.clone()));
    }

    #[test]
    fn test_clipboard_origin_skips_recent_rule() {
        let dedup = Deduplicator::default();
        let existing = vec![upload("paste.png", 4, NOW_MS, bytes(b"AAAA"))];
        let mut candidate = upload("paste.png", 4, NOW_MS, bytes(b"BBBB"));
        candidate.origin = EntryOrigin::Clipboard;

        assert!(dedup.check(&candidate, &existing, NOW_MS).is_none());
    }
}
