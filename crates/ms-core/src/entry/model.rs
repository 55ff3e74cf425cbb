use crate::ids::EntryId;

use super::{EntryMetadata, EntryOrigin, Payload, Thumbnail};

/// One media item managed by the library.
///
/// `payload` is `None` only for entries whose transient payload did not
/// survive a reload; those carry `needs_reacquisition = true`.
///
/// 由媒体库管理的单个媒体项。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub id: EntryId,
    pub payload: Option<Payload>,
    pub thumbnail: Option<Thumbnail>,
    pub metadata: EntryMetadata,
    pub needs_reacquisition: bool,
    pub origin: EntryOrigin,
}

impl Entry {
    /// Create a fresh entry with a newly generated id.
    pub fn new(metadata: EntryMetadata, payload: Payload, origin: EntryOrigin) -> Self {
        Self {
            id: EntryId::new(),
            payload: Some(payload),
            thumbnail: None,
            metadata,
            needs_reacquisition: false,
            origin,
        }
    }

    pub fn with_thumbnail(mut self, thumbnail: Thumbnail) -> Self {
        self.thumbnail = Some(thumbnail);
        self
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn has_durable_payload(&self) -> bool {
        self.payload.as_ref().is_some_and(Payload::is_durable)
    }

    pub fn has_inline_payload(&self) -> bool {
        self.payload.as_ref().is_some_and(Payload::is_inline)
    }

    pub fn has_transient_payload(&self) -> bool {
        self.payload.as_ref().is_some_and(Payload::is_transient)
    }

    /// Whether the payload can be handed to a player right now.
    pub fn is_playable(&self) -> bool {
        !self.needs_reacquisition && self.payload.is_some()
    }

    /// Whether the entry may be re-saved or exported.
    ///
    /// Remote entries require the explicit `allow_save` opt-in.
    pub fn is_exportable(&self) -> bool {
        if !self.is_playable() {
            return false;
        }
        match self.origin {
            EntryOrigin::RemoteUrl => self.metadata.allow_save,
            EntryOrigin::LocalUpload | EntryOrigin::Clipboard | EntryOrigin::PlaylistImport => {
                true
            }
        }
    }

    /// Whether a thumbnail is missing and could be derived locally.
    pub fn wants_thumbnail(&self) -> bool {
        self.thumbnail.is_none()
            && self.metadata.kind.is_thumbnailable()
            && self
                .payload
                .as_ref()
                .and_then(Payload::local_source)
                .is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::{MediaKind, MimeType};

    fn image_entry(origin: EntryOrigin) -> Entry {
        Entry::new(
            EntryMetadata::new("cat.png", 3, MediaKind::Image),
            Payload::inline(MimeType("image/png".into()), vec![1, 2, 3]),
            origin,
        )
    }

    #[test]
    fn test_remote_entries_need_allow_save_to_export() {
        let mut entry = Entry::new(
            EntryMetadata::new("stream", 0, MediaKind::Video),
            Payload::remote("https://example.com/live.m3u8"),
            EntryOrigin::RemoteUrl,
        );
        assert!(!entry.is_exportable());

        entry.metadata.allow_save = true;
        assert!(entry.is_exportable());
    }

    #[test]
    fn test_flagged_entry_is_neither_playable_nor_exportable() {
        let mut entry = image_entry(EntryOrigin::LocalUpload);
        entry.payload = None;
        entry.needs_reacquisition = true;

        assert!(!entry.is_playable());
        assert!(!entry.is_exportable());
        assert!(!entry.wants_thumbnail());
    }

    #[test]
    fn test_wants_thumbnail_only_for_images_without_one() {
        let entry = image_entry(EntryOrigin::Clipboard);
        assert!(entry.wants_thumbnail());

        let with_thumb = entry.with_thumbnail(Thumbnail::new(MimeType::image_jpeg(), vec![9]));
        assert!(!with_thumb.wants_thumbnail());

        let video = Entry::new(
            EntryMetadata::new("clip.mp4", 3, MediaKind::Video),
            Payload::inline(MimeType("video/mp4".into()), vec![1, 2, 3]),
            EntryOrigin::LocalUpload,
        );
        assert!(!video.wants_thumbnail());
    }
}
