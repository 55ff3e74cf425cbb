use serde::{Deserialize, Serialize};

use super::MimeType;

/// Media category of an entry, used for filtering and thumbnail decisions.
///
/// 条目的媒体类别，用于过滤及缩略图决策。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Video,
    Audio,
    Image,
    /// Anything else, including kinds written by other tools.
    #[serde(other)]
    Other,
}

impl MediaKind {
    pub fn from_mime(mime: &MimeType) -> Self {
        match mime.top_level() {
            "video" => MediaKind::Video,
            "audio" => MediaKind::Audio,
            "image" => MediaKind::Image,
            _ => MediaKind::Other,
        }
    }

    /// Whether the engine can derive a thumbnail from the raw payload bytes.
    ///
    /// Video frames are drawn by the presentation layer, so only still images
    /// qualify here.
    pub fn is_thumbnailable(&self) -> bool {
        matches!(self, MediaKind::Image)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Video => "video",
            MediaKind::Audio => "audio",
            MediaKind::Image => "image",
            MediaKind::Other => "other",
        }
    }
}

impl From<&str> for MediaKind {
    /// Unknown values map to `MediaKind::Other`.
    fn from(s: &str) -> Self {
        match s {
            "video" => MediaKind::Video,
            "audio" => MediaKind::Audio,
            "image" => MediaKind::Image,
            _ => MediaKind::Other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_mime() {
        assert_eq!(MediaKind::from_mime(&MimeType("video/webm".into())), MediaKind::Video);
        assert_eq!(MediaKind::from_mime(&MimeType("audio/mpeg".into())), MediaKind::Audio);
        assert_eq!(MediaKind::from_mime(&MimeType("image/png".into())), MediaKind::Image);
        assert_eq!(
            MediaKind::from_mime(&MimeType("application/pdf".into())),
            MediaKind::Other
        );
    }

    #[test]
    fn test_only_images_are_thumbnailable() {
        assert!(MediaKind::Image.is_thumbnailable());
        assert!(!MediaKind::Video.is_thumbnailable());
        assert!(!MediaKind::Audio.is_thumbnailable());
    }

    #[test]
    fn test_str_round_trip() {
        for kind in [
            MediaKind::Video,
            MediaKind::Audio,
            MediaKind::Image,
            MediaKind::Other,
        ] {
            assert_eq!(MediaKind::from(kind.as_str()), kind);
        }
    }

    #[test]
    fn test_unknown_kinds_read_as_other() {
        assert_eq!(MediaKind::from("task"), MediaKind::Other);
        let kind: MediaKind = serde_json::from_str("\"task\"").unwrap();
        assert_eq!(kind, MediaKind::Other);
        let kind: MediaKind = serde_json::from_str("\"video\"").unwrap();
        assert_eq!(kind, MediaKind::Video);
    }
}
