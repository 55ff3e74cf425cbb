use super::{Entry, MediaKind, Payload};

/// Enumerated category views offered to the presentation layer.
///
/// 提供给展示层的分类视图枚举。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CategoryFilter {
    All,
    /// Entries whose bytes are kept inline.
    Saved,
    /// Entries played from a locator or a live session handle.
    Streaming,
    Image,
    Audio,
    Video,
    /// Entries waiting for the user to re-supply their content.
    NeedsReacquisition,
}

impl CategoryFilter {
    pub fn matches(&self, entry: &Entry) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Saved => entry.has_inline_payload(),
            CategoryFilter::Streaming => matches!(
                entry.payload,
                Some(Payload::Remote { .. }) | Some(Payload::Transient { .. })
            ),
            CategoryFilter::Image => entry.metadata.kind == MediaKind::Image,
            CategoryFilter::Audio => entry.metadata.kind == MediaKind::Audio,
            CategoryFilter::Video => entry.metadata.kind == MediaKind::Video,
            CategoryFilter::NeedsReacquisition => entry.needs_reacquisition,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryFilter::All => "all",
            CategoryFilter::Saved => "saved",
            CategoryFilter::Streaming => "streaming",
            CategoryFilter::Image => "image",
            CategoryFilter::Audio => "audio",
            CategoryFilter::Video => "video",
            CategoryFilter::NeedsReacquisition => "lost",
        }
    }
}

impl std::str::FromStr for CategoryFilter {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(CategoryFilter::All),
            "saved" => Ok(CategoryFilter::Saved),
            "streaming" => Ok(CategoryFilter::Streaming),
            "image" => Ok(CategoryFilter::Image),
            "audio" => Ok(CategoryFilter::Audio),
            "video" => Ok(CategoryFilter::Video),
            "lost" | "needs_reacquisition" => Ok(CategoryFilter::NeedsReacquisition),
            other => Err(anyhow::anyhow!("unknown category filter: {}", other)),
        }
    }
}
