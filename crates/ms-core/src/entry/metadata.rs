use chrono::{DateTime, Utc};

use super::MediaKind;

/// Descriptive fields of an entry.
///
/// 条目的描述性字段。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryMetadata {
    pub name: String,
    pub size_bytes: u64,
    pub duration_ms: Option<u64>,
    pub created_at: DateTime<Utc>,
    pub kind: MediaKind,
    pub tags: Vec<String>,
    pub category: Option<String>,
    /// Remote entries are only re-savable when the user opted in.
    pub allow_save: bool,
}

impl EntryMetadata {
    pub fn new(name: impl Into<String>, size_bytes: u64, kind: MediaKind) -> Self {
        Self {
            name: name.into(),
            size_bytes,
            duration_ms: None,
            created_at: Utc::now(),
            kind,
            tags: Vec::new(),
            category: None,
            allow_save: false,
        }
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    pub fn with_duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = normalize_tags(tags);
        self
    }

    pub fn with_allow_save(mut self, allow_save: bool) -> Self {
        self.allow_save = allow_save;
        self
    }
}

/// Trim tags, drop blanks and repeated tags, keep first-occurrence order.
pub fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut normalized: Vec<String> = Vec::new();
    for tag in tags {
        let tag: String = tag.into();
        let tag = tag.trim();
        if tag.is_empty() || normalized.iter().any(|t| t == tag) {
            continue;
        }
        normalized.push(tag.to_string());
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_tags() {
        let tags = normalize_tags([" cats ", "dogs", "", "cats", "Cats"]);
        assert_eq!(tags, vec!["cats", "dogs", "Cats"]);
    }
}
