//! Backend-agnostic persisted form of an entry.
//!
//! The absence of `payload` on load is the only signal that an entry lost its
//! content; see [`crate::reconcile::Reconciler`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_with::{base64::Base64, serde_as};

use crate::ids::EntryId;

use super::{Entry, EntryMetadata, EntryOrigin, MediaKind, MimeType, Payload, Thumbnail};

#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PersistedPayload {
    Inline {
        mime: String,
        #[serde_as(as = "Base64")]
        data: Vec<u8>,
    },
    Remote {
        locator: String,
    },
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedThumbnail {
    pub mime: String,
    #[serde_as(as = "Base64")]
    pub data: Vec<u8>,
}

/// Persisted record schema shared by every backend.
///
/// 所有后端共享的持久化记录结构。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedRecord {
    pub id: String,
    pub name: String,
    pub size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    pub timestamp: DateTime<Utc>,
    pub kind: MediaKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<PersistedPayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<PersistedThumbnail>,
    pub origin: EntryOrigin,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default)]
    pub allow_save: bool,
}

impl PersistedRecord {
    /// Build the persisted form of an entry.
    ///
    /// A transient payload is dropped here rather than failing the save; the
    /// reload path flags the entry for re-acquisition.
    pub fn from_entry(entry: &Entry) -> Self {
        let payload = match &entry.payload {
            Some(Payload::Inline { mime, bytes }) => Some(PersistedPayload::Inline {
                mime: mime.to_string(),
                data: bytes.clone(),
            }),
            Some(Payload::Remote { locator }) => Some(PersistedPayload::Remote {
                locator: locator.clone(),
            }),
            Some(Payload::Transient { .. }) | None => None,
        };

        Self {
            id: entry.id.to_string(),
            name: entry.metadata.name.clone(),
            size: entry.metadata.size_bytes,
            duration_ms: entry.metadata.duration_ms,
            timestamp: entry.metadata.created_at,
            kind: entry.metadata.kind,
            payload,
            thumbnail: entry.thumbnail.as_ref().map(|t| PersistedThumbnail {
                mime: t.mime.to_string(),
                data: t.bytes.clone(),
            }),
            origin: entry.origin,
            tags: entry.metadata.tags.clone(),
            category: entry.metadata.category.clone(),
            allow_save: entry.metadata.allow_save,
        }
    }

    /// Rebuild the raw session entry. Flags are left for the reconciler.
    pub fn into_entry(self) -> Entry {
        let payload = self.payload.map(|p| match p {
            PersistedPayload::Inline { mime, data } => Payload::Inline {
                mime: MimeType(mime),
                bytes: data,
            },
            PersistedPayload::Remote { locator } => Payload::Remote { locator },
        });

        Entry {
            id: EntryId::from(self.id),
            payload,
            thumbnail: self
                .thumbnail
                .map(|t| Thumbnail::new(MimeType(t.mime), t.data)),
            metadata: EntryMetadata {
                name: self.name,
                size_bytes: self.size,
                duration_ms: self.duration_ms,
                created_at: self.timestamp,
                kind: self.kind,
                tags: self.tags,
                category: self.category,
                allow_save: self.allow_save,
            },
            needs_reacquisition: false,
            origin: self.origin,
        }
    }
}
