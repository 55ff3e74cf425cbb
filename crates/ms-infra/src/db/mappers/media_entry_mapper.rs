use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use ms_core::entry::{
    EntryOrigin, MediaKind, PersistedPayload, PersistedRecord, PersistedThumbnail,
};
use tracing::warn;

use crate::db::models::{MediaEntryRow, NewMediaEntryRow};
use crate::db::ports::{InsertMapper, RowMapper};

const PAYLOAD_INLINE: &str = "inline";
const PAYLOAD_REMOTE: &str = "remote";

pub struct MediaEntryRowMapper;

impl InsertMapper<PersistedRecord, NewMediaEntryRow> for MediaEntryRowMapper {
    /// `position` is left at 0; the repository assigns it from the
    /// collection order.
    fn to_row(&self, domain: &PersistedRecord) -> Result<NewMediaEntryRow> {
        let (payload_type, payload_mime, payload_data, payload_locator) = match &domain.payload {
            Some(PersistedPayload::Inline { mime, data }) => (
                Some(PAYLOAD_INLINE.to_string()),
                Some(mime.clone()),
                Some(data.clone()),
                None,
            ),
            Some(PersistedPayload::Remote { locator }) => (
                Some(PAYLOAD_REMOTE.to_string()),
                None,
                None,
                Some(locator.clone()),
            ),
            None => (None, None, None, None),
        };

        Ok(NewMediaEntryRow {
            id: domain.id.clone(),
            position: 0,
            name: domain.name.clone(),
            size_bytes: i64::try_from(domain.size).context("entry size exceeds i64 range")?,
            duration_ms: domain
                .duration_ms
                .map(i64::try_from)
                .transpose()
                .context("duration exceeds i64 range")?,
            created_at: domain
                .timestamp
                .to_rfc3339_opts(SecondsFormat::AutoSi, true),
            kind: domain.kind.as_str().to_string(),
            origin: domain.origin.as_str().to_string(),
            payload_type,
            payload_mime,
            payload_data,
            payload_locator,
            thumbnail_mime: domain.thumbnail.as_ref().map(|t| t.mime.clone()),
            thumbnail_data: domain.thumbnail.as_ref().map(|t| t.data.clone()),
            tags: serde_json::to_string(&domain.tags).context("serialize tags")?,
            category: domain.category.clone(),
            allow_save: domain.allow_save,
        })
    }
}

impl RowMapper<MediaEntryRow, PersistedRecord> for MediaEntryRowMapper {
    fn to_domain(&self, row: &MediaEntryRow) -> Result<PersistedRecord> {
        let timestamp = DateTime::parse_from_rfc3339(&row.created_at)
            .with_context(|| format!("invalid created_at for entry {}", row.id))?
            .with_timezone(&Utc);
        let tags: Vec<String> = serde_json::from_str(&row.tags)
            .with_context(|| format!("invalid tags for entry {}", row.id))?;

        Ok(PersistedRecord {
            id: row.id.clone(),
            name: row.name.clone(),
            size: u64::try_from(row.size_bytes).unwrap_or(0),
            duration_ms: row.duration_ms.and_then(|d| u64::try_from(d).ok()),
            timestamp,
            kind: MediaKind::from(row.kind.as_str()),
            payload: payload_from_row(row),
            thumbnail: match (&row.thumbnail_mime, &row.thumbnail_data) {
                (Some(mime), Some(data)) => Some(PersistedThumbnail {
                    mime: mime.clone(),
                    data: data.clone(),
                }),
                _ => None,
            },
            origin: EntryOrigin::from(row.origin.as_str()),
            tags,
            category: row.category.clone(),
            allow_save: row.allow_save,
        })
    }
}

/// Incomplete payload columns are read as a lost payload rather than an
/// error, so the entry is kept and flagged on reload.
fn payload_from_row(row: &MediaEntryRow) -> Option<PersistedPayload> {
    match row.payload_type.as_deref() {
        Some(PAYLOAD_INLINE) => match (&row.payload_mime, &row.payload_data) {
            (Some(mime), Some(data)) => Some(PersistedPayload::Inline {
                mime: mime.clone(),
                data: data.clone(),
            }),
            _ => {
                warn!(entry_id = %row.id, "Inline payload row is missing columns");
                None
            }
        },
        Some(PAYLOAD_REMOTE) => row
            .payload_locator
            .as_ref()
            .map(|locator| PersistedPayload::Remote {
                locator: locator.clone(),
            }),
        Some(other) => {
            warn!(entry_id = %row.id, payload_type = other, "Unknown payload type");
            None
        }
        None => None,
    }
}
