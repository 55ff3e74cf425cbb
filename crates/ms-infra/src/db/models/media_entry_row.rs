use diesel::prelude::*;

use crate::db::schema::t_media_entry;

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = t_media_entry)]
pub struct MediaEntryRow {
    pub id: String,
    pub position: i32,
    pub name: String,
    pub size_bytes: i64,
    pub duration_ms: Option<i64>,
    pub created_at: String,
    pub kind: String,
    pub origin: String,
    pub payload_type: Option<String>,
    pub payload_mime: Option<String>,
    pub payload_data: Option<Vec<u8>>,
    pub payload_locator: Option<String>,
    pub thumbnail_mime: Option<String>,
    pub thumbnail_data: Option<Vec<u8>>,
    /// JSON array of strings.
    pub tags: String,
    pub category: Option<String>,
    pub allow_save: bool,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = t_media_entry)]
pub struct NewMediaEntryRow {
    pub id: String,
    pub position: i32,
    pub name: String,
    pub size_bytes: i64,
    pub duration_ms: Option<i64>,
    pub created_at: String,
    pub kind: String,
    pub origin: String,
    pub payload_type: Option<String>,
    pub payload_mime: Option<String>,
    pub payload_data: Option<Vec<u8>>,
    pub payload_locator: Option<String>,
    pub thumbnail_mime: Option<String>,
    pub thumbnail_data: Option<Vec<u8>>,
    pub tags: String,
    pub category: Option<String>,
    pub allow_save: bool,
}
