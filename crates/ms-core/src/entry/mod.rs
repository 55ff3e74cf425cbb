//! Library entry model.

mod filter;
mod kind;
mod metadata;
mod mime;
mod model;
mod origin;
mod payload;
mod record;

pub use filter::CategoryFilter;
pub use kind::MediaKind;
pub use metadata::{normalize_tags, EntryMetadata};
pub use mime::MimeType;
pub use model::Entry;
pub use origin::EntryOrigin;
pub use payload::{decode_data_url, Payload, Thumbnail, TransientHandle};
pub use record::{PersistedPayload, PersistedRecord, PersistedThumbnail};
