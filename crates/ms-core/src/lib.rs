//! # ms-core
//!
//! Core domain models and business logic for MediaShelf.
//!
//! This crate contains pure logic without any infrastructure dependencies:
//! the entry model, the in-memory [`store::EntryStore`], the
//! [`dedup::Deduplicator`], the [`reconcile::Reconciler`] and the ports that
//! adapters implement.

pub mod config;
pub mod dedup;
pub mod entry;
pub mod ids;
pub mod ports;
pub mod reconcile;
pub mod store;

// Re-export commonly used types at the crate root
pub use config::AppConfig;
pub use entry::{
    CategoryFilter, Entry, EntryMetadata, EntryOrigin, MediaKind, MimeType, Payload,
    PersistedRecord, Thumbnail,
};
pub use ids::EntryId;
pub use store::EntryStore;
