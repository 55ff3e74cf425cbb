//! Persistence tier adapters.
//!
//! - keyed tier: [`crate::db::repositories::DieselMediaEntryRepository`],
//!   opened through [`open_keyed_backend`];
//! - fallback tier: [`StringStoreBackend`] over a [`StringStorePort`]
//!   ([`FileStringStore`] or [`InMemoryStringStore`]).
//!
//! [`StringStorePort`]: ms_core::ports::StringStorePort

mod keyed;
mod string_backend;
mod string_store;

pub use keyed::{open_keyed_backend, SqliteKeyedBackend};
pub use string_backend::{StringStoreBackend, ENTRIES_KEY};
pub use string_store::{FileStringStore, InMemoryStringStore};
