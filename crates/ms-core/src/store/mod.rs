//! In-memory entry store.

mod entry_store;

pub use entry_store::{EntryStore, EntryStoreError};
