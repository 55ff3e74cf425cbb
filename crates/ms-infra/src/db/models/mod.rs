pub mod media_entry_row;

pub use media_entry_row::{MediaEntryRow, NewMediaEntryRow};
