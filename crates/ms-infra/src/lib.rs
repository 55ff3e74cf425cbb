//! Infrastructure adapters for MediaShelf: the SQLite keyed store, the flat
//! string stores, the image thumbnail generator and platform helpers.

pub mod db;
pub mod fs;
pub mod persistence;
pub mod thumbnail;
pub mod time;

pub use persistence::{
    open_keyed_backend, FileStringStore, InMemoryStringStore, SqliteKeyedBackend,
    StringStoreBackend,
};
pub use thumbnail::ImageThumbnailGenerator;
pub use time::SystemClock;
