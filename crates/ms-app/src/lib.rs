//! MediaShelf Application Orchestration Layer
//!
//! This crate composes the core logic with the persistence ports: backend
//! selection with fail-over, the [`MediaLibrary`] facade and the background
//! workers (thumbnails, debounced saves).

pub mod deps;
pub mod library;
pub mod persistence;
pub mod workers;

pub use deps::{AppDeps, LibrarySettings};
pub use library::{InsertOutcome, LibraryError, MediaLibrary};
pub use persistence::{PersistError, PersistenceBackendSelector, SaveOutcome};
pub use workers::{SaveDebouncer, ThumbnailEvent, ThumbnailWorker, ThumbnailWorkerHandle};
