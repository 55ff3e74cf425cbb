//! Port interfaces for the application layer
//!
//! Ports define the contract between the application logic and
//! infrastructure implementations. Core logic stays independent of the
//! concrete storage engines and image codecs behind them.

mod clock;
mod persistence;
mod string_store;
mod thumbnail_generator;

pub use clock::ClockPort;
pub use persistence::{BackendError, PersistenceBackendPort, StorageTier};
pub use string_store::StringStorePort;
pub use thumbnail_generator::{GeneratedThumbnail, ThumbnailGeneratorPort};
