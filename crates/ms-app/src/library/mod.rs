mod errors;
mod media_library;

pub use errors::LibraryError;
pub use media_library::{InsertOutcome, MediaLibrary};
