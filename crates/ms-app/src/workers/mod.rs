mod save_debouncer;
mod thumbnail_worker;

pub use save_debouncer::{SaveDebouncer, DEFAULT_SAVE_DEBOUNCE};
pub use thumbnail_worker::{ThumbnailEvent, ThumbnailWorker, ThumbnailWorkerHandle};
