mod generator;

pub use generator::{ImageThumbnailGenerator, THUMBNAIL_JPEG_QUALITY};
