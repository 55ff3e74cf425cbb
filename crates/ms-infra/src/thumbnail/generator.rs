use anyhow::{Context, Result};
use async_trait::async_trait;
use image::{codecs::jpeg::JpegEncoder, imageops::FilterType, ColorType, GenericImageView};
use ms_core::entry::MimeType;
use ms_core::ports::{GeneratedThumbnail, ThumbnailGeneratorPort};

/// JPEG quality of generated thumbnails.
pub const THUMBNAIL_JPEG_QUALITY: u8 = 80;

/// Decodes still images and writes a JPEG preview bounded by `max_edge`.
///
/// 解码静态图像并生成最长边不超过 `max_edge` 的 JPEG 预览图。
pub struct ImageThumbnailGenerator {
    max_edge: u32,
}

impl ImageThumbnailGenerator {
    pub fn new(max_edge: u32) -> Self {
        Self {
            max_edge: max_edge.max(1),
        }
    }
}

#[async_trait]
impl ThumbnailGeneratorPort for ImageThumbnailGenerator {
    async fn generate_thumbnail(&self, image_bytes: &[u8]) -> Result<GeneratedThumbnail> {
        let decoded =
            image::load_from_memory(image_bytes).context("decode image bytes for thumbnail")?;
        let (original_width, original_height) = decoded.dimensions();
        let (target_width, target_height) =
            calculate_target_size(original_width, original_height, self.max_edge);

        let resized = if target_width == original_width && target_height == original_height {
            decoded
        } else {
            decoded.resize_exact(target_width, target_height, FilterType::Triangle)
        };

        // JPEG has no alpha channel.
        let rgb = resized.to_rgb8();
        let (thumbnail_width, thumbnail_height) = rgb.dimensions();
        let mut thumbnail_bytes = Vec::new();
        let mut encoder =
            JpegEncoder::new_with_quality(&mut thumbnail_bytes, THUMBNAIL_JPEG_QUALITY);
        encoder
            .encode(
                rgb.as_raw(),
                thumbnail_width,
                thumbnail_height,
                ColorType::Rgb8.into(),
            )
            .context("encode thumbnail to jpeg")?;

        Ok(GeneratedThumbnail {
            thumbnail_bytes,
            thumbnail_mime_type: MimeType::image_jpeg(),
            original_width,
            original_height,
        })
    }
}

fn calculate_target_size(width: u32, height: u32, max_edge: u32) -> (u32, u32) {
    if width <= max_edge && height <= max_edge {
        return (width, height);
    }

    if width >= height {
        let scaled_height = ((height as f64) * (max_edge as f64) / (width as f64)).round() as u32;
        (max_edge, scaled_height.max(1))
    } else {
        let scaled_width = ((width as f64) * (max_edge as f64) / (height as f64)).round() as u32;
        (scaled_width.max(1), max_edge)
    }
}
