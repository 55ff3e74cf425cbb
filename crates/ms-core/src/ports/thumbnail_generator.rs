use anyhow::Result;

use crate::entry::MimeType;

/// Preview produced from an entry's local bytes.
///
/// 由条目本地字节生成的预览图。
pub struct GeneratedThumbnail {
    pub thumbnail_bytes: Vec<u8>,
    pub thumbnail_mime_type: MimeType,
    /// Dimensions of the source image before scaling.
    pub original_width: u32,
    pub original_height: u32,
}

/// Derives previews for still-image entries. Never touches the network.
///
/// 为静态图像条目生成预览图，不访问网络。
#[async_trait::async_trait]
pub trait ThumbnailGeneratorPort: Send + Sync {
    /// Fails when the bytes cannot be decoded as an image.
    async fn generate_thumbnail(&self, image_bytes: &[u8]) -> Result<GeneratedThumbnail>;
}
