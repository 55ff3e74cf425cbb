use base64::Engine;

use super::MimeType;

/// Session-only reference to content the engine cannot serialize.
///
/// What the handle points at is up to the collaborator that created it (a
/// live file reference, an object URL, a local path registered for
/// streaming). It is dropped on save and never survives a reload.
///
/// 仅在当前会话有效的内容句柄，保存时被丢弃，重新加载后不可用。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TransientHandle(String);

impl TransientHandle {
    pub fn new(handle: impl Into<String>) -> Self {
        Self(handle.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Content of an entry.
///
/// `Inline` and `Remote` are durable and survive a save/load round trip.
/// `Transient` is never written to any backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// Encoded bytes kept alongside the entry.
    Inline { mime: MimeType, bytes: Vec<u8> },

    /// Opaque URL string. The engine never dereferences it.
    Remote { locator: String },

    /// Session-only handle.
    Transient { handle: TransientHandle },
}

impl Payload {
    pub fn inline(mime: MimeType, bytes: Vec<u8>) -> Self {
        Payload::Inline { mime, bytes }
    }

    pub fn remote(locator: impl Into<String>) -> Self {
        Payload::Remote {
            locator: locator.into(),
        }
    }

    pub fn transient(handle: impl Into<String>) -> Self {
        Payload::Transient {
            handle: TransientHandle::new(handle),
        }
    }

    pub fn is_durable(&self) -> bool {
        !self.is_transient()
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, Payload::Transient { .. })
    }

    pub fn is_inline(&self) -> bool {
        matches!(self, Payload::Inline { .. })
    }

    /// Content identity used by the duplicate check.
    ///
    /// Inline payloads compare byte-for-byte, remote payloads by exact locator
    /// string. Transient handles never match anything: two handles naming the
    /// same file say nothing about the bytes behind them.
    pub fn same_content(&self, other: &Payload) -> bool {
        match (self, other) {
            (Payload::Inline { bytes: a, .. }, Payload::Inline { bytes: b, .. }) => {
                a.len() == b.len() && a == b
            }
            (Payload::Remote { locator: a }, Payload::Remote { locator: b }) => a == b,
            _ => false,
        }
    }

    /// Bytes a thumbnail could be derived from without any network access.
    ///
    /// Inline bytes qualify directly; a remote locator qualifies only when it
    /// is itself an inline `data:` URL.
    pub fn local_source(&self) -> Option<(MimeType, Vec<u8>)> {
        match self {
            Payload::Inline { mime, bytes } => Some((mime.clone(), bytes.clone())),
            Payload::Remote { locator } => decode_data_url(locator),
            Payload::Transient { .. } => None,
        }
    }
}

/// Derived preview image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thumbnail {
    pub mime: MimeType,
    pub bytes: Vec<u8>,
}

impl Thumbnail {
    pub fn new(mime: MimeType, bytes: Vec<u8>) -> Self {
        Self { mime, bytes }
    }
}

/// Decode a base64 `data:` URL into its MIME type and bytes.
///
/// Returns `None` for anything else, including percent-encoded (non-base64)
/// data URLs, which never carry binary media in practice.
pub fn decode_data_url(locator: &str) -> Option<(MimeType, Vec<u8>)> {
    let rest = locator.strip_prefix("data:")?;
    let (header, data) = rest.split_once(',')?;
    let mime = header.strip_suffix(";base64")?;
    let mime = if mime.is_empty() {
        MimeType::octet_stream()
    } else {
        MimeType(mime.trim().to_ascii_lowercase())
    };

    let bytes = base64::engine::general_purpose::STANDARD
        .decode(data.trim())
        .ok()?;
    Some((mime, bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_is_not_durable() {
        assert!(!Payload::transient("/tmp/movie.mp4").is_durable());
        assert!(Payload::remote("https://example.com/a.mp4").is_durable());
        assert!(Payload::inline(MimeType::image_jpeg(), vec![1]).is_durable());
    }

    #[test]
    fn test_same_content_rules() {
        let a = Payload::inline(MimeType::image_jpeg(), b"A".to_vec());
        let a2 = Payload::inline(MimeType("image/png".into()), b"A".to_vec());
        let b = Payload::inline(MimeType::image_jpeg(), b"B".to_vec());
        assert!(a.same_content(&a2));
        assert!(!a.same_content(&b));

        let url = Payload::remote("https://example.com/v.mp4");
        assert!(url.same_content(&Payload::remote("https://example.com/v.mp4")));
        assert!(!url.same_content(&Payload::remote("https://example.com/w.mp4")));

        let t = Payload::transient("/tmp/x");
        assert!(!t.same_content(&Payload::transient("/tmp/x")));
        assert!(!a.same_content(&url));
    }

    #[test]
    fn test_decode_data_url() {
        let (mime, bytes) = decode_data_url("data:image/png;base64,AAEC").unwrap();
        assert_eq!(mime.as_str(), "image/png");
        assert_eq!(bytes, vec![0, 1, 2]);

        assert!(decode_data_url("https://example.com/a.png").is_none());
        assert!(decode_data_url("data:text/plain,hello").is_none());
        assert!(decode_data_url("data:image/png;base64,!!!").is_none());
    }

    #[test]
    fn test_local_source_from_data_url_locator() {
        let payload = Payload::remote("data:image/gif;base64,R0lG");
        let (mime, bytes) = payload.local_source().unwrap();
        assert_eq!(mime.as_str(), "image/gif");
        assert_eq!(bytes, b"GIF".to_vec());

        assert!(Payload::remote("https://example.com/a.gif")
            .local_source()
            .is_none());
    }
}
