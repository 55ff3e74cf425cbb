use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct MimeType(pub String);

impl MimeType {
    pub fn octet_stream() -> Self {
        Self("application/octet-stream".into())
    }

    pub fn image_jpeg() -> Self {
        Self("image/jpeg".into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Top-level type, e.g. `video` for `video/mp4`.
    pub fn top_level(&self) -> &str {
        self.0
            .split('/')
            .next()
            .map(str::trim)
            .unwrap_or_default()
    }
}

impl fmt::Display for MimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for MimeType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(MimeType(s.trim().to_ascii_lowercase()))
    }
}
