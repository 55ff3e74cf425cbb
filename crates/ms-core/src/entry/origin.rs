use serde::{Deserialize, Serialize};

/// How an entry entered the library.
///
/// The origin decides whether the entry may be re-saved or exported and which
/// duplicate rules apply to it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EntryOrigin {
    LocalUpload,
    Clipboard,
    RemoteUrl,
    PlaylistImport,
}

impl EntryOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryOrigin::LocalUpload => "local_upload",
            EntryOrigin::Clipboard => "clipboard",
            EntryOrigin::RemoteUrl => "remote_url",
            EntryOrigin::PlaylistImport => "playlist_import",
        }
    }
}

impl From<&str> for EntryOrigin {
    /// Create an EntryOrigin from a string slice.
    ///
    /// Any unrecognized value yields `EntryOrigin::LocalUpload`.
    ///
    /// # Examples
    ///
    /// ```
    /// use ms_core::entry::EntryOrigin;
    ///
    /// assert_eq!(EntryOrigin::from("remote_url"), EntryOrigin::RemoteUrl);
    /// assert_eq!(EntryOrigin::from("???"), EntryOrigin::LocalUpload);
    /// ```
    fn from(s: &str) -> Self {
        match s {
            "local_upload" => EntryOrigin::LocalUpload,
            "clipboard" => EntryOrigin::Clipboard,
            "remote_url" => EntryOrigin::RemoteUrl,
            "playlist_import" => EntryOrigin::PlaylistImport,
            _ => EntryOrigin::LocalUpload, // Default to LocalUpload for unknown values
        }
    }
}

impl From<String> for EntryOrigin {
    fn from(s: String) -> Self {
        EntryOrigin::from(s.as_str())
    }
}
