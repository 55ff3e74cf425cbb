use anyhow::{Context, Result};
use std::path::PathBuf;

const APP_DIR_NAME: &str = "MediaShelf";

/// Root directory holding the media database, the string store, the
/// default config file and the logs.
///
/// 媒体库数据根目录（数据库、字符串存储、配置与日志）。
///
/// - macOS: ~/Library/Application Support/MediaShelf
/// - Windows: %APPDATA%\MediaShelf
/// - Linux: $XDG_DATA_HOME/MediaShelf or ~/.local/share/MediaShelf
///
/// Nothing is created here; adapters create what they write to.
pub fn app_data_dir() -> Result<PathBuf> {
    let base_dir = platform_data_dir().context("Failed to locate the platform data directory")?;
    Ok(base_dir.join(APP_DIR_NAME))
}

fn platform_data_dir() -> Result<PathBuf> {
    #[cfg(target_os = "linux")]
    {
        if let Some(xdg_data_home) = std::env::var_os("XDG_DATA_HOME") {
            if !xdg_data_home.is_empty() {
                return Ok(PathBuf::from(xdg_data_home));
            }
        }
    }

    dirs::data_dir().ok_or_else(|| anyhow::anyhow!("No data directory on this platform"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_data_dir_is_named_for_the_app() {
        let path = app_data_dir().expect("data dir");
        assert!(path.ends_with(APP_DIR_NAME));
    }
}
