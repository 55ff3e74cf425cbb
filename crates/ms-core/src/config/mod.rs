//! # Pure Data Module - Data Transfer Objects Only
//!
//! ## Responsibilities
//!
//! - Define configuration data structures
//! - Provide TOML → DTO mapping
//!
//! ## Prohibited
//!
//! - No business logic or policies
//! - No validation logic
//!
//! Missing keys are taken from the `base` config handed to
//! [`AppConfig::from_toml`], which callers build with
//! [`AppConfig::with_system_defaults`]. Values present in the file are
//! accepted as they are.

use std::path::PathBuf;

/// Application configuration DTO (pure data, no logic)
/// 应用配置 DTO（纯数据，无逻辑）
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// SQLite file of the keyed store (path info only, no existence check)
    pub database_path: PathBuf,

    /// Directory of the flat string store
    pub string_store_dir: PathBuf,

    /// Size limit of the flat string store, in bytes
    pub string_store_limit_bytes: u64,

    /// Try the keyed store at all. `false` runs on the string tier only.
    pub prefer_keyed_store: bool,

    /// Recent-upload duplicate window, in seconds
    pub dedup_window_secs: u64,

    /// Longest edge of generated thumbnails, in pixels
    pub thumbnail_max_edge: u32,

    /// Quiet period before a coalesced save is written, in milliseconds
    pub save_debounce_ms: u64,

    /// Directory for rolling log files
    pub log_dir: PathBuf,
}

/// Browser string stores cap out around 5 MiB; the fallback tier keeps that budget.
pub const DEFAULT_STRING_STORE_LIMIT_BYTES: u64 = 5 * 1024 * 1024;
pub const DEFAULT_DEDUP_WINDOW_SECS: u64 = 60;
pub const DEFAULT_THUMBNAIL_MAX_EDGE: u32 = 320;
pub const DEFAULT_SAVE_DEBOUNCE_MS: u64 = 250;

impl AppConfig {
    /// Create AppConfig from TOML value, falling back to `base` per key.
    ///
    /// 从 TOML 值创建 AppConfig，缺失的键使用 `base` 中的值。
    pub fn from_toml(toml_value: &toml::Value, base: AppConfig) -> anyhow::Result<Self> {
        let storage = toml_value.get("storage");
        let library = toml_value.get("library");
        let logging = toml_value.get("logging");

        let path = |section: Option<&toml::Value>, key: &str| {
            section
                .and_then(|s| s.get(key))
                .and_then(|v| v.as_str())
                .map(PathBuf::from)
        };
        let int = |section: Option<&toml::Value>, key: &str| {
            section.and_then(|s| s.get(key)).and_then(|v| v.as_integer())
        };

        Ok(Self {
            database_path: path(storage, "database_path").unwrap_or(base.database_path),
            string_store_dir: path(storage, "string_store_dir").unwrap_or(base.string_store_dir),
            string_store_limit_bytes: int(storage, "string_store_limit_bytes")
                .map(|v| v.max(0) as u64)
                .unwrap_or(base.string_store_limit_bytes),
            prefer_keyed_store: storage
                .and_then(|s| s.get("prefer_keyed_store"))
                .and_then(|v| v.as_bool())
                .unwrap_or(base.prefer_keyed_store),
            dedup_window_secs: int(library, "dedup_window_secs")
                .map(|v| v.max(0) as u64)
                .unwrap_or(base.dedup_window_secs),
            thumbnail_max_edge: int(library, "thumbnail_max_edge")
                .map(|v| v.clamp(0, u32::MAX as i64) as u32)
                .unwrap_or(base.thumbnail_max_edge),
            save_debounce_ms: int(library, "save_debounce_ms")
                .map(|v| v.max(0) as u64)
                .unwrap_or(base.save_debounce_ms),
            log_dir: path(logging, "dir").unwrap_or(base.log_dir),
        })
    }

    /// Create AppConfig with system-default paths for production use
    /// 生产环境使用：创建具有系统默认路径的 AppConfig
    ///
    /// The base directory should be computed by the caller using
    /// platform-specific logic (e.g., the `dirs` crate).
    ///
    /// # Arguments / 参数
    ///
    /// * `data_dir` - Base directory for app data (e.g., `~/.local/share/mediashelf`)
    pub fn with_system_defaults(data_dir: PathBuf) -> Self {
        Self {
            database_path: data_dir.join("mediashelf.db"),
            string_store_dir: data_dir.join("string-store"),
            string_store_limit_bytes: DEFAULT_STRING_STORE_LIMIT_BYTES,
            prefer_keyed_store: true,
            dedup_window_secs: DEFAULT_DEDUP_WINDOW_SECS,
            thumbnail_max_edge: DEFAULT_THUMBNAIL_MAX_EDGE,
            save_debounce_ms: DEFAULT_SAVE_DEBOUNCE_MS,
            log_dir: data_dir.join("logs"),
        }
    }
}
