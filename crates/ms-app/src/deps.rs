//! # Application Dependencies / 应用依赖
//!
//! This module defines the dependency grouping for library construction.
//! 此模块定义媒体库构造的依赖分组。
//!
//! **Note / 注意**: This is NOT a Builder pattern.
//! **这不是 Builder 模式。**
//! - No build steps / 无构建步骤
//! - No hidden logic / 无隐藏逻辑
//! - Just parameter grouping / 仅用于参数打包

use std::sync::Arc;
use std::time::Duration;

use ms_core::config::AppConfig;
use ms_core::ports::{ClockPort, PersistenceBackendPort, ThumbnailGeneratorPort};

/// Application dependency grouping (non-Builder, just parameter grouping)
/// 应用依赖分组（非 Builder，仅参数打包）
pub struct AppDeps {
    // Storage dependencies / 存储依赖
    /// `None` when the keyed store failed capability probing.
    pub keyed_backend: Option<Arc<dyn PersistenceBackendPort>>,
    pub fallback_backend: Arc<dyn PersistenceBackendPort>,

    // Imaging dependencies / 图像依赖
    pub thumbnail_generator: Arc<dyn ThumbnailGeneratorPort>,

    // System dependencies / 系统依赖
    pub clock: Arc<dyn ClockPort>,
}

/// Tunables of the library, taken from [`AppConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LibrarySettings {
    pub dedup_window: Duration,
    pub save_debounce: Duration,
}

impl LibrarySettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            dedup_window: Duration::from_secs(config.dedup_window_secs),
            save_debounce: Duration::from_millis(config.save_debounce_ms),
        }
    }
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            dedup_window: ms_core::dedup::DEFAULT_RECENT_UPLOAD_WINDOW,
            save_debounce: crate::workers::DEFAULT_SAVE_DEBOUNCE,
        }
    }
}
