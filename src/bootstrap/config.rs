//! # Configuration Loader / 配置加载器
//!
//! ## Responsibilities / 职责
//!
//! - ✅ Read TOML configuration files / 读取 TOML 配置文件
//! - ✅ Parse TOML into AppConfig DTO / 将 TOML 解析为 AppConfig DTO
//! - ✅ Report I/O and parsing errors with context / 报告带上下文的 I/O 和解析错误
//!
//! ## Prohibited / 禁止事项
//!
//! ❌ **No validation logic / 禁止验证逻辑**
//! ❌ **No business rules / 禁止业务规则**

use anyhow::Context;
use std::path::{Path, PathBuf};
use ms_core::config::AppConfig;

pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Load configuration from a TOML file
/// 从 TOML 文件加载配置
///
/// Keys missing from the file keep their value from `base`.
/// 文件中缺失的键保留 `base` 中的值。
///
/// # Errors / 错误
///
/// Returns error if:
/// - File cannot be read (I/O error)
/// - Content is not valid TOML (parse error)
pub fn load_config(config_path: &Path, base: AppConfig) -> anyhow::Result<AppConfig> {
    let content = std::fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;
    let toml_value: toml::Value =
        toml::from_str(&content).context("Failed to parse config as TOML")?;
    AppConfig::from_toml(&toml_value, base)
}

/// Resolve the configuration for this process.
///
/// - `explicit` given: that file must exist.
/// - otherwise `<data_dir>/config.toml` is used when present, system defaults
///   when not.
pub fn resolve_config(explicit: Option<PathBuf>) -> anyhow::Result<AppConfig> {
    let data_dir = ms_infra::fs::app_data_dir()?;
    resolve_config_in(&data_dir, explicit)
}

pub(crate) fn resolve_config_in(
    data_dir: &Path,
    explicit: Option<PathBuf>,
) -> anyhow::Result<AppConfig> {
    let base = AppConfig::with_system_defaults(data_dir.to_path_buf());
    match explicit {
        Some(path) => load_config(&path, base),
        None => {
            let default_path = data_dir.join(CONFIG_FILE_NAME);
            if default_path.exists() {
                load_config(&default_path, base)
            } else {
                Ok(base)
            }
        }
    }
}
