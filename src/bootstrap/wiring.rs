//! Dependency wiring: probe storage capabilities and assemble [`AppDeps`].
//!
//! 依赖装配：探测存储能力并组装 [`AppDeps`]。

use std::sync::Arc;

use ms_app::{AppDeps, LibrarySettings, MediaLibrary};
use ms_core::config::AppConfig;
use ms_core::ports::{PersistenceBackendPort, StringStorePort};
use ms_infra::{
    open_keyed_backend, FileStringStore, ImageThumbnailGenerator, InMemoryStringStore,
    StringStoreBackend, SystemClock,
};
use tracing::{info, warn};

/// Open the keyed tier if it is wanted and reachable.
fn probe_keyed_backend(config: &AppConfig) -> Option<Arc<dyn PersistenceBackendPort>> {
    if !config.prefer_keyed_store {
        info!("Keyed store disabled by configuration");
        return None;
    }
    match open_keyed_backend(&config.database_path) {
        Ok(backend) => Some(Arc::new(backend)),
        Err(err) => {
            warn!(
                path = %config.database_path.display(),
                error = %format!("{err:#}"),
                "Keyed store unavailable"
            );
            None
        }
    }
}

/// File-backed string store, or an in-memory one when the directory cannot
/// be created.
fn build_string_store(config: &AppConfig) -> Box<dyn StringStorePort> {
    match std::fs::create_dir_all(&config.string_store_dir) {
        Ok(()) => Box::new(FileStringStore::new(
            config.string_store_dir.clone(),
            config.string_store_limit_bytes,
        )),
        Err(err) => {
            warn!(
                dir = %config.string_store_dir.display(),
                error = %err,
                "String store directory unavailable; keeping entries in memory"
            );
            Box::new(InMemoryStringStore::new(config.string_store_limit_bytes))
        }
    }
}

pub fn build_deps(config: &AppConfig) -> AppDeps {
    AppDeps {
        keyed_backend: probe_keyed_backend(config),
        fallback_backend: Arc::new(StringStoreBackend::new(build_string_store(config))),
        thumbnail_generator: Arc::new(ImageThumbnailGenerator::new(config.thumbnail_max_edge)),
        clock: Arc::new(SystemClock),
    }
}

/// Wire a library for `config`. Must be called from within a tokio runtime.
pub fn build_library(config: &AppConfig) -> MediaLibrary {
    MediaLibrary::new(build_deps(config), LibrarySettings::from_config(config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_keyed_store_can_be_disabled() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AppConfig::with_system_defaults(dir.path().to_path_buf());
        config.prefer_keyed_store = false;

        assert!(probe_keyed_backend(&config).is_none());
        assert!(!config.database_path.exists());
    }

    #[test]
    fn test_keyed_store_opens_in_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::with_system_defaults(dir.path().to_path_buf());

        assert!(probe_keyed_backend(&config).is_some());
        assert!(config.database_path.exists());
    }

    #[test]
    fn test_unwritable_string_store_dir_falls_back_to_memory() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, b"x").unwrap();
        let mut config = AppConfig::with_system_defaults(dir.path().to_path_buf());
        config.string_store_dir = PathBuf::from(&blocker).join("nested");

        let store = build_string_store(&config);

        assert_eq!(store.limit_bytes(), config.string_store_limit_bytes);
    }
}
