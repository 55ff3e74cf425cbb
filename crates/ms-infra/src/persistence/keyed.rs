use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::db::executor::DieselSqliteExecutor;
use crate::db::mappers::MediaEntryRowMapper;
use crate::db::pool::init_db_pool;
use crate::db::repositories::DieselMediaEntryRepository;

pub type SqliteKeyedBackend =
    DieselMediaEntryRepository<DieselSqliteExecutor, MediaEntryRowMapper, MediaEntryRowMapper>;

/// Probe and open the keyed tier at `database_path`.
///
/// Creates the parent directory, opens the pool and runs migrations. Any
/// failure here means the keyed tier is absent for this process.
///
/// 探测并打开键值存储层，失败即视为该层不可用。
pub fn open_keyed_backend(database_path: &Path) -> Result<SqliteKeyedBackend> {
    if let Some(parent) = database_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create database dir failed: {}", parent.display()))?;
        }
    }

    let url = database_path
        .to_str()
        .with_context(|| format!("database path is not UTF-8: {}", database_path.display()))?;
    let pool = init_db_pool(url)?;
    info!(path = %database_path.display(), "Keyed store opened");

    Ok(DieselMediaEntryRepository::new(
        DieselSqliteExecutor::new(pool),
        MediaEntryRowMapper,
        MediaEntryRowMapper,
    ))
}
