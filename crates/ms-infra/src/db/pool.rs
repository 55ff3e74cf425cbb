use std::time::Duration;

use anyhow::{Context, Result};
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sqlite::SqliteConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use log::info;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;

/// Checkout wait before the keyed tier is reported unavailable.
const CONNECTION_TIMEOUT: Duration = Duration::from_secs(5);

/// Open the keyed store database and bring its schema up to date.
///
/// `:memory:` gets a single-connection pool, since every connection to
/// `:memory:` opens its own empty database.
///
/// 打开键值存储数据库并执行待处理的迁移。
pub fn init_db_pool(database_url: &str) -> Result<DbPool> {
    let manager = ConnectionManager::<SqliteConnection>::new(database_url);

    let mut builder = Pool::builder().connection_timeout(CONNECTION_TIMEOUT);
    if database_url == ":memory:" {
        builder = builder.max_size(1);
    }
    let pool = builder
        .build(manager)
        .with_context(|| format!("Failed to open media database at {database_url}"))?;

    run_migrations(&pool)?;
    Ok(pool)
}

fn run_migrations(pool: &DbPool) -> Result<()> {
    let mut conn = pool
        .get()
        .context("Failed to check out a connection for migrations")?;

    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| anyhow::anyhow!("Media database migration failed: {e}"))?;
    if !applied.is_empty() {
        info!("Applied {} media database migration(s)", applied.len());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use diesel::connection::SimpleConnection;

    #[test]
    fn test_memory_pool_has_media_table() {
        let pool = init_db_pool(":memory:").unwrap();
        let mut conn = pool.get().unwrap();
        conn.batch_execute("SELECT id, position, payload_type FROM t_media_entry")
            .unwrap();
    }

    #[test]
    fn test_reopening_applies_nothing_new() {
        let dir = tempfile::tempdir().unwrap();
        let url = dir.path().join("media.db").to_string_lossy().into_owned();
        init_db_pool(&url).unwrap();

        let pool = init_db_pool(&url).unwrap();
        let mut conn = pool.get().unwrap();
        assert!(!conn.has_pending_migration(MIGRATIONS).unwrap());
    }
}
