use anyhow::Context;
use async_trait::async_trait;
use diesel::{Connection, QueryDsl, RunQueryDsl, SelectableHelper};
use ms_core::entry::PersistedRecord;
use ms_core::ports::{BackendError, PersistenceBackendPort};
use tracing::debug;

use crate::db::models::{MediaEntryRow, NewMediaEntryRow};
use crate::db::ports::{DbExecutor, InsertMapper, RowMapper};
use crate::db::schema::t_media_entry;

/// Keyed persistence tier backed by SQLite.
///
/// Each save replaces the whole table inside one transaction (delete all,
/// insert current), so a failed save leaves the previous snapshot intact.
///
/// SQLite 键值存储层：每次保存在单个事务内整体替换。
pub struct DieselMediaEntryRepository<E, IM, RM> {
    executor: E,
    insert_mapper: IM,
    row_mapper: RM,
}

impl<E, IM, RM> DieselMediaEntryRepository<E, IM, RM> {
    pub fn new(executor: E, insert_mapper: IM, row_mapper: RM) -> Self {
        Self {
            executor,
            insert_mapper,
            row_mapper,
        }
    }
}

#[async_trait]
impl<E, IM, RM> PersistenceBackendPort for DieselMediaEntryRepository<E, IM, RM>
where
    E: DbExecutor,
    IM: InsertMapper<PersistedRecord, NewMediaEntryRow>,
    RM: RowMapper<MediaEntryRow, PersistedRecord>,
{
    fn name(&self) -> &'static str {
        "sqlite"
    }

    async fn save_all(&self, records: &[PersistedRecord]) -> Result<(), BackendError> {
        let mut rows = Vec::with_capacity(records.len());
        for (index, record) in records.iter().enumerate() {
            let mut row = self
                .insert_mapper
                .to_row(record)
                .map_err(|e| BackendError::Corrupt(format!("{e:#}")))?;
            row.position = i32::try_from(index)
                .map_err(|_| BackendError::Unavailable("too many entries".to_string()))?;
            rows.push(row);
        }

        self.executor
            .run(|conn| {
                conn.transaction::<_, diesel::result::Error, _>(|conn| {
                    diesel::delete(t_media_entry::table).execute(conn)?;
                    for row in &rows {
                        diesel::insert_into(t_media_entry::table)
                            .values(row)
                            .execute(conn)?;
                    }
                    Ok(())
                })
                .context("replace media entries")
            })
            .map_err(|e| BackendError::unavailable(format!("{e:#}")))?;

        debug!(count = rows.len(), "Saved entries to keyed store");
        Ok(())
    }

    async fn load_all(&self) -> Result<Vec<PersistedRecord>, BackendError> {
        let rows: Vec<MediaEntryRow> = self
            .executor
            .run(|conn| {
                t_media_entry::table
                    .order(t_media_entry::position)
                    .select(MediaEntryRow::as_select())
                    .load::<MediaEntryRow>(conn)
                    .context("load media entries")
            })
            .map_err(|e| BackendError::unavailable(format!("{e:#}")))?;

        rows.iter()
            .map(|row| {
                self.row_mapper
                    .to_domain(row)
                    .map_err(|e| BackendError::Corrupt(format!("{e:#}")))
            })
            .collect()
    }

    async fn clear(&self) -> Result<(), BackendError> {
        self.executor
            .run(|conn| {
                diesel::delete(t_media_entry::table)
                    .execute(conn)
                    .context("clear media entries")?;
                Ok(())
            })
            .map_err(|e| BackendError::unavailable(format!("{e:#}")))
    }
}
