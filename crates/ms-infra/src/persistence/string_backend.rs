use async_trait::async_trait;
use ms_core::entry::PersistedRecord;
use ms_core::ports::{BackendError, PersistenceBackendPort, StringStorePort};
use tracing::debug;

/// Key the whole collection is stored under.
pub const ENTRIES_KEY: &str = "mediashelf.entries";

/// Fallback tier: the full collection as one JSON document in a string store.
///
/// 回退层：整个集合以单个 JSON 文档保存在字符串存储中。
pub struct StringStoreBackend<S> {
    store: S,
}

impl<S> StringStoreBackend<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<S> PersistenceBackendPort for StringStoreBackend<S>
where
    S: StringStorePort,
{
    fn name(&self) -> &'static str {
        "string_store"
    }

    async fn save_all(&self, records: &[PersistedRecord]) -> Result<(), BackendError> {
        let json = serde_json::to_string(records)
            .map_err(|e| BackendError::Corrupt(format!("serialize entries failed: {e}")))?;
        self.store.set(ENTRIES_KEY, &json).await?;
        debug!(
            count = records.len(),
            bytes = json.len(),
            limit_bytes = self.store.limit_bytes(),
            "Saved entries to string store"
        );
        Ok(())
    }

    async fn load_all(&self) -> Result<Vec<PersistedRecord>, BackendError> {
        match self.store.get(ENTRIES_KEY).await? {
            Some(json) => serde_json::from_str(&json)
                .map_err(|e| BackendError::Corrupt(format!("parse entries failed: {e}"))),
            None => Ok(Vec::new()),
        }
    }

    async fn clear(&self) -> Result<(), BackendError> {
        self.store.remove(ENTRIES_KEY).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::InMemoryStringStore;
    use chrono::Utc;
    use ms_core::entry::{EntryOrigin, MediaKind, PersistedPayload};

    fn record(id: &str, data: Vec<u8>) -> PersistedRecord {
        PersistedRecord {
            id: id.to_string(),
            name: format!("{id}.png"),
            size: data.len() as u64,
            duration_ms: None,
            timestamp: Utc::now(),
            kind: MediaKind::Image,
            payload: Some(PersistedPayload::Inline {
                mime: "image/png".to_string(),
                data,
            }),
            thumbnail: None,
            origin: EntryOrigin::LocalUpload,
            tags: vec!["x".to_string()],
            category: None,
            allow_save: false,
        }
    }

    #[tokio::test]
    async fn test_empty_store_loads_nothing() {
        let backend = StringStoreBackend::new(InMemoryStringStore::new(1024));
        assert!(backend.load_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_round_trip_through_json() {
        let backend = StringStoreBackend::new(InMemoryStringStore::new(64 * 1024));
        let records = vec![record("a", vec![1, 2, 3]), record("b", vec![4])];

        backend.save_all(&records).await.unwrap();

        assert_eq!(backend.load_all().await.unwrap(), records);
    }

    #[tokio::test]
    async fn test_quota_is_reported_and_previous_snapshot_kept() {
        let backend = StringStoreBackend::new(InMemoryStringStore::new(600));
        let small = vec![record("a", vec![1])];
        backend.save_all(&small).await.unwrap();

        let big = vec![record("a", vec![1]), record("b", vec![0; 1024])];
        let err = backend.save_all(&big).await.unwrap_err();

        assert!(err.is_quota());
        assert_eq!(backend.load_all().await.unwrap(), small);
    }

    #[tokio::test]
    async fn test_garbage_is_corrupt() {
        let store = InMemoryStringStore::new(1024);
        store.set(ENTRIES_KEY, "not json").await.unwrap();
        let backend = StringStoreBackend::new(store);

        assert!(matches!(
            backend.load_all().await.unwrap_err(),
            BackendError::Corrupt(_)
        ));
    }

    #[tokio::test]
    async fn test_clear_removes_key() {
        let backend = StringStoreBackend::new(InMemoryStringStore::new(1024));
        backend.save_all(&[record("a", vec![1])]).await.unwrap();
        backend.clear().await.unwrap();

        assert!(backend.load_all().await.unwrap().is_empty());
    }
}
