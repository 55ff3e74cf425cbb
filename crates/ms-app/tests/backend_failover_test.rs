//! Keyed tier failure handling, with a mocked keyed backend.
//! 键值存储层失败时的回退行为测试。

use std::sync::Arc;

use async_trait::async_trait;
use mockall::mock;
use ms_app::{MediaLibrary, PersistenceBackendSelector};
use ms_core::dedup::Deduplicator;
use ms_core::entry::{Entry, EntryMetadata, EntryOrigin, MediaKind, MimeType, Payload, PersistedRecord};
use ms_core::ports::{BackendError, PersistenceBackendPort, StorageTier};
use ms_infra::{InMemoryStringStore, StringStoreBackend, SystemClock};

mock! {
    pub KeyedBackend {}

    #[async_trait]
    impl PersistenceBackendPort for KeyedBackend {
        fn name(&self) -> &'static str;
        async fn save_all(&self, records: &[PersistedRecord]) -> Result<(), BackendError>;
        async fn load_all(&self) -> Result<Vec<PersistedRecord>, BackendError>;
        async fn clear(&self) -> Result<(), BackendError>;
    }
}

fn always_failing_keyed() -> MockKeyedBackend {
    let mut keyed = MockKeyedBackend::new();
    keyed.expect_name().return_const("mock-keyed");
    keyed
        .expect_save_all()
        .returning(|_| Err(BackendError::unavailable("disk I/O error")));
    keyed
        .expect_load_all()
        .returning(|| Err(BackendError::unavailable("disk I/O error")));
    keyed
        .expect_clear()
        .returning(|| Err(BackendError::unavailable("disk I/O error")));
    keyed
}

fn library(keyed: MockKeyedBackend, fallback: Arc<dyn PersistenceBackendPort>) -> MediaLibrary {
    let keyed: Arc<dyn PersistenceBackendPort> = Arc::new(keyed);
    MediaLibrary::from_parts(
        Arc::new(PersistenceBackendSelector::new(Some(keyed), fallback)),
        Deduplicator::default(),
        Arc::new(SystemClock),
        None,
    )
}

fn entry(name: &str, bytes: &[u8]) -> Entry {
    Entry::new(
        EntryMetadata::new(name, bytes.len() as u64, MediaKind::Audio),
        Payload::inline(MimeType("audio/mpeg".to_string()), bytes.to_vec()),
        EntryOrigin::LocalUpload,
    )
}

#[tokio::test]
async fn test_always_failing_keyed_tier_uses_fallback_for_save_and_load() {
    let fallback: Arc<dyn PersistenceBackendPort> =
        Arc::new(StringStoreBackend::new(InMemoryStringStore::new(1 << 20)));

    let mut first = library(always_failing_keyed(), fallback.clone());
    let a = entry("a.mp3", b"aaa");
    first.insert_if_not_duplicate(a.clone()).unwrap();
    assert_eq!(first.persist_all().await.unwrap(), StorageTier::Fallback);

    let mut second = library(always_failing_keyed(), fallback);
    let loaded = second.load_all().await;

    assert_eq!(loaded, vec![a]);
    assert_eq!(second.active_tier(), StorageTier::Fallback);
}

#[tokio::test]
async fn test_save_goes_to_exactly_one_tier() {
    let mut keyed = MockKeyedBackend::new();
    keyed.expect_name().return_const("mock-keyed");
    keyed.expect_save_all().times(1).returning(|_| Ok(()));

    let store = Arc::new(StringStoreBackend::new(InMemoryStringStore::new(1 << 20)));
    let mut library = library(keyed, store.clone());
    library.insert_if_not_duplicate(entry("a.mp3", b"a")).unwrap();

    assert_eq!(library.persist_all().await.unwrap(), StorageTier::Keyed);
    assert!(store.load_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_both_tiers_failing_loads_empty() {
    struct BrokenFallback;

    #[async_trait]
    impl PersistenceBackendPort for BrokenFallback {
        fn name(&self) -> &'static str {
            "broken"
        }

        async fn save_all(&self, _records: &[PersistedRecord]) -> Result<(), BackendError> {
            Err(BackendError::unavailable("no disk"))
        }

        async fn load_all(&self) -> Result<Vec<PersistedRecord>, BackendError> {
            Err(BackendError::Corrupt("garbage".to_string()))
        }

        async fn clear(&self) -> Result<(), BackendError> {
            Err(BackendError::unavailable("no disk"))
        }
    }

    let mut library = library(always_failing_keyed(), Arc::new(BrokenFallback));
    library.insert_if_not_duplicate(entry("a.mp3", b"a")).unwrap();

    assert_eq!(library.persist_all().await.unwrap(), StorageTier::None);
    assert!(library.load_all().await.is_empty());
    library.clear_all().await;
}

#[tokio::test]
async fn test_keyed_quota_exceeded_lands_in_fallback() {
    let mut keyed = MockKeyedBackend::new();
    keyed.expect_name().return_const("mock-keyed");
    keyed.expect_save_all().times(1).returning(|_| {
        Err(BackendError::QuotaExceeded {
            needed_bytes: 4096,
            limit_bytes: 1024,
        })
    });

    let store = Arc::new(StringStoreBackend::new(InMemoryStringStore::new(1 << 20)));
    let mut library = library(keyed, store.clone());
    let a = entry("a.mp3", b"aaa");
    library.insert_if_not_duplicate(a.clone()).unwrap();

    assert_eq!(library.persist_all().await, Ok(StorageTier::Fallback));
    let saved = store.load_all().await.unwrap();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].id, a.id.as_str());
}
