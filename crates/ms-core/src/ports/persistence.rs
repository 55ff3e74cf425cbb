//! Persistence backend port.
//!
//! Two adapters implement this trait: a transactional keyed store (preferred)
//! and a flat string store (fallback with a strict size limit). The selector
//! in the application layer decides which one serves an operation.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::entry::PersistedRecord;

/// Failure reported by a persistence backend.
///
/// 持久化后端报告的错误。
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// Capability absent, connection failure, transaction abort.
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    /// The write would exceed the backend's size limit. Nothing was written.
    #[error("storage quota exceeded: needed {needed_bytes} bytes, limit {limit_bytes} bytes")]
    QuotaExceeded { needed_bytes: u64, limit_bytes: u64 },

    /// Stored data could not be decoded.
    #[error("stored data is corrupt: {0}")]
    Corrupt(String),
}

impl BackendError {
    pub fn unavailable(err: impl std::fmt::Display) -> Self {
        BackendError::Unavailable(err.to_string())
    }

    pub fn is_quota(&self) -> bool {
        matches!(self, BackendError::QuotaExceeded { .. })
    }
}

/// Which backend tier committed (or served) the last operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageTier {
    Keyed,
    Fallback,
    /// Neither tier succeeded.
    None,
}

impl StorageTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageTier::Keyed => "keyed",
            StorageTier::Fallback => "fallback",
            StorageTier::None => "none",
        }
    }
}

#[async_trait]
pub trait PersistenceBackendPort: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Replace the persisted collection with `records`, in order.
    ///
    /// Either the whole snapshot is committed or the previous one stays.
    async fn save_all(&self, records: &[PersistedRecord]) -> Result<(), BackendError>;

    /// Read the persisted collection in saved order.
    async fn load_all(&self) -> Result<Vec<PersistedRecord>, BackendError>;

    /// Drop everything this backend holds.
    async fn clear(&self) -> Result<(), BackendError>;
}

#[async_trait]
impl<T: PersistenceBackendPort + ?Sized> PersistenceBackendPort for Arc<T> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    async fn save_all(&self, records: &[PersistedRecord]) -> Result<(), BackendError> {
        (**self).save_all(records).await
    }

    async fn load_all(&self) -> Result<Vec<PersistedRecord>, BackendError> {
        (**self).load_all().await
    }

    async fn clear(&self) -> Result<(), BackendError> {
        (**self).clear().await
    }
}
