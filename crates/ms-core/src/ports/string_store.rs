use async_trait::async_trait;

use super::BackendError;

/// Flat string-keyed store with a size limit.
///
/// Implementations must leave the previous value untouched when `set` fails,
/// and must report `BackendError::QuotaExceeded` when the write would push the
/// total stored size over the limit.
///
/// 带容量上限的扁平字符串键值存储。
#[async_trait]
pub trait StringStorePort: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, BackendError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), BackendError>;

    async fn remove(&self, key: &str) -> Result<(), BackendError>;

    /// Configured size limit in bytes.
    fn limit_bytes(&self) -> u64;
}

#[async_trait]
impl<T: StringStorePort + ?Sized> StringStorePort for Box<T> {
    async fn get(&self, key: &str) -> Result<Option<String>, BackendError> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), BackendError> {
        (**self).set(key, value).await
    }

    async fn remove(&self, key: &str) -> Result<(), BackendError> {
        (**self).remove(key).await
    }

    fn limit_bytes(&self) -> u64 {
        (**self).limit_bytes()
    }
}
