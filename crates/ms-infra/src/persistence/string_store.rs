use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use ms_core::ports::{BackendError, StringStorePort};
use tokio::fs;
use tokio::sync::Mutex;

const VALUE_EXTENSION: &str = "value";

/// Flat string store keeping one file per key under `dir`.
///
/// Writes go to a temporary file next to the target and are renamed into
/// place, so a failed `set` leaves the previous value readable.
///
/// 每个键一个文件的字符串存储，写入采用临时文件加重命名。
pub struct FileStringStore {
    dir: PathBuf,
    limit_bytes: u64,
}

impl FileStringStore {
    pub fn new(dir: impl Into<PathBuf>, limit_bytes: u64) -> Self {
        Self {
            dir: dir.into(),
            limit_bytes,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let file_name: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{file_name}.{VALUE_EXTENSION}"))
    }

    /// Bytes held by every key except the one at `exclude`.
    async fn used_bytes_excluding(&self, exclude: &Path) -> Result<u64> {
        let mut total = 0u64;
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("read string store dir failed: {}", self.dir.display()))
            }
        };

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path == exclude
                || path.extension().and_then(|e| e.to_str()) != Some(VALUE_EXTENSION)
            {
                continue;
            }
            total += entry.metadata().await?.len();
        }
        Ok(total)
    }

    async fn atomic_write(&self, path: &Path, content: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("create string store dir failed: {}", self.dir.display()))?;

        let tmp_path = path.with_extension("tmp");
        fs::write(&tmp_path, content)
            .await
            .with_context(|| format!("write temp value failed: {}", tmp_path.display()))?;

        fs::rename(&tmp_path, path).await.with_context(|| {
            format!(
                "rename temp value to target failed: {} -> {}",
                tmp_path.display(),
                path.display()
            )
        })?;
        Ok(())
    }
}

#[async_trait]
impl StringStorePort for FileStringStore {
    async fn get(&self, key: &str) -> Result<Option<String>, BackendError> {
        let path = self.path_for(key);
        match fs::read_to_string(&path).await {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(BackendError::unavailable(format!(
                "read value failed: {}: {e}",
                path.display()
            ))),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), BackendError> {
        let path = self.path_for(key);
        let others = self
            .used_bytes_excluding(&path)
            .await
            .map_err(|e| BackendError::unavailable(format!("{e:#}")))?;
        let needed_bytes = others + value.len() as u64;
        if needed_bytes > self.limit_bytes {
            return Err(BackendError::QuotaExceeded {
                needed_bytes,
                limit_bytes: self.limit_bytes,
            });
        }

        self.atomic_write(&path, value)
            .await
            .map_err(|e| BackendError::unavailable(format!("{e:#}")))
    }

    async fn remove(&self, key: &str) -> Result<(), BackendError> {
        let path = self.path_for(key);
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(BackendError::unavailable(format!(
                "remove value failed: {}: {e}",
                path.display()
            ))),
        }
    }

    fn limit_bytes(&self) -> u64 {
        self.limit_bytes
    }
}

/// Map-backed string store for environments without disk access.
pub struct InMemoryStringStore {
    values: Mutex<HashMap<String, String>>,
    limit_bytes: u64,
}

impl InMemoryStringStore {
    pub fn new(limit_bytes: u64) -> Self {
        Self {
            values: Mutex::new(HashMap::new()),
            limit_bytes,
        }
    }
}

#[async_trait]
impl StringStorePort for InMemoryStringStore {
    async fn get(&self, key: &str) -> Result<Option<String>, BackendError> {
        Ok(self.values.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), BackendError> {
        let mut values = self.values.lock().await;
        let others: u64 = values
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(_, v)| v.len() as u64)
            .sum();
        let needed_bytes = others + value.len() as u64;
        if needed_bytes > self.limit_bytes {
            return Err(BackendError::QuotaExceeded {
                needed_bytes,
                limit_bytes: self.limit_bytes,
            });
        }
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), BackendError> {
        self.values.lock().await.remove(key);
        Ok(())
    }

    fn limit_bytes(&self) -> u64 {
        self.limit_bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_file_store_set_get_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStringStore::new(dir.path().join("store"), 1024);

        assert_eq!(store.get("a/b").await.unwrap(), None);
        store.set("a/b", "hello").await.unwrap();
        assert_eq!(store.get("a/b").await.unwrap().as_deref(), Some("hello"));
        assert!(dir.path().join("store").join("a_b.value").exists());

        store.remove("a/b").await.unwrap();
        assert_eq!(store.get("a/b").await.unwrap(), None);
        store.remove("a/b").await.unwrap();
    }

    #[tokio::test]
    async fn test_file_store_quota_keeps_previous_value() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStringStore::new(dir.path(), 10);

        store.set("k", "12345").await.unwrap();
        store.set("other", "12345").await.unwrap();
        let err = store.set("k", "123456").await.unwrap_err();

        assert_eq!(
            err,
            BackendError::QuotaExceeded {
                needed_bytes: 11,
                limit_bytes: 10
            }
        );
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("12345"));
    }

    #[tokio::test]
    async fn test_file_store_overwrite_does_not_count_old_value() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStringStore::new(dir.path(), 10);

        store.set("k", "0123456789").await.unwrap();
        store.set("k", "9876543210").await.unwrap();

        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("9876543210"));
    }

    #[tokio::test]
    async fn test_in_memory_store_quota() {
        let store = InMemoryStringStore::new(4);

        store.set("a", "ab").await.unwrap();
        store.set("b", "cd").await.unwrap();
        assert!(store.set("c", "e").await.unwrap_err().is_quota());
        assert_eq!(store.get("c").await.unwrap(), None);

        store.remove("a").await.unwrap();
        store.set("c", "e").await.unwrap();
        assert_eq!(store.limit_bytes(), 4);
    }
}
