//! Two-tier persistence with fail-over.
//!
//! 双层持久化：键值存储优先，失败时回退到字符串存储。

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use ms_core::entry::{Entry, PersistedRecord};
use ms_core::ports::{BackendError, PersistenceBackendPort, StorageTier};
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Save failure surfaced to callers.
///
/// Only a full fallback tier is reported. Every other backend failure is
/// absorbed by the selector and shows up as [`StorageTier::None`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PersistError {
    #[error("storage quota exceeded: needed {needed_bytes} bytes, limit {limit_bytes} bytes")]
    QuotaExceeded { needed_bytes: u64, limit_bytes: u64 },
}

pub type SaveOutcome = Result<StorageTier, PersistError>;

const TIER_NONE: u8 = 0;
const TIER_KEYED: u8 = 1;
const TIER_FALLBACK: u8 = 2;

fn tier_to_u8(tier: StorageTier) -> u8 {
    match tier {
        StorageTier::None => TIER_NONE,
        StorageTier::Keyed => TIER_KEYED,
        StorageTier::Fallback => TIER_FALLBACK,
    }
}

fn tier_from_u8(value: u8) -> StorageTier {
    match value {
        TIER_KEYED => StorageTier::Keyed,
        TIER_FALLBACK => StorageTier::Fallback,
        _ => StorageTier::None,
    }
}

/// Routes saves and loads to the keyed tier, falling back to the string tier.
///
/// Fail-over only: a save goes to exactly one tier and nothing is migrated
/// between tiers.
pub struct PersistenceBackendSelector {
    keyed: Option<Arc<dyn PersistenceBackendPort>>,
    fallback: Arc<dyn PersistenceBackendPort>,
    last_tier: AtomicU8,
}

impl PersistenceBackendSelector {
    /// `keyed` is `None` when the keyed tier failed capability probing.
    pub fn new(
        keyed: Option<Arc<dyn PersistenceBackendPort>>,
        fallback: Arc<dyn PersistenceBackendPort>,
    ) -> Self {
        if keyed.is_none() {
            info!(
                fallback = fallback.name(),
                "Keyed store absent; running on the fallback tier only"
            );
        }
        Self {
            keyed,
            fallback,
            last_tier: AtomicU8::new(TIER_NONE),
        }
    }

    pub fn has_keyed_tier(&self) -> bool {
        self.keyed.is_some()
    }

    /// Tier that served the last save or load. Diagnostics only.
    pub fn active_tier(&self) -> StorageTier {
        tier_from_u8(self.last_tier.load(Ordering::SeqCst))
    }

    fn record_tier(&self, tier: StorageTier) -> StorageTier {
        self.last_tier.store(tier_to_u8(tier), Ordering::SeqCst);
        tier
    }

    /// Persist the whole collection. Transient payloads are omitted.
    pub async fn save(&self, entries: &[Entry]) -> SaveOutcome {
        let records: Vec<PersistedRecord> =
            entries.iter().map(PersistedRecord::from_entry).collect();
        self.save_records(&records).await
    }

    #[tracing::instrument(name = "app.persistence.save", skip_all, fields(count = records.len()))]
    pub async fn save_records(&self, records: &[PersistedRecord]) -> SaveOutcome {
        if let Some(keyed) = &self.keyed {
            match keyed.save_all(records).await {
                Ok(()) => {
                    debug!(backend = keyed.name(), "Saved to keyed tier");
                    return Ok(self.record_tier(StorageTier::Keyed));
                }
                Err(err) => {
                    warn!(
                        backend = keyed.name(),
                        error = %err,
                        "Keyed tier save failed; falling back"
                    );
                }
            }
        }

        match self.fallback.save_all(records).await {
            Ok(()) => {
                debug!(backend = self.fallback.name(), "Saved to fallback tier");
                Ok(self.record_tier(StorageTier::Fallback))
            }
            Err(BackendError::QuotaExceeded {
                needed_bytes,
                limit_bytes,
            }) => {
                warn!(
                    backend = self.fallback.name(),
                    needed_bytes, limit_bytes, "Fallback tier is full"
                );
                self.record_tier(StorageTier::None);
                Err(PersistError::QuotaExceeded {
                    needed_bytes,
                    limit_bytes,
                })
            }
            Err(err) => {
                error!(
                    backend = self.fallback.name(),
                    error = %err,
                    "Fallback tier save failed; nothing was written"
                );
                Ok(self.record_tier(StorageTier::None))
            }
        }
    }

    /// Load the persisted collection. Never fails; total failure is empty.
    #[tracing::instrument(name = "app.persistence.load", skip_all)]
    pub async fn load(&self) -> Vec<PersistedRecord> {
        if let Some(keyed) = &self.keyed {
            match keyed.load_all().await {
                Ok(records) => {
                    debug!(
                        backend = keyed.name(),
                        count = records.len(),
                        "Loaded from keyed tier"
                    );
                    self.record_tier(StorageTier::Keyed);
                    return records;
                }
                Err(err) => {
                    warn!(
                        backend = keyed.name(),
                        error = %err,
                        "Keyed tier load failed; falling back"
                    );
                }
            }
        }

        match self.fallback.load_all().await {
            Ok(records) => {
                debug!(
                    backend = self.fallback.name(),
                    count = records.len(),
                    "Loaded from fallback tier"
                );
                self.record_tier(StorageTier::Fallback);
                records
            }
            Err(err) => {
                warn!(
                    backend = self.fallback.name(),
                    error = %err,
                    "Fallback tier load failed; starting empty"
                );
                self.record_tier(StorageTier::None);
                Vec::new()
            }
        }
    }

    /// Clear both tiers. Failures are logged.
    #[tracing::instrument(name = "app.persistence.clear_all", skip_all)]
    pub async fn clear_all(&self) {
        if let Some(keyed) = &self.keyed {
            if let Err(err) = keyed.clear().await {
                warn!(backend = keyed.name(), error = %err, "Failed to clear keyed tier");
            }
        }
        if let Err(err) = self.fallback.clear().await {
            warn!(
                backend = self.fallback.name(),
                error = %err,
                "Failed to clear fallback tier"
            );
        }
        info!("Cleared persisted entries");
    }
}
