//! Coalesces bursts of save requests into one write.
//!
//! A single task owns the selector side: requests arriving within the quiet
//! period replace each other, and only the newest snapshot is written. Saves
//! never overlap because the task handles them one at a time.

use std::sync::Arc;
use std::time::Duration;

use ms_core::entry::PersistedRecord;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::persistence::{PersistenceBackendSelector, SaveOutcome};

pub const DEFAULT_SAVE_DEBOUNCE: Duration = Duration::from_millis(250);

pub struct SaveDebouncer {
    requests: mpsc::UnboundedSender<Vec<PersistedRecord>>,
    outcomes: watch::Receiver<Option<SaveOutcome>>,
    task: JoinHandle<()>,
}

impl SaveDebouncer {
    /// Start the debounce task on the current tokio runtime.
    pub fn spawn(selector: Arc<PersistenceBackendSelector>, quiet: Duration) -> Self {
        let (requests, rx) = mpsc::unbounded_channel();
        let (outcome_tx, outcomes) = watch::channel(None);
        let task = tokio::spawn(run(selector, quiet, rx, outcome_tx));
        Self {
            requests,
            outcomes,
            task,
        }
    }

    /// Ask for `snapshot` to be written once the burst settles.
    pub fn request(&self, snapshot: Vec<PersistedRecord>) {
        if self.requests.send(snapshot).is_err() {
            warn!("Save debouncer stopped; snapshot dropped");
        }
    }

    /// Outcome of the most recent write, `None` before the first one.
    pub fn subscribe(&self) -> watch::Receiver<Option<SaveOutcome>> {
        self.outcomes.clone()
    }

    /// Write any pending snapshot immediately and stop the task.
    ///
    /// Returns the outcome of the last write performed, if any.
    pub async fn shutdown(self) -> Option<SaveOutcome> {
        let Self {
            requests,
            outcomes,
            task,
        } = self;
        drop(requests);
        if let Err(err) = task.await {
            warn!(error = %err, "Save debouncer task ended abnormally");
        }
        let last = outcomes.borrow().clone();
        last
    }
}

async fn run(
    selector: Arc<PersistenceBackendSelector>,
    quiet: Duration,
    mut rx: mpsc::UnboundedReceiver<Vec<PersistedRecord>>,
    outcome_tx: watch::Sender<Option<SaveOutcome>>,
) {
    while let Some(mut latest) = rx.recv().await {
        let mut coalesced = 0usize;
        loop {
            match timeout(quiet, rx.recv()).await {
                Ok(Some(next)) => {
                    latest = next;
                    coalesced += 1;
                }
                // Closed: flush now.
                Ok(None) => break,
                Err(_) => break,
            }
        }

        debug!(count = latest.len(), coalesced, "Writing debounced snapshot");
        let outcome = selector.save_records(&latest).await;
        outcome_tx.send_replace(Some(outcome));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use ms_core::entry::{EntryOrigin, MediaKind};
    use ms_core::ports::{BackendError, PersistenceBackendPort, StorageTier};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingBackend {
        saves: Mutex<Vec<Vec<String>>>,
    }

    #[async_trait]
    impl PersistenceBackendPort for RecordingBackend {
        fn name(&self) -> &'static str {
            "recording"
        }

        async fn save_all(&self, records: &[PersistedRecord]) -> Result<(), BackendError> {
            let ids = records.iter().map(|r| r.id.clone()).collect();
            self.saves.lock().unwrap().push(ids);
            Ok(())
        }

        async fn load_all(&self) -> Result<Vec<PersistedRecord>, BackendError> {
            Ok(Vec::new())
        }

        async fn clear(&self) -> Result<(), BackendError> {
            Ok(())
        }
    }

    fn snapshot(ids: &[&str]) -> Vec<PersistedRecord> {
        ids.iter()
            .map(|id| PersistedRecord {
                id: id.to_string(),
                name: id.to_string(),
                size: 1,
                duration_ms: None,
                timestamp: Utc::now(),
                kind: MediaKind::Other,
                payload: None,
                thumbnail: None,
                origin: EntryOrigin::LocalUpload,
                tags: vec![],
                category: None,
                allow_save: false,
            })
            .collect()
    }

    fn debouncer(backend: &Arc<RecordingBackend>) -> SaveDebouncer {
        let selector = Arc::new(PersistenceBackendSelector::new(None, backend.clone()));
        SaveDebouncer::spawn(selector, Duration::from_millis(250))
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_is_written_once_with_last_snapshot() {
        let backend = Arc::new(RecordingBackend::default());
        let debouncer = debouncer(&backend);
        let mut outcomes = debouncer.subscribe();

        debouncer.request(snapshot(&["a"]));
        debouncer.request(snapshot(&["a", "b"]));
        debouncer.request(snapshot(&["a", "b", "c"]));

        outcomes.changed().await.unwrap();
        assert_eq!(
            *outcomes.borrow(),
            Some(Ok(StorageTier::Fallback))
        );
        assert_eq!(
            *backend.saves.lock().unwrap(),
            vec![vec!["a".to_string(), "b".to_string(), "c".to_string()]]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_requests_separated_by_quiet_period_are_written_separately() {
        let backend = Arc::new(RecordingBackend::default());
        let debouncer = debouncer(&backend);
        let mut outcomes = debouncer.subscribe();

        debouncer.request(snapshot(&["a"]));
        outcomes.changed().await.unwrap();

        tokio::time::sleep(Duration::from_secs(1)).await;
        debouncer.request(snapshot(&["b"]));
        outcomes.changed().await.unwrap();

        assert_eq!(backend.saves.lock().unwrap().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_flushes_pending_snapshot() {
        let backend = Arc::new(RecordingBackend::default());
        let debouncer = debouncer(&backend);

        debouncer.request(snapshot(&["x"]));
        let outcome = debouncer.shutdown().await;

        assert_eq!(outcome, Some(Ok(StorageTier::Fallback)));
        assert_eq!(backend.saves.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_shutdown_without_requests_writes_nothing() {
        let backend = Arc::new(RecordingBackend::default());
        let debouncer = debouncer(&backend);

        assert_eq!(debouncer.shutdown().await, None);
        assert!(backend.saves.lock().unwrap().is_empty());
    }
}
