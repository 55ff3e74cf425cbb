//! Library facade: the in-memory store plus persistence, dedup and
//! background thumbnails.
//!
//! 媒体库门面：内存存储、持久化、去重与后台缩略图的组合。

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use ms_core::dedup::Deduplicator;
use ms_core::entry::{CategoryFilter, Entry, PersistedRecord, Thumbnail};
use ms_core::ids::EntryId;
use ms_core::ports::{ClockPort, StorageTier};
use ms_core::reconcile::{Reconciler, ThumbnailJob};
use ms_core::store::{EntryStore, EntryStoreError};
use tokio::sync::broadcast;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;
use tracing::{debug, info, warn};

use crate::deps::{AppDeps, LibrarySettings};
use crate::library::LibraryError;
use crate::persistence::{PersistenceBackendSelector, SaveOutcome};
use crate::workers::{ThumbnailEvent, ThumbnailWorker, ThumbnailWorkerHandle};

/// Result of a successful insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    /// Appended as a new entry.
    Inserted(Entry),
    /// Re-supplied the content of a flagged entry, keeping its id and position.
    Reacquired(Entry),
}

impl InsertOutcome {
    pub fn entry(&self) -> &Entry {
        match self {
            InsertOutcome::Inserted(entry) | InsertOutcome::Reacquired(entry) => entry,
        }
    }
}

/// Owns the entry collection for one session.
///
/// Mutations take `&mut self`; the composing application is the single
/// owner and no locking happens around the store.
pub struct MediaLibrary {
    store: EntryStore,
    deduplicator: Deduplicator,
    selector: Arc<PersistenceBackendSelector>,
    clock: Arc<dyn ClockPort>,
    thumbnails: Option<ThumbnailWorkerHandle>,
    thumbnail_events: Option<mpsc::UnboundedReceiver<ThumbnailEvent>>,
    pending_thumbnails: HashSet<EntryId>,
}

impl MediaLibrary {
    /// Wire a library from its dependencies and start the thumbnail worker.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(deps: AppDeps, settings: LibrarySettings) -> Self {
        let selector = Arc::new(PersistenceBackendSelector::new(
            deps.keyed_backend,
            deps.fallback_backend,
        ));
        let thumbnails = ThumbnailWorker::spawn(deps.thumbnail_generator);
        Self::from_parts(
            selector,
            Deduplicator::new(settings.dedup_window),
            deps.clock,
            Some(thumbnails),
        )
    }

    /// Assemble a library from already-built parts. Without a worker handle
    /// no thumbnails are generated.
    pub fn from_parts(
        selector: Arc<PersistenceBackendSelector>,
        deduplicator: Deduplicator,
        clock: Arc<dyn ClockPort>,
        thumbnails: Option<ThumbnailWorkerHandle>,
    ) -> Self {
        let thumbnail_events = thumbnails.as_ref().map(ThumbnailWorkerHandle::completions);
        Self {
            store: EntryStore::new(),
            deduplicator,
            selector,
            clock,
            thumbnails,
            thumbnail_events,
            pending_thumbnails: HashSet::new(),
        }
    }

    pub fn selector(&self) -> Arc<PersistenceBackendSelector> {
        self.selector.clone()
    }

    /// Tier that served the last save or load.
    pub fn active_tier(&self) -> StorageTier {
        self.selector.active_tier()
    }

    /// Insert `entry` unless it duplicates an entry already present.
    ///
    /// A candidate matching a flagged entry by name and size replaces it in
    /// place instead of being appended.
    #[tracing::instrument(
        name = "app.library.insert",
        skip(self, entry),
        fields(entry_id = %entry.id, name = %entry.metadata.name, origin = entry.origin.as_str())
    )]
    pub fn insert_if_not_duplicate(
        &mut self,
        mut entry: Entry,
    ) -> Result<InsertOutcome, LibraryError> {
        // The flag is derived from the payload, never trusted from the caller.
        entry.needs_reacquisition = entry.payload.is_none();
        let now_ms = self.clock.now_ms();

        if let Some(found) = self.deduplicator.check(&entry, self.store.all(), now_ms) {
            info!(
                existing_id = %found.existing_id(),
                reason = found.reason(),
                "Rejected duplicate entry"
            );
            return Err(LibraryError::DuplicateEntry {
                existing_id: found.existing_id().clone(),
                reason: found.reason(),
            });
        }

        if let Some(target) = self
            .deduplicator
            .find_reacquisition_target(&entry, self.store.all())
        {
            let stored = self.reacquire(&target, entry);
            info!(entry_id = %stored.id, "Re-acquired lost entry");
            return Ok(InsertOutcome::Reacquired(stored));
        }

        let id = entry.id.clone();
        self.store.insert(entry).map_err(|err| match err {
            EntryStoreError::DuplicateId(id) => LibraryError::IdConflict(id),
        })?;
        self.schedule_thumbnail(&id);

        let stored = self
            .store
            .find(&id)
            .cloned()
            .ok_or_else(|| LibraryError::NotFound(id.clone()))?;
        debug!(count = self.store.len(), "Inserted entry");
        Ok(InsertOutcome::Inserted(stored))
    }

    fn reacquire(&mut self, target: &EntryId, mut entry: Entry) -> Entry {
        if let Some(old) = self.store.find(target) {
            if entry.metadata.tags.is_empty() {
                entry.metadata.tags = old.metadata.tags.clone();
            }
            if entry.metadata.category.is_none() {
                entry.metadata.category = old.metadata.category.clone();
            }
        }
        entry.needs_reacquisition = false;
        let stored = self.store.replace(target, entry).clone();
        self.schedule_thumbnail(target);
        stored
    }

    /// Remove an entry. Absent ids are not an error.
    pub fn remove_entry(&mut self, id: &EntryId) -> Option<Entry> {
        self.pending_thumbnails.remove(id);
        let removed = self.store.remove(id);
        if removed.is_some() {
            debug!(entry_id = %id, "Removed entry");
        }
        removed
    }

    /// Put `entry` in place of `id`, keeping `id` and its position.
    pub fn replace_entry(&mut self, id: &EntryId, mut entry: Entry) -> Entry {
        entry.needs_reacquisition = entry.payload.is_none();
        let stored = self.store.replace(id, entry).clone();
        self.schedule_thumbnail(id);
        stored
    }

    pub fn list_entries(&self, filter: Option<CategoryFilter>) -> Vec<Entry> {
        match filter {
            Some(filter) => self.store.filter(filter).into_iter().cloned().collect(),
            None => self.store.all().to_vec(),
        }
    }

    pub fn entries(&self) -> &[Entry] {
        self.store.all()
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn find_entry(&self, id: &EntryId) -> Option<&Entry> {
        self.store.find(id)
    }

    pub fn search_tags(&self, term: &str) -> Vec<Entry> {
        self.store.search_tags(term).into_iter().cloned().collect()
    }

    pub fn update_tags<I, S>(&mut self, id: &EntryId, tags: I) -> Result<&Entry, LibraryError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if !self.store.update_tags(id, tags) {
            return Err(LibraryError::NotFound(id.clone()));
        }
        self.store
            .find(id)
            .ok_or_else(|| LibraryError::NotFound(id.clone()))
    }

    pub fn stored_size_bytes(&self) -> u64 {
        self.store.stored_size_bytes()
    }

    /// Persisted form of the current collection.
    pub fn snapshot(&self) -> Vec<PersistedRecord> {
        self.store
            .all()
            .iter()
            .map(PersistedRecord::from_entry)
            .collect()
    }

    /// Save the whole collection through the backend selector.
    pub async fn persist_all(&self) -> SaveOutcome {
        self.selector.save(self.store.all()).await
    }

    /// Replace the session with what the backends hold, repaired.
    ///
    /// Entries whose payload did not survive are kept and flagged; missing
    /// thumbnails are queued for regeneration.
    #[tracing::instrument(name = "app.library.load_all", skip(self))]
    pub async fn load_all(&mut self) -> Vec<Entry> {
        let records = self.selector.load().await;
        let reconciliation = Reconciler::repair(records);
        let flagged = reconciliation.flagged_count();

        self.pending_thumbnails.clear();
        let skipped = self.store.replace_all(reconciliation.entries);
        if skipped > 0 {
            warn!(skipped, "Dropped loaded entries with repeated ids");
        }

        for job in reconciliation.thumbnail_jobs {
            self.submit_thumbnail(job);
        }

        info!(
            count = self.store.len(),
            flagged,
            tier = self.selector.active_tier().as_str(),
            "Library loaded"
        );
        self.store.all().to_vec()
    }

    /// Drop every entry and clear both persistence tiers.
    pub async fn clear_all(&mut self) {
        self.store.clear();
        self.pending_thumbnails.clear();
        self.selector.clear_all().await;
    }

    /// Write a generated thumbnail back. Returns `false` if the entry is gone.
    pub fn apply_thumbnail(&mut self, id: &EntryId, thumbnail: Thumbnail) -> bool {
        self.pending_thumbnails.remove(id);
        match self.store.find_mut(id) {
            Some(entry) => {
                entry.thumbnail = Some(thumbnail);
                true
            }
            None => false,
        }
    }

    pub fn subscribe_thumbnails(&self) -> Option<broadcast::Receiver<ThumbnailEvent>> {
        self.thumbnails.as_ref().map(ThumbnailWorkerHandle::subscribe)
    }

    /// Number of submitted thumbnail jobs not yet applied.
    pub fn pending_thumbnails(&self) -> usize {
        self.pending_thumbnails.len()
    }

    /// Apply every thumbnail event already received, without waiting.
    pub fn poll_thumbnails(&mut self) -> usize {
        let mut received = Vec::new();
        if let Some(rx) = self.thumbnail_events.as_mut() {
            loop {
                match rx.try_recv() {
                    Ok(event) => received.push(event),
                    Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
                }
            }
        }
        let mut applied = 0;
        for event in received {
            if self.handle_thumbnail_event(event) {
                applied += 1;
            }
        }
        applied
    }

    /// Wait up to `limit` for pending thumbnails and apply them.
    ///
    /// Returns how many thumbnails were applied.
    pub async fn drain_thumbnails(&mut self, limit: Duration) -> usize {
        let deadline = tokio::time::Instant::now() + limit;
        let mut applied = self.poll_thumbnails();

        while !self.pending_thumbnails.is_empty() {
            let Some(rx) = self.thumbnail_events.as_mut() else {
                break;
            };
            let event = match tokio::time::timeout_at(deadline, rx.recv()).await {
                Ok(Some(event)) => event,
                Ok(None) => break,
                Err(_) => {
                    warn!(
                        pending = self.pending_thumbnails.len(),
                        "Gave up waiting for thumbnails"
                    );
                    break;
                }
            };
            if self.handle_thumbnail_event(event) {
                applied += 1;
            }
        }
        applied
    }

    fn handle_thumbnail_event(&mut self, event: ThumbnailEvent) -> bool {
        match event {
            ThumbnailEvent::Ready {
                entry_id,
                thumbnail,
            } => self.apply_thumbnail(&entry_id, thumbnail),
            ThumbnailEvent::Failed { entry_id, error } => {
                debug!(entry_id = %entry_id, error = %error, "Thumbnail not applied");
                self.pending_thumbnails.remove(&entry_id);
                false
            }
        }
    }

    fn schedule_thumbnail(&mut self, id: &EntryId) {
        let job = self.store.find(id).and_then(ThumbnailJob::for_entry);
        if let Some(job) = job {
            self.submit_thumbnail(job);
        }
    }

    fn submit_thumbnail(&mut self, job: ThumbnailJob) {
        let Some(handle) = self.thumbnails.as_ref() else {
            return;
        };
        let entry_id = job.entry_id.clone();
        if handle.submit(job) {
            self.pending_thumbnails.insert(entry_id);
        }
    }
}
