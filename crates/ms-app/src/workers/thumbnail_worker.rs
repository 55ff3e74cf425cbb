//! Background worker that derives thumbnails from local image bytes.
//! 从本地图像字节生成缩略图的后台工作者。

use std::sync::Arc;

use ms_core::entry::Thumbnail;
use ms_core::ids::EntryId;
use ms_core::ports::ThumbnailGeneratorPort;
use ms_core::reconcile::ThumbnailJob;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info_span, warn, Instrument};

const EVENT_CAPACITY: usize = 64;

/// Completion of one thumbnail job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThumbnailEvent {
    Ready {
        entry_id: EntryId,
        thumbnail: Thumbnail,
    },
    Failed {
        entry_id: EntryId,
        error: String,
    },
}

impl ThumbnailEvent {
    pub fn entry_id(&self) -> &EntryId {
        match self {
            ThumbnailEvent::Ready { entry_id, .. } | ThumbnailEvent::Failed { entry_id, .. } => {
                entry_id
            }
        }
    }
}

type CompletionSender = mpsc::UnboundedSender<ThumbnailEvent>;

/// Sending side of a running [`ThumbnailWorker`].
///
/// Jobs are fire-and-forget. Completions go to every broadcast subscriber,
/// which may lag and miss events, and to every completion receiver, which
/// never misses one.
#[derive(Clone)]
pub struct ThumbnailWorkerHandle {
    jobs: mpsc::UnboundedSender<ThumbnailJob>,
    events: broadcast::Sender<ThumbnailEvent>,
    listeners: mpsc::UnboundedSender<CompletionSender>,
}

impl ThumbnailWorkerHandle {
    /// Queue a job. Returns `false` once the worker has stopped.
    pub fn submit(&self, job: ThumbnailJob) -> bool {
        let entry_id = job.entry_id.clone();
        match self.jobs.send(job) {
            Ok(()) => true,
            Err(_) => {
                warn!(entry_id = %entry_id, "Thumbnail worker stopped; job dropped");
                false
            }
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ThumbnailEvent> {
        self.events.subscribe()
    }

    /// Unbounded receiver of every completion of a job submitted after this
    /// call. Closed once the worker has stopped.
    pub fn completions(&self) -> mpsc::UnboundedReceiver<ThumbnailEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        if self.listeners.send(tx).is_err() {
            debug!("Thumbnail worker stopped; completion receiver is closed");
        }
        rx
    }
}

pub struct ThumbnailWorker {
    jobs_rx: mpsc::UnboundedReceiver<ThumbnailJob>,
    generator: Arc<dyn ThumbnailGeneratorPort>,
    events: broadcast::Sender<ThumbnailEvent>,
    listeners_rx: mpsc::UnboundedReceiver<CompletionSender>,
    listeners: Vec<CompletionSender>,
}

impl ThumbnailWorker {
    pub fn new(generator: Arc<dyn ThumbnailGeneratorPort>) -> (Self, ThumbnailWorkerHandle) {
        let (jobs_tx, jobs_rx) = mpsc::unbounded_channel();
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let (listeners_tx, listeners_rx) = mpsc::unbounded_channel();
        let worker = Self {
            jobs_rx,
            generator,
            events: events.clone(),
            listeners_rx,
            listeners: Vec::new(),
        };
        let handle = ThumbnailWorkerHandle {
            jobs: jobs_tx,
            events,
            listeners: listeners_tx,
        };
        (worker, handle)
    }

    /// Start the worker on the current tokio runtime.
    pub fn spawn(generator: Arc<dyn ThumbnailGeneratorPort>) -> ThumbnailWorkerHandle {
        let (worker, handle) = Self::new(generator);
        tokio::spawn(worker.run());
        handle
    }

    /// Run the worker loop until every handle is dropped.
    /// 运行工作循环，直到所有句柄被释放。
    pub async fn run(mut self) {
        while let Some(job) = self.jobs_rx.recv().await {
            let span = info_span!(
                "app.thumbnail_worker",
                entry_id = %job.entry_id,
                source_mime = %job.source_mime,
            );
            let event = self.process(job).instrument(span).await;
            self.publish(event);
        }
        debug!("Thumbnail worker stopped");
    }

    fn publish(&mut self, event: ThumbnailEvent) {
        // A receiver registered before the job was queued is already here.
        while let Ok(listener) = self.listeners_rx.try_recv() {
            self.listeners.push(listener);
        }
        self.listeners
            .retain(|listener| listener.send(event.clone()).is_ok());
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    async fn process(&self, job: ThumbnailJob) -> ThumbnailEvent {
        match self.generator.generate_thumbnail(&job.source).await {
            Ok(generated) => {
                debug!(
                    width = generated.original_width,
                    height = generated.original_height,
                    bytes = generated.thumbnail_bytes.len(),
                    "Thumbnail generated"
                );
                ThumbnailEvent::Ready {
                    entry_id: job.entry_id,
                    thumbnail: Thumbnail::new(
                        generated.thumbnail_mime_type,
                        generated.thumbnail_bytes,
                    ),
                }
            }
            Err(err) => {
                warn!(error = %err, "Thumbnail generation failed");
                ThumbnailEvent::Failed {
                    entry_id: job.entry_id,
                    error: format!("{err:#}"),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use async_trait::async_trait;
    use ms_core::entry::MimeType;
    use ms_core::ports::GeneratedThumbnail;

    struct MockGenerator;

    #[async_trait]
    impl ThumbnailGeneratorPort for MockGenerator {
        async fn generate_thumbnail(&self, image_bytes: &[u8]) -> Result<GeneratedThumbnail> {
            if image_bytes.is_empty() {
                anyhow::bail!("empty image");
            }
            Ok(GeneratedThumbnail {
                thumbnail_bytes: image_bytes.iter().rev().copied().collect(),
                thumbnail_mime_type: MimeType::image_jpeg(),
                original_width: 2,
                original_height: 2,
            })
        }
    }

    fn job(id: &str, source: Vec<u8>) -> ThumbnailJob {
        ThumbnailJob {
            entry_id: EntryId::from(id),
            source_mime: MimeType("image/png".to_string()),
            source,
        }
    }

    #[tokio::test]
    async fn test_worker_publishes_ready_and_failed_events() {
        let handle = ThumbnailWorker::spawn(Arc::new(MockGenerator));
        let mut events = handle.subscribe();

        assert!(handle.submit(job("a", vec![1, 2])));
        assert!(handle.submit(job("b", vec![])));

        let first = events.recv().await.unwrap();
        assert_eq!(
            first,
            ThumbnailEvent::Ready {
                entry_id: EntryId::from("a"),
                thumbnail: Thumbnail::new(MimeType::image_jpeg(), vec![2, 1]),
            }
        );

        let second = events.recv().await.unwrap();
        assert!(matches!(second, ThumbnailEvent::Failed { .. }));
        assert_eq!(second.entry_id().as_str(), "b");
    }

    #[tokio::test]
    async fn test_completions_survive_a_burst_larger_than_the_broadcast_buffer() {
        let handle = ThumbnailWorker::spawn(Arc::new(MockGenerator));
        let mut completions = handle.completions();
        let mut lagging = handle.subscribe();
        let total = EVENT_CAPACITY * 2;

        for i in 0..total {
            assert!(handle.submit(job(&format!("e{i}"), vec![1, i as u8])));
        }

        for i in 0..total {
            let event = completions.recv().await.unwrap();
            assert_eq!(event.entry_id().as_str(), format!("e{i}"));
        }
        assert!(matches!(
            lagging.recv().await,
            Err(broadcast::error::RecvError::Lagged(_))
        ));
    }

    #[tokio::test]
    async fn test_completions_close_when_worker_stops() {
        let (worker, handle) = ThumbnailWorker::new(Arc::new(MockGenerator));
        let mut completions = handle.completions();
        drop(worker);

        assert!(completions.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_submit_after_worker_stopped_returns_false() {
        let (worker, handle) = ThumbnailWorker::new(Arc::new(MockGenerator));
        drop(worker);

        assert!(!handle.submit(job("a", vec![1])));
    }
}
