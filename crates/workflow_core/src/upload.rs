//! Simulated document upload and classification.
//!
//! Every enqueued file gets its own task that walks it through
//! uploading -> processing -> complete on a timer. Each task owns a
//! [`CancellationToken`]; removing the file cancels the token, and every
//! scheduled update re-checks both the token and the file's presence on the
//! board before it touches anything.

use std::{collections::HashMap, sync::Arc, time::Duration};

use serde::{Deserialize, Serialize};
use shared::domain::{Classification, UploadId, UploadStatus, UploadedFile};
use tokio::{
    sync::{broadcast, watch, Mutex},
    task::JoinHandle,
    time::{interval_at, Instant},
};
use tracing::{debug, info, warn};

use crate::{classifier::Classifier, document::format_file_size};

const EVENT_CHANNEL_CAPACITY: usize = 256;
const MIN_TICK: Duration = Duration::from_millis(1);
const MIN_PROGRESS_STEP: u8 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadTimings {
    #[serde(with = "millis")]
    pub tick: Duration,
    pub progress_step: u8,
    #[serde(with = "millis")]
    pub processing_delay: Duration,
    #[serde(with = "millis")]
    pub classification_delay: Duration,
}

impl Default for UploadTimings {
    fn default() -> Self {
        Self {
            tick: Duration::from_millis(200),
            progress_step: 10,
            processing_delay: Duration::from_millis(500),
            classification_delay: Duration::from_millis(2000),
        }
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(deserializer)?))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UploadEvent {
    Queued { id: UploadId, name: String },
    Progress { id: UploadId, progress: u8 },
    Processing { id: UploadId },
    Completed { id: UploadId, classification: Classification },
    Failed { id: UploadId, reason: String },
    Removed { id: UploadId },
}

#[derive(Debug, Clone, Default)]
pub struct UploadBoard {
    files: Vec<UploadedFile>,
}

impl UploadBoard {
    pub fn files(&self) -> &[UploadedFile] {
        &self.files
    }

    pub fn get(&self, id: UploadId) -> Option<&UploadedFile> {
        self.files.iter().find(|file| file.id == id)
    }

    fn get_mut(&mut self, id: UploadId) -> Option<&mut UploadedFile> {
        self.files.iter_mut().find(|file| file.id == id)
    }

    pub fn contains(&self, id: UploadId) -> bool {
        self.get(id).is_some()
    }

    pub fn remove(&mut self, id: UploadId) -> Option<UploadedFile> {
        let pos = self.files.iter().position(|file| file.id == id)?;
        Some(self.files.remove(pos))
    }

    pub fn all_settled(&self) -> bool {
        self.files.iter().all(|file| file.status.is_terminal())
    }
}

/// Cancellation flag observed by a simulation task. Dropping the paired
/// [`CancelHandle`] cancels it as well.
#[derive(Clone)]
pub struct CancellationToken {
    rx: watch::Receiver<bool>,
}

pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

pub fn cancellation_pair() -> (CancelHandle, CancellationToken) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle { tx }, CancellationToken { rx })
}

impl CancelHandle {
    pub fn cancel(&self) {
        let _ = self.tx.send(true);
    }
}

impl CancellationToken {
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow() || self.rx.has_changed().is_err()
    }

    pub async fn cancelled(&mut self) {
        // A closed channel means the handle was dropped.
        let _ = self.rx.wait_for(|cancelled| *cancelled).await;
    }

    /// Sleeps for `duration`; returns false if cancelled first.
    pub async fn sleep(&mut self, duration: Duration) -> bool {
        let elapsed = tokio::select! {
            _ = tokio::time::sleep(duration) => true,
            _ = self.cancelled() => false,
        };
        elapsed && !self.is_cancelled()
    }
}

struct UploadTask {
    cancel: CancelHandle,
    handle: JoinHandle<()>,
}

pub struct UploadSimulator {
    board: Arc<Mutex<UploadBoard>>,
    classifier: Arc<dyn Classifier>,
    timings: UploadTimings,
    tasks: HashMap<UploadId, UploadTask>,
    events: broadcast::Sender<UploadEvent>,
    next_id: u64,
}

impl UploadSimulator {
    pub fn new(classifier: Arc<dyn Classifier>, timings: UploadTimings) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            board: Arc::new(Mutex::new(UploadBoard::default())),
            classifier,
            timings,
            tasks: HashMap::new(),
            events,
            next_id: 1,
        }
    }

    pub fn board(&self) -> Arc<Mutex<UploadBoard>> {
        Arc::clone(&self.board)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<UploadEvent> {
        self.events.subscribe()
    }

    pub async fn snapshot(&self) -> Vec<UploadedFile> {
        self.board.lock().await.files().to_vec()
    }

    pub async fn enqueue(
        &mut self,
        name: impl Into<String>,
        size_bytes: u64,
        mime_type: impl Into<String>,
    ) -> UploadId {
        self.enqueue_into(name, size_bytes, mime_type, None).await
    }

    /// Like [`enqueue`](Self::enqueue), filing the upload under `target_folder`.
    pub async fn enqueue_into(
        &mut self,
        name: impl Into<String>,
        size_bytes: u64,
        mime_type: impl Into<String>,
        target_folder: Option<String>,
    ) -> UploadId {
        self.tasks.retain(|_, task| !task.handle.is_finished());

        let id = UploadId(self.next_id);
        self.next_id += 1;
        let name = name.into();

        self.board.lock().await.files.push(UploadedFile {
            id,
            name: name.clone(),
            size: format_file_size(size_bytes),
            mime_type: mime_type.into(),
            status: UploadStatus::Uploading,
            progress: 0,
            target_folder: target_folder.clone(),
            classification: None,
        });
        info!(upload_id = %id, file_name = %name, folder = ?target_folder, "upload queued");
        let _ = self.events.send(UploadEvent::Queued {
            id,
            name: name.clone(),
        });

        let (cancel, token) = cancellation_pair();
        let run = UploadRun {
            id,
            name,
            board: Arc::clone(&self.board),
            classifier: Arc::clone(&self.classifier),
            timings: self.timings,
            events: self.events.clone(),
            token,
        };
        let handle = tokio::spawn(run.drive());
        self.tasks.insert(id, UploadTask { cancel, handle });
        id
    }

    /// Drops the file and stops its simulation. Unknown ids are ignored.
    pub async fn remove(&mut self, id: UploadId) -> bool {
        if let Some(task) = self.tasks.remove(&id) {
            task.cancel.cancel();
        }
        let removed = self.board.lock().await.remove(id).is_some();
        if removed {
            debug!(upload_id = %id, "upload removed");
            let _ = self.events.send(UploadEvent::Removed { id });
        }
        removed
    }

    /// Waits for every outstanding simulation task to finish.
    pub async fn settle(&mut self) {
        for (id, task) in self.tasks.drain() {
            if let Err(err) = task.handle.await {
                warn!(upload_id = %id, error = %err, "upload task ended abnormally");
            }
        }
    }
}

impl Drop for UploadSimulator {
    fn drop(&mut self) {
        for task in self.tasks.values() {
            task.cancel.cancel();
        }
    }
}

struct UploadRun {
    id: UploadId,
    name: String,
    board: Arc<Mutex<UploadBoard>>,
    classifier: Arc<dyn Classifier>,
    timings: UploadTimings,
    events: broadcast::Sender<UploadEvent>,
    token: CancellationToken,
}

enum TickOutcome {
    Continue,
    Uploaded,
    Stop,
}

impl UploadRun {
    async fn drive(mut self) {
        let period = self.timings.tick.max(MIN_TICK);
        let mut ticker = interval_at(Instant::now() + period, period);
        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = self.token.cancelled() => {
                    debug!(upload_id = %self.id, "upload cancelled during transfer");
                    return;
                }
            }
            match self.apply_tick().await {
                TickOutcome::Continue => {}
                TickOutcome::Uploaded => break,
                TickOutcome::Stop => return,
            }
        }

        let delay = self.timings.processing_delay + self.timings.classification_delay;
        if !self.token.sleep(delay).await {
            debug!(upload_id = %self.id, "upload cancelled during processing");
            return;
        }

        let outcome = self.classifier.classify(&self.name).await;

        let mut board = self.board.lock().await;
        if self.token.is_cancelled() {
            return;
        }
        let Some(file) = board.get_mut(self.id) else {
            debug!(upload_id = %self.id, "classification dropped for removed upload");
            return;
        };
        let event = match outcome {
            Ok(classification) => {
                file.status = UploadStatus::Complete;
                file.progress = 100;
                file.classification = Some(classification.clone());
                info!(
                    upload_id = %self.id,
                    category = %classification.category,
                    confidence = classification.confidence,
                    "upload classified"
                );
                UploadEvent::Completed {
                    id: self.id,
                    classification,
                }
            }
            Err(err) => {
                file.status = UploadStatus::Error;
                warn!(upload_id = %self.id, error = %err, "upload classification failed");
                UploadEvent::Failed {
                    id: self.id,
                    reason: err.to_string(),
                }
            }
        };
        drop(board);
        let _ = self.events.send(event);
    }

    async fn apply_tick(&self) -> TickOutcome {
        let mut board = self.board.lock().await;
        if self.token.is_cancelled() {
            return TickOutcome::Stop;
        }
        let Some(file) = board.get_mut(self.id) else {
            debug!(upload_id = %self.id, "tick dropped for removed upload");
            return TickOutcome::Stop;
        };
        if file.status != UploadStatus::Uploading {
            return TickOutcome::Stop;
        }

        file.progress = file
            .progress
            .saturating_add(self.timings.progress_step.max(MIN_PROGRESS_STEP))
            .min(100);
        let progress = file.progress;
        if progress < 100 {
            drop(board);
            let _ = self.events.send(UploadEvent::Progress {
                id: self.id,
                progress,
            });
            return TickOutcome::Continue;
        }

        file.status = UploadStatus::Processing;
        drop(board);
        debug!(upload_id = %self.id, "upload finished, processing");
        let _ = self.events.send(UploadEvent::Progress {
            id: self.id,
            progress,
        });
        let _ = self.events.send(UploadEvent::Processing { id: self.id });
        TickOutcome::Uploaded
    }
}

#[cfg(test)]
#[path = "tests/upload_tests.rs"]
mod tests;
