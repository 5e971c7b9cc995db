//! # Task Queue Engine
//!
//! Unbounded FIFO of [`QueueItem`]s executed strictly one at a time.
//!
//! - `enqueue` validates, appends and wakes the worker; it never blocks
//! - `process_next` runs the head task to completion when nothing is in
//!   flight
//! - failures are task-local: logged, published as [`QueueEvent::Failed`]
//!   and counted as completed
//!
//! There is no cancellation and no timeout. A generation call that never
//! returns stalls the queue.

use config::Config;
use errors::QueueError;
use nb_core::{ChapterTarget, ContentStore, GenerationService, QueueItem, TaskKind};
use observability::{QueueTelemetry, TaskStatus};
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::{Arc, Weak};
use std::time::Instant;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{Instrument, info_span, instrument};

use crate::effects::apply_effects;
use crate::planner::{QueueSettings, TaskOutcome, plan_task};

const DEFAULT_EVENT_CAPACITY: usize = 64;

/// The task currently being executed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveTask {
    pub task_id: String,
    pub kind: &'static str,
    pub subject_id: String,
    /// Short status line for display.
    pub status_text: &'static str,
}

impl ActiveTask {
    fn from_item(item: &QueueItem) -> Self {
        let status_text = match item.kind {
            TaskKind::Summarize(_) => "Compressing Logic...",
            TaskKind::Create(_) => "Analyzing Content...",
        };
        Self {
            task_id: item.id.clone(),
            kind: item.kind.label(),
            subject_id: item.subject_id.clone(),
            status_text,
        }
    }
}

/// Progress snapshot for display. `batch_total` is reset when a new batch
/// starts on an idle queue.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueProgress {
    pub current: Option<ActiveTask>,
    pub remaining: usize,
    pub completed: usize,
    pub batch_total: usize,
}

impl QueueProgress {
    pub fn is_idle(&self) -> bool {
        self.current.is_none() && self.remaining == 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum QueueEvent {
    Started {
        task_id: String,
        kind: &'static str,
    },
    Succeeded {
        task_id: String,
        outcome: Option<TaskOutcome>,
    },
    Failed {
        task_id: String,
        message: String,
    },
}

impl QueueEvent {
    pub fn task_id(&self) -> &str {
        match self {
            Self::Started { task_id, .. }
            | Self::Succeeded { task_id, .. }
            | Self::Failed { task_id, .. } => task_id,
        }
    }
}

#[derive(Debug, Default)]
struct QueueState {
    pending: VecDeque<QueueItem>,
    current: Option<ActiveTask>,
    completed: usize,
    batch_total: usize,
}

impl QueueState {
    fn progress(&self) -> QueueProgress {
        QueueProgress {
            current: self.current.clone(),
            remaining: self.pending.len(),
            completed: self.completed,
            batch_total: self.batch_total,
        }
    }
}

struct QueueInner {
    state: Mutex<QueueState>,
    store: Arc<dyn ContentStore>,
    generation: Arc<dyn GenerationService>,
    settings: QueueSettings,
    telemetry: QueueTelemetry,
    wake_tx: mpsc::UnboundedSender<()>,
    wake_rx: Mutex<Option<mpsc::UnboundedReceiver<()>>>,
    progress_tx: watch::Sender<QueueProgress>,
    events_tx: broadcast::Sender<QueueEvent>,
}

/// Handle to the queue. Clones share the same queue.
#[derive(Clone)]
pub struct TaskQueue {
    inner: Arc<QueueInner>,
}

pub struct TaskQueueBuilder {
    store: Arc<dyn ContentStore>,
    generation: Arc<dyn GenerationService>,
    settings: QueueSettings,
    telemetry: QueueTelemetry,
    event_capacity: usize,
}

impl TaskQueueBuilder {
    pub fn settings(mut self, settings: QueueSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn telemetry(mut self, telemetry: QueueTelemetry) -> Self {
        self.telemetry = telemetry;
        self
    }

    pub fn event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity.max(1);
        self
    }

    /// Planner settings, metrics switch and event capacity from `config`.
    pub fn with_config(self, config: &Config) -> Self {
        self.settings(QueueSettings::from_config(&config.generation))
            .telemetry(QueueTelemetry::new(config.observability.metrics_enabled))
            .event_capacity(config.queue.event_capacity)
    }

    pub fn build(self) -> TaskQueue {
        let (wake_tx, wake_rx) = mpsc::unbounded_channel();
        let (progress_tx, _) = watch::channel(QueueProgress::default());
        let (events_tx, _) = broadcast::channel(self.event_capacity);
        TaskQueue {
            inner: Arc::new(QueueInner {
                state: Mutex::new(QueueState::default()),
                store: self.store,
                generation: self.generation,
                settings: self.settings,
                telemetry: self.telemetry,
                wake_tx,
                wake_rx: Mutex::new(Some(wake_rx)),
                progress_tx,
                events_tx,
            }),
        }
    }
}

impl TaskQueue {
    pub fn builder(
        store: Arc<dyn ContentStore>,
        generation: Arc<dyn GenerationService>,
    ) -> TaskQueueBuilder {
        TaskQueueBuilder {
            store,
            generation,
            settings: QueueSettings::default(),
            telemetry: QueueTelemetry::default(),
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }

    pub fn new(store: Arc<dyn ContentStore>, generation: Arc<dyn GenerationService>) -> Self {
        Self::builder(store, generation).build()
    }

    pub fn store(&self) -> &Arc<dyn ContentStore> {
        &self.inner.store
    }

    pub fn generation(&self) -> &Arc<dyn GenerationService> {
        &self.inner.generation
    }

    /// Appends `item` to the tail of the queue.
    ///
    /// Rejected without queueing when a summary task does not target a
    /// summary subject, or a new chapter has a blank title.
    pub fn enqueue(&self, item: QueueItem) -> Result<(), QueueError> {
        self.validate(&item)?;

        {
            let mut state = self.inner.state.lock();
            if state.pending.is_empty() && state.current.is_none() {
                state.completed = 0;
                state.batch_total = 1;
            } else {
                state.batch_total += 1;
            }
            tracing::debug!(task_id = %item.id, kind = item.kind.label(), "Enqueued task");
            state.pending.push_back(item);
            self.publish(&state);
        }

        // The worker may not be running; pending items are picked up on spawn.
        let _ = self.inner.wake_tx.send(());
        Ok(())
    }

    fn validate(&self, item: &QueueItem) -> Result<(), QueueError> {
        if let ChapterTarget::New { title } = &item.chapter
            && title.trim().is_empty()
        {
            return Err(QueueError::missing_prerequisite(
                "new chapter requires a non-empty title",
            ));
        }

        if let TaskKind::Summarize(_) = item.kind {
            let is_summary = self
                .inner
                .store
                .get_subject(&item.subject_id)
                .is_some_and(|subject| subject.is_summary);
            if !is_summary {
                return Err(QueueError::missing_prerequisite(format!(
                    "no summary notebook with id {}",
                    item.subject_id
                )));
            }
        }
        Ok(())
    }

    pub fn progress(&self) -> QueueProgress {
        self.inner.state.lock().progress()
    }

    pub fn watch_progress(&self) -> watch::Receiver<QueueProgress> {
        self.inner.progress_tx.subscribe()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<QueueEvent> {
        self.inner.events_tx.subscribe()
    }

    fn publish(&self, state: &QueueState) {
        self.inner.telemetry.set_queue_depth(state.pending.len());
        self.inner.progress_tx.send_replace(state.progress());
    }

    /// Runs the head task if nothing is in flight.
    ///
    /// Returns `false` when the queue is empty or another task is running.
    pub async fn process_next(&self) -> bool {
        let item = {
            let mut state = self.inner.state.lock();
            if state.current.is_some() {
                return false;
            }
            let Some(item) = state.pending.pop_front() else {
                return false;
            };
            state.current = Some(ActiveTask::from_item(&item));
            self.publish(&state);
            item
        };

        let kind = item.kind.label();
        let _ = self.inner.events_tx.send(QueueEvent::Started {
            task_id: item.id.clone(),
            kind,
        });

        let started = Instant::now();
        let status = match self.run_task(&item).await {
            Ok(outcome) => {
                tracing::info!(
                    task_id = %item.id,
                    kind,
                    note_id = outcome.as_ref().map(TaskOutcome::note_id),
                    "Task completed"
                );
                let _ = self.inner.events_tx.send(QueueEvent::Succeeded {
                    task_id: item.id.clone(),
                    outcome,
                });
                TaskStatus::Succeeded
            }
            Err(e) => {
                tracing::error!(task_id = %item.id, kind, error = %e, "Failed to process task");
                let _ = self.inner.events_tx.send(QueueEvent::Failed {
                    task_id: item.id.clone(),
                    message: e.to_string(),
                });
                TaskStatus::Failed
            }
        };
        self.inner
            .telemetry
            .record_task(kind, status, started.elapsed().as_secs_f64());

        let mut state = self.inner.state.lock();
        state.current = None;
        state.completed += 1;
        self.publish(&state);
        true
    }

    #[instrument(skip_all, fields(task_id = %item.id, kind = item.kind.label()))]
    async fn run_task(&self, item: &QueueItem) -> Result<Option<TaskOutcome>, QueueError> {
        let store = self.inner.store.as_ref();

        let chapter_id = match &item.chapter {
            ChapterTarget::Existing { chapter_id } => chapter_id.clone(),
            ChapterTarget::New { title } => {
                let id = store.create_chapter(title, &item.subject_id)?;
                tracing::info!(chapter_id = %id, title = %title, "Created chapter for task");
                id
            }
        };

        // New notes take the task id; a resubmitted item needs a fresh one.
        let renamed;
        let item = if store.get_note(&item.id).is_some() {
            renamed = item.clone().with_id(uuid::Uuid::new_v4().to_string());
            tracing::debug!(note_id = %renamed.id, "Task id already used by a note");
            &renamed
        } else {
            item
        };

        let chapter_notes = store.list_notes_by_chapter(&chapter_id);
        let plan = plan_task(
            item,
            &chapter_id,
            &chapter_notes,
            self.inner.generation.as_ref(),
            &self.inner.settings,
        )
        .await?;

        let decision = plan.placement.as_ref().map_or("direct", |p| p.decision());
        tracing::debug!(decision, "Resolved placement");
        self.inner.telemetry.record_placement(decision);

        let outcome = plan.outcome();
        apply_effects(store, plan.effects)?;
        Ok(outcome)
    }

    /// Processes tasks until the queue is empty. Returns how many ran.
    pub async fn drain(&self) -> usize {
        let mut processed = 0;
        while self.process_next().await {
            processed += 1;
        }
        processed
    }

    /// Resolves once nothing is pending or in flight.
    pub async fn wait_until_idle(&self) {
        let mut progress = self.watch_progress();
        // The sender lives as long as `self`.
        let _ = progress.wait_for(QueueProgress::is_idle).await;
    }

    /// Starts the background driver. Only the first call spawns a worker;
    /// later calls return `None`.
    ///
    /// The worker holds a weak handle and exits once every [`TaskQueue`]
    /// clone is dropped.
    pub fn spawn_worker(&self) -> Option<JoinHandle<()>> {
        let mut wake_rx = self.inner.wake_rx.lock().take()?;
        let weak: Weak<QueueInner> = Arc::downgrade(&self.inner);

        let span = info_span!("queue_worker");
        let handle = tokio::spawn(
            async move {
                tracing::debug!("Queue worker started");
                loop {
                    let Some(inner) = weak.upgrade() else { break };
                    TaskQueue { inner }.drain().await;
                    if wake_rx.recv().await.is_none() {
                        break;
                    }
                }
                tracing::debug!("Queue worker stopped");
            }
            .instrument(span),
        );
        Some(handle)
    }
}
