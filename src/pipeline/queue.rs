//! Task contract and an in-process, retrying task queue

use crate::config::Config;
use crate::error::{EntityKind, RecommenderError, Result};
use crate::pipeline::jobs::{FeaturePipeline, JobOutcome};
use crate::store::ProfileStore;
use log::{debug, error, warn};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Notify};

/// A named job with a single primary-key argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Task {
    ProcessCandidate(u64),
    EmbedCandidate(u64),
    ProcessPosting(u64),
    EmbedPosting(u64),
}

impl Task {
    /// The lexical job that starts feature computation for an entity.
    pub fn process(kind: EntityKind, id: u64) -> Result<Self> {
        match kind {
            EntityKind::Candidate => Ok(Task::ProcessCandidate(id)),
            EntityKind::Posting => Ok(Task::ProcessPosting(id)),
            EntityKind::Employer => Err(RecommenderError::InvalidInput(
                "employers have no features to process".to_string(),
            )),
        }
    }

    /// Resolve a task name received from an external queue.
    pub fn from_name(name: &str, id: u64) -> Result<Self> {
        match name {
            "process_candidato" => Ok(Task::ProcessCandidate(id)),
            "embed_candidato" => Ok(Task::EmbedCandidate(id)),
            "process_vaga" => Ok(Task::ProcessPosting(id)),
            "embed_vaga" => Ok(Task::EmbedPosting(id)),
            _ => Err(RecommenderError::Queue(format!("unknown task: {}", name))),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Task::ProcessCandidate(_) => "process_candidato",
            Task::EmbedCandidate(_) => "embed_candidato",
            Task::ProcessPosting(_) => "process_vaga",
            Task::EmbedPosting(_) => "embed_vaga",
        }
    }

    pub fn entity_id(&self) -> u64 {
        match self {
            Task::ProcessCandidate(id)
            | Task::EmbedCandidate(id)
            | Task::ProcessPosting(id)
            | Task::EmbedPosting(id) => *id,
        }
    }

    /// The task to enqueue once this one completes.
    pub fn follow_up(&self) -> Option<Task> {
        match self {
            Task::ProcessCandidate(id) => Some(Task::EmbedCandidate(*id)),
            Task::ProcessPosting(id) => Some(Task::EmbedPosting(*id)),
            Task::EmbedCandidate(_) | Task::EmbedPosting(_) => None,
        }
    }
}

impl std::fmt::Display for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.name(), self.entity_id())
    }
}

/// What the core needs from a task queue: at-least-once delivery with
/// bounded retries.
pub trait TaskQueue: Send + Sync {
    fn enqueue(&self, task: Task) -> Result<()>;
}

/// Runs one task to completion.
pub trait TaskHandler: Send + Sync + 'static {
    fn handle(&self, task: Task) -> impl Future<Output = Result<JobOutcome>> + Send;
}

impl<S: ProfileStore + 'static> TaskHandler for FeaturePipeline<S> {
    async fn handle(&self, task: Task) -> Result<JobOutcome> {
        match task {
            Task::ProcessCandidate(id) => self.process_candidate_text(id).await,
            Task::EmbedCandidate(id) => self.process_candidate_embedding(id).await,
            Task::ProcessPosting(id) => self.process_posting_text(id).await,
            Task::EmbedPosting(id) => self.process_posting_embedding(id).await,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub retry_delay: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_attempts: config.pipeline.max_attempts.max(1),
            retry_delay: config.retry_delay(),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            retry_delay: Duration::from_secs(60),
        }
    }
}

/// Counters over the lifetime of a queue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct QueueStats {
    pub completed: usize,
    pub skipped: usize,
    pub retried: usize,
    pub failed: usize,
}

#[derive(Debug)]
struct Delivery {
    task: Task,
    attempt: u32,
}

#[derive(Default)]
struct QueueState {
    pending: AtomicUsize,
    idle: Notify,
    completed: AtomicUsize,
    skipped: AtomicUsize,
    retried: AtomicUsize,
    failed: AtomicUsize,
}

impl QueueState {
    fn finish_one(&self) {
        if self.pending.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.idle.notify_waiters();
        }
    }
}

/// Tokio-backed queue: every delivery runs as its own task, so jobs for
/// different entities proceed concurrently.
///
/// Retryable failures are redelivered after `retry_delay` until
/// `max_attempts` is reached. A completed lexical task enqueues its
/// embedding task.
#[derive(Clone)]
pub struct LocalQueue {
    sender: mpsc::UnboundedSender<Delivery>,
    state: Arc<QueueState>,
}

impl LocalQueue {
    /// Start the dispatcher on the current tokio runtime.
    pub fn start<H: TaskHandler>(handler: Arc<H>, policy: RetryPolicy) -> Self {
        let (sender, mut receiver) = mpsc::unbounded_channel::<Delivery>();
        let queue = Self {
            sender,
            state: Arc::new(QueueState::default()),
        };

        let dispatcher = queue.clone();
        tokio::spawn(async move {
            while let Some(delivery) = receiver.recv().await {
                let handler = Arc::clone(&handler);
                let queue = dispatcher.clone();
                tokio::spawn(async move {
                    queue.execute(handler.as_ref(), delivery, policy).await;
                });
            }
        });

        queue
    }

    async fn execute<H: TaskHandler>(&self, handler: &H, delivery: Delivery, policy: RetryPolicy) {
        let Delivery { task, attempt } = delivery;
        debug!("Running {} (attempt {}/{})", task, attempt, policy.max_attempts);

        match handler.handle(task).await {
            Ok(JobOutcome::Completed) => {
                self.state.completed.fetch_add(1, Ordering::SeqCst);
                if let Some(next) = task.follow_up() {
                    if let Err(e) = self.enqueue(next) {
                        error!("Could not enqueue {}: {}", next, e);
                    }
                }
            }
            Ok(JobOutcome::Skipped) => {
                self.state.skipped.fetch_add(1, Ordering::SeqCst);
            }
            Err(e) if e.is_retryable() && attempt < policy.max_attempts => {
                warn!(
                    "{} failed (attempt {}/{}), retrying in {:?}: {}",
                    task, attempt, policy.max_attempts, policy.retry_delay, e
                );
                self.state.retried.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(policy.retry_delay).await;
                if let Err(e) = self.send(Delivery {
                    task,
                    attempt: attempt + 1,
                }) {
                    error!("Could not redeliver {}: {}", task, e);
                }
            }
            Err(e) => {
                error!("{} failed after {} attempt(s): {}", task, attempt, e);
                self.state.failed.fetch_add(1, Ordering::SeqCst);
            }
        }

        self.state.finish_one();
    }

    fn send(&self, delivery: Delivery) -> Result<()> {
        self.state.pending.fetch_add(1, Ordering::SeqCst);
        self.sender.send(delivery).map_err(|e| {
            self.state.finish_one();
            RecommenderError::Queue(format!("queue is closed, dropped {}", e.0.task))
        })
    }

    /// Wait until no task is queued, running or waiting for a retry.
    pub async fn drain(&self) {
        loop {
            let idle = self.state.idle.notified();
            if self.state.pending.load(Ordering::SeqCst) == 0 {
                return;
            }
            idle.await;
        }
    }

    pub fn pending(&self) -> usize {
        self.state.pending.load(Ordering::SeqCst)
    }

    pub fn stats(&self) -> QueueStats {
        QueueStats {
            completed: self.state.completed.load(Ordering::SeqCst),
            skipped: self.state.skipped.load(Ordering::SeqCst),
            retried: self.state.retried.load(Ordering::SeqCst),
            failed: self.state.failed.load(Ordering::SeqCst),
        }
    }
}

impl TaskQueue for LocalQueue {
    fn enqueue(&self, task: Task) -> Result<()> {
        debug!("Enqueued {}", task);
        self.send(Delivery { task, attempt: 1 })
    }
}
