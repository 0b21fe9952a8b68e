//! Session-scoped state and the queue-advancing operations.
//!
//! All the mutable state an interactive session owns (the generation
//! queue, the prewarm cache, and the pointer to the currently running
//! job) lives in one explicit [`SessionState`] value instead of
//! ambient globals, so every transition is a plain function of
//! (state, input) and testable without a framework runtime.
//!
//! Single-worker discipline: at most one queue item runs at a time,
//! regardless of the executor's pool size, so there is never more than
//! one completion to reconcile.

use chrono::Utc;
use log::{info, warn};

use crate::config::Settings;
use crate::error::WorkerError;
use crate::prewarm::PrewarmCache;
use crate::queue::{GenerationQueue, QueueItem, QueueStatus, Submission};
use crate::worker::{GenerationExecutor, JobRecord, JobStatus, RuntimeContext};

/// The queue item currently backed by a live job record.
#[derive(Debug)]
pub struct CurrentJob {
    pub queue_id: String,
    pub job: JobRecord,
}

pub struct SessionState {
    pub queue: GenerationQueue,
    pub prewarm: PrewarmCache,
    current: Option<CurrentJob>,
}

impl SessionState {
    pub fn new(settings: &Settings) -> Self {
        Self {
            queue: GenerationQueue::new(),
            prewarm: PrewarmCache::new(settings.prewarm_capacity),
            current: None,
        }
    }

    /// The live job, if one is tracked.
    pub fn current(&self) -> Option<&CurrentJob> {
        self.current.as_ref()
    }

    /// Enqueues a submission unless an equivalent request is already
    /// queued or running. Returns whether the item was enqueued.
    pub fn submit(&mut self, submission: Submission) -> bool {
        if self.queue.is_duplicate(
            &submission.signature,
            submission.mode,
            submission.num_items,
            &submission.subject,
            &submission.unit,
        ) {
            info!(
                "Ignoring duplicate generation request for '{}'",
                submission.source_name
            );
            return false;
        }

        self.queue.enqueue(QueueItem::new(submission));
        true
    }

    /// Starts the first queued item if nothing is running.
    ///
    /// Idle means: no current job is tracked *and* no queue item claims
    /// to be running. Returns whether a job was started. Submission
    /// itself never blocks on model I/O.
    pub fn start_next_if_idle(
        &mut self,
        runtime: &RuntimeContext,
        executor: &GenerationExecutor,
    ) -> Result<bool, WorkerError> {
        if self.current.is_some() || self.queue.has_running() {
            return Ok(false);
        }

        let Some(index) = self.queue.next_queued() else {
            return Ok(false);
        };

        // Build params before mutating the item, so a failed submit
        // leaves the queue untouched.
        let (params, queue_id) = {
            let item = self.queue.get_at(index).expect("index from next_queued");
            (item.to_params(), item.id.clone())
        };

        let job = JobRecord::start(params, runtime, executor)?;

        let item = self.queue.get_at_mut(index).expect("index from next_queued");
        item.status = QueueStatus::Running;
        item.started_at = Some(Utc::now());

        info!("Queue item {} started as job {}", queue_id, job.id);
        self.current = Some(CurrentJob { queue_id, job });
        Ok(true)
    }

    /// Polls the tracked job once; on completion, reconciles its
    /// outcome onto the originating queue item, clears the tracking,
    /// and returns the finished record so its items can flow into the
    /// question bank. Returns `None` while nothing finished.
    pub fn poll_current(&mut self) -> Option<JobRecord> {
        let current = self.current.as_mut()?;
        if current.job.poll() == JobStatus::Running {
            return None;
        }

        let CurrentJob { queue_id, job } = self.current.take()?;

        match self.queue.get_mut(&queue_id) {
            Some(item) => {
                item.completed_at = job.completed_at;
                match job.status {
                    JobStatus::Done => {
                        item.status = QueueStatus::Done;
                        item.item_count = job.result.as_ref().map(|o| o.items.len());
                    }
                    JobStatus::Error => {
                        item.status = QueueStatus::Error;
                        item.error = job.error.clone();
                    }
                    JobStatus::Running => unreachable!("poll reported a terminal status"),
                }
            }
            None => {
                // The user removed the item while it ran; the outcome
                // is still handed to the caller.
                warn!("Finished job {} has no queue item {}", job.id, queue_id);
            }
        }

        Some(job)
    }

    /// Heals stale state left by an interrupted session: any queue item
    /// marked running without a live tracked job is reset to queued so
    /// it is retried in full. Chunk generation is idempotent and driven
    /// only by stored parameters, so restarting from scratch is safe.
    pub fn revive_stale(&mut self) -> bool {
        let live_id = self.current.as_ref().map(|c| c.queue_id.clone());
        let changed = self.queue.revive_stale(live_id.as_deref());
        if changed {
            info!("Revived stale queue items back to queued");
        }
        changed
    }
}
