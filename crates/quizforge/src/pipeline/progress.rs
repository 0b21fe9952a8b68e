use crate::broadcast::job_progress::{JobPhase, JobProgressTracker};

/// Events emitted by the pipeline during generation.
pub enum ProgressEvent {
    Phase { phase: JobPhase, message: String },
    Completed { item_count: usize },
    Failed { error: String },
}

pub trait ProgressReporter: Send + Sync {
    fn report(&self, event: ProgressEvent);
}

/// No-op reporter for the async path and unit tests.
pub struct NoopProgress;

impl ProgressReporter for NoopProgress {
    fn report(&self, _event: ProgressEvent) {}
}

/// Bridges pipeline events to the job progress broadcast channel.
pub struct BroadcastProgress {
    tracker: JobProgressTracker,
}

impl BroadcastProgress {
    pub fn new(tracker: JobProgressTracker) -> Self {
        Self { tracker }
    }
}

impl ProgressReporter for BroadcastProgress {
    fn report(&self, event: ProgressEvent) {
        match event {
            ProgressEvent::Phase { phase, message } => {
                self.tracker.update_phase(phase, &message);
            }
            ProgressEvent::Completed { item_count } => {
                self.tracker.completed(item_count);
            }
            ProgressEvent::Failed { error } => {
                self.tracker.failed(&error);
            }
        }
    }
}
