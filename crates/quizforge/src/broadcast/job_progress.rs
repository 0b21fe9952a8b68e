//! Job progress broadcaster for real-time generation status streaming.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::worker::job::JobStatus;

/// Phase of generation processing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum JobPhase {
    Queued,
    Chunking,
    Generating,
    Parsing,
    Merging,
    Completed,
    Failed,
}

impl std::fmt::Display for JobPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobPhase::Queued => write!(f, "Queued"),
            JobPhase::Chunking => write!(f, "Splitting text"),
            JobPhase::Generating => write!(f, "Generating questions"),
            JobPhase::Parsing => write!(f, "Parsing model output"),
            JobPhase::Merging => write!(f, "Merging results"),
            JobPhase::Completed => write!(f, "Completed"),
            JobPhase::Failed => write!(f, "Failed"),
        }
    }
}

/// Progress event for a generation job.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobProgressEvent {
    /// Unique job identifier.
    pub job_id: String,
    /// Display name of the source document.
    pub source_name: String,
    /// Current phase of processing.
    pub phase: JobPhase,
    /// Overall job status.
    pub status: JobStatus,
    /// Human-readable message describing current activity.
    pub message: String,
    /// Timestamp of this event.
    pub timestamp: DateTime<Utc>,
    /// Model the job runs against.
    pub model: String,
    /// Number of generated items (set on completion).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_count: Option<usize>,
    /// Error message (set on failure).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl JobProgressEvent {
    /// Creates a new progress event.
    pub fn new(job_id: &str, source_name: &str, model: &str, phase: JobPhase, message: &str) -> Self {
        let status = match phase {
            JobPhase::Completed => JobStatus::Done,
            JobPhase::Failed => JobStatus::Error,
            _ => JobStatus::Running,
        };

        Self {
            job_id: job_id.to_string(),
            source_name: source_name.to_string(),
            phase,
            status,
            message: message.to_string(),
            timestamp: Utc::now(),
            model: model.to_string(),
            item_count: None,
            error: None,
        }
    }

    /// Creates a completion event.
    pub fn completed(job_id: &str, source_name: &str, model: &str, item_count: usize) -> Self {
        let mut event = Self::new(
            job_id,
            source_name,
            model,
            JobPhase::Completed,
            "Generation completed successfully",
        );
        event.item_count = Some(item_count);
        event
    }

    /// Creates a failure event.
    pub fn failed(job_id: &str, source_name: &str, model: &str, error: &str) -> Self {
        let mut event = Self::new(job_id, source_name, model, JobPhase::Failed, "Generation failed");
        event.error = Some(error.to_string());
        event
    }
}

/// Broadcasts job progress events for streaming.
#[derive(Clone)]
pub struct JobProgressBroadcaster {
    sender: Arc<broadcast::Sender<JobProgressEvent>>,
}

impl JobProgressBroadcaster {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Sends a progress event to all subscribers.
    pub fn send(&self, event: JobProgressEvent) {
        // No active receivers is fine.
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<JobProgressEvent> {
        self.sender.subscribe()
    }

    /// Creates a tracker for one job and emits its queued event.
    pub fn start_job(&self, job_id: &str, source_name: &str, model: &str) -> JobProgressTracker {
        let tracker = JobProgressTracker::new(job_id, source_name, model, Arc::clone(&self.sender));
        tracker.update_phase(JobPhase::Queued, "Job queued for generation");
        tracker
    }

    pub fn sender(&self) -> Arc<broadcast::Sender<JobProgressEvent>> {
        Arc::clone(&self.sender)
    }
}

impl Default for JobProgressBroadcaster {
    fn default() -> Self {
        Self::new(100)
    }
}

/// Tracks progress for a single job.
pub struct JobProgressTracker {
    job_id: String,
    source_name: String,
    model: String,
    sender: Arc<broadcast::Sender<JobProgressEvent>>,
}

impl JobProgressTracker {
    pub fn new(
        job_id: &str,
        source_name: &str,
        model: &str,
        sender: Arc<broadcast::Sender<JobProgressEvent>>,
    ) -> Self {
        Self {
            job_id: job_id.to_string(),
            source_name: source_name.to_string(),
            model: model.to_string(),
            sender,
        }
    }

    /// Updates the current phase with a message.
    pub fn update_phase(&self, phase: JobPhase, message: &str) {
        let event =
            JobProgressEvent::new(&self.job_id, &self.source_name, &self.model, phase, message);
        let _ = self.sender.send(event);
    }

    /// Marks the job as completed.
    pub fn completed(&self, item_count: usize) {
        let event =
            JobProgressEvent::completed(&self.job_id, &self.source_name, &self.model, item_count);
        let _ = self.sender.send(event);
    }

    /// Marks the job as failed.
    pub fn failed(&self, error: &str) {
        let event = JobProgressEvent::failed(&self.job_id, &self.source_name, &self.model, error);
        let _ = self.sender.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_broadcaster_send_receive() {
        let broadcaster = JobProgressBroadcaster::new(10);
        let mut rx = broadcaster.subscribe();

        broadcaster.send(JobProgressEvent::new(
            "job-1",
            "notes.txt",
            "stub-model",
            JobPhase::Generating,
            "Generating questions (chunk 1/3)",
        ));

        let received = rx.try_recv().unwrap();
        assert_eq!(received.job_id, "job-1");
        assert_eq!(received.phase, JobPhase::Generating);
        assert_eq!(received.status, JobStatus::Running);
    }

    #[test]
    fn test_start_job_emits_queued() {
        let broadcaster = JobProgressBroadcaster::new(10);
        let mut rx = broadcaster.subscribe();

        let tracker = broadcaster.start_job("job-2", "slides.pdf", "stub-model");
        let received = rx.try_recv().unwrap();
        assert_eq!(received.phase, JobPhase::Queued);

        tracker.update_phase(JobPhase::Chunking, "Splitting text into windows");
        let received = rx.try_recv().unwrap();
        assert_eq!(received.phase, JobPhase::Chunking);
    }

    #[test]
    fn test_completion_carries_item_count() {
        let broadcaster = JobProgressBroadcaster::new(10);
        let mut rx = broadcaster.subscribe();

        let tracker = broadcaster.start_job("job-3", "notes.txt", "stub-model");
        let _ = rx.try_recv();

        tracker.completed(12);
        let received = rx.try_recv().unwrap();
        assert_eq!(received.status, JobStatus::Done);
        assert_eq!(received.item_count, Some(12));
    }

    #[test]
    fn test_failure_carries_error() {
        let broadcaster = JobProgressBroadcaster::new(10);
        let mut rx = broadcaster.subscribe();

        let tracker = broadcaster.start_job("job-4", "notes.txt", "stub-model");
        let _ = rx.try_recv();

        tracker.failed("Rate limited by model provider: slow down");
        let received = rx.try_recv().unwrap();
        assert_eq!(received.status, JobStatus::Error);
        assert!(received.error.unwrap().contains("Rate limited"));
    }

    #[test]
    fn test_send_without_receivers_is_fine() {
        let broadcaster = JobProgressBroadcaster::default();
        broadcaster.send(JobProgressEvent::new(
            "job-5",
            "n",
            "m",
            JobPhase::Queued,
            "msg",
        ));
    }
}
