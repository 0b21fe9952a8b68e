//! Fire-and-forget audit trail for generation activity.
//!
//! Events are recorded at job submission and completion with model and
//! usage metadata. Subscribers (an admin view, a usage exporter) attach
//! over a broadcast channel; with nobody listening the events are
//! logged at debug level and dropped.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::debug;
use serde::Serialize;
use tokio::sync::broadcast;

use crate::item::GenerationMode;
use crate::provider::TokenUsage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditKind {
    JobSubmitted,
    JobCompleted,
    JobFailed,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEvent {
    pub kind: AuditKind,
    pub job_id: String,
    pub model: String,
    pub mode: GenerationMode,
    /// Requested item count.
    pub num_items: usize,
    /// Generated item count (completion only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_count: Option<usize>,
    /// User the job is attributed to, when the embedder supplies one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    /// Accumulated provider token usage, when reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
    pub timestamp: DateTime<Utc>,
}

impl AuditEvent {
    pub fn new(kind: AuditKind, job_id: &str, model: &str, mode: GenerationMode, num_items: usize) -> Self {
        Self {
            kind,
            job_id: job_id.to_string(),
            model: model.to_string(),
            mode,
            num_items,
            item_count: None,
            user: None,
            usage: None,
            timestamp: Utc::now(),
        }
    }
}

/// Broadcast-backed audit log. Cloning shares the underlying channel.
#[derive(Clone)]
pub struct AuditLog {
    sender: Arc<broadcast::Sender<AuditEvent>>,
}

impl AuditLog {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Records an event. Never blocks, never fails.
    pub fn record(&self, event: AuditEvent) {
        debug!(
            "audit: {:?} job={} model={} items={:?}",
            event.kind, event.job_id, event.model, event.item_count
        );
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AuditEvent> {
        self.sender.subscribe()
    }
}

impl Default for AuditLog {
    fn default() -> Self {
        Self::new(100)
    }
}

impl std::fmt::Debug for AuditLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditLog")
            .field("subscribers", &self.sender.receiver_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_and_subscribe() {
        let log = AuditLog::new(10);
        let mut rx = log.subscribe();

        log.record(AuditEvent::new(
            AuditKind::JobSubmitted,
            "job-1",
            "stub-model",
            GenerationMode::MultipleChoice,
            10,
        ));

        let event = rx.try_recv().unwrap();
        assert_eq!(event.kind, AuditKind::JobSubmitted);
        assert_eq!(event.job_id, "job-1");
        assert_eq!(event.num_items, 10);
    }

    #[test]
    fn test_record_without_subscribers_is_fine() {
        let log = AuditLog::default();
        let mut event = AuditEvent::new(
            AuditKind::JobCompleted,
            "job-2",
            "stub-model",
            GenerationMode::OpenEnded,
            5,
        );
        event.item_count = Some(5);
        event.usage = Some(TokenUsage {
            prompt_tokens: 1200,
            completion_tokens: 300,
        });
        log.record(event);
    }
}
