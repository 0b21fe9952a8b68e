//! Ordered, deduplicated backlog of generation requests.
//!
//! Queue items are durable for the session: they survive their job
//! finishing (terminal items stay visible with their outcome until the
//! user removes them) and an interrupted job (revival resets the item
//! to queued). All mutation happens synchronously on the interactive
//! thread.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::Settings;
use crate::item::GenerationMode;
use crate::pipeline::GenerationParams;
use crate::signature::Signature;

/// Lifecycle of a backlog entry: `Queued → Running → Done | Error`,
/// plus the revival transition `Running → Queued` for orphans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueStatus {
    Queued,
    Running,
    Done,
    Error,
}

/// A user's generation request, before it becomes a queue item.
#[derive(Debug, Clone)]
pub struct Submission {
    pub source_name: String,
    pub signature: Signature,
    pub raw_text: String,
    pub style_text: Option<String>,
    pub mode: GenerationMode,
    pub num_items: usize,
    pub subject: String,
    pub unit: String,
    pub model: String,
    pub chunk_size: usize,
    pub overlap: usize,
    pub quality_filter: bool,
    pub min_stem_length: usize,
    pub similarity_threshold: f32,
    pub drop_duplicates: bool,
}

impl Submission {
    /// Builds a submission with chunking and quality settings taken
    /// from the session settings.
    pub fn new(
        source_name: impl Into<String>,
        signature: Signature,
        raw_text: impl Into<String>,
        mode: GenerationMode,
        num_items: usize,
        subject: impl Into<String>,
        unit: impl Into<String>,
        settings: &Settings,
    ) -> Self {
        Self {
            source_name: source_name.into(),
            signature,
            raw_text: raw_text.into(),
            style_text: None,
            mode,
            num_items,
            subject: subject.into(),
            unit: unit.into(),
            model: settings.generation.default_model.clone(),
            chunk_size: settings.generation.chunk_size,
            overlap: settings.generation.overlap,
            quality_filter: settings.quality.filter_enabled,
            min_stem_length: settings.quality.min_stem_length,
            similarity_threshold: settings.quality.similarity_threshold,
            drop_duplicates: settings.quality.drop_duplicates,
        }
    }
}

/// One backlog entry. Timestamps are for display only; liveness
/// decisions are made from the session's current-job tracking, never
/// from wall-clock values.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueItem {
    pub id: String,
    pub status: QueueStatus,
    pub source_name: String,
    pub signature: Signature,
    pub raw_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style_text: Option<String>,
    pub mode: GenerationMode,
    pub num_items: usize,
    pub subject: String,
    pub unit: String,
    pub model: String,
    pub chunk_size: usize,
    pub overlap: usize,
    pub quality_filter: bool,
    pub min_stem_length: usize,
    pub similarity_threshold: f32,
    pub drop_duplicates: bool,
    pub queued_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    /// Error text of a failed run (terminal failures only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Number of items the finished run produced.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_count: Option<usize>,
}

impl QueueItem {
    pub fn new(submission: Submission) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            status: QueueStatus::Queued,
            source_name: submission.source_name,
            signature: submission.signature,
            raw_text: submission.raw_text,
            style_text: submission.style_text,
            mode: submission.mode,
            num_items: submission.num_items,
            subject: submission.subject,
            unit: submission.unit,
            model: submission.model,
            chunk_size: submission.chunk_size,
            overlap: submission.overlap,
            quality_filter: submission.quality_filter,
            min_stem_length: submission.min_stem_length,
            similarity_threshold: submission.similarity_threshold,
            drop_duplicates: submission.drop_duplicates,
            queued_at: Utc::now(),
            started_at: None,
            completed_at: None,
            error: None,
            item_count: None,
        }
    }

    /// The pipeline parameter set for running this item. Runtime
    /// overrides are applied later by `JobRecord::start`.
    pub fn to_params(&self) -> GenerationParams {
        GenerationParams {
            source_name: self.source_name.clone(),
            signature: self.signature.clone(),
            raw_text: self.raw_text.clone(),
            style_text: self.style_text.clone(),
            mode: self.mode,
            num_items: self.num_items,
            subject: self.subject.clone(),
            unit: self.unit.clone(),
            model: self.model.clone(),
            model_override: None,
            chunk_size: self.chunk_size,
            overlap: self.overlap,
            quality_filter: self.quality_filter,
            min_stem_length: self.min_stem_length,
            similarity_threshold: self.similarity_threshold,
            drop_duplicates: self.drop_duplicates,
            report_progress: false,
            audit_user: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.status, QueueStatus::Queued | QueueStatus::Running)
    }
}

/// FIFO backlog. Submission order is execution order; no priorities.
#[derive(Debug, Default)]
pub struct GenerationQueue {
    items: Vec<QueueItem>,
}

impl GenerationQueue {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Appends an item in queued state.
    pub fn enqueue(&mut self, item: QueueItem) {
        self.items.push(item);
    }

    /// True if a queued-or-running item matches all of (signature,
    /// mode, num_items, subject, unit). Terminal items never count:
    /// re-requesting finished work is legitimate.
    pub fn is_duplicate(
        &self,
        signature: &Signature,
        mode: GenerationMode,
        num_items: usize,
        subject: &str,
        unit: &str,
    ) -> bool {
        self.items.iter().any(|item| {
            item.is_pending()
                && item.signature == *signature
                && item.mode == mode
                && item.num_items == num_items
                && item.subject == subject
                && item.unit == unit
        })
    }

    pub fn has_running(&self) -> bool {
        self.items
            .iter()
            .any(|item| item.status == QueueStatus::Running)
    }

    /// Index of the first queued item, FIFO.
    pub fn next_queued(&self) -> Option<usize> {
        self.items
            .iter()
            .position(|item| item.status == QueueStatus::Queued)
    }

    pub fn get(&self, id: &str) -> Option<&QueueItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut QueueItem> {
        self.items.iter_mut().find(|item| item.id == id)
    }

    pub fn get_at(&self, index: usize) -> Option<&QueueItem> {
        self.items.get(index)
    }

    pub fn get_at_mut(&mut self, index: usize) -> Option<&mut QueueItem> {
        self.items.get_mut(index)
    }

    /// Removes an item by id. Returns false when absent.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        self.items.len() != before
    }

    /// Items in submission order, for rendering.
    pub fn items(&self) -> &[QueueItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Resets every running item that is not the live job back to
    /// queued with its start timestamp cleared. Returns whether
    /// anything changed.
    pub fn revive_stale(&mut self, live_id: Option<&str>) -> bool {
        let mut changed = false;
        for item in &mut self.items {
            if item.status == QueueStatus::Running && Some(item.id.as_str()) != live_id {
                item.status = QueueStatus::Queued;
                item.started_at = None;
                changed = true;
            }
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;

    fn submission(name: &str, content: &[u8]) -> Submission {
        Submission::new(
            name,
            Signature::compute(name, content),
            "extracted text",
            GenerationMode::MultipleChoice,
            10,
            "Biology",
            "Cells",
            &Settings::default(),
        )
    }

    #[test]
    fn test_enqueue_preserves_submission_order() {
        let mut queue = GenerationQueue::new();
        queue.enqueue(QueueItem::new(submission("a.txt", b"a")));
        queue.enqueue(QueueItem::new(submission("b.txt", b"b")));

        assert_eq!(queue.len(), 2);
        assert_eq!(queue.items()[0].source_name, "a.txt");
        assert_eq!(queue.next_queued(), Some(0));
    }

    #[test]
    fn test_is_duplicate_matches_all_five_fields() {
        let mut queue = GenerationQueue::new();
        let sub = submission("a.txt", b"a");
        let sig = sub.signature.clone();
        queue.enqueue(QueueItem::new(sub));

        assert!(queue.is_duplicate(&sig, GenerationMode::MultipleChoice, 10, "Biology", "Cells"));

        // Changing any one field makes it non-duplicate.
        let other_sig = Signature::compute("a.txt", b"different");
        assert!(!queue.is_duplicate(&other_sig, GenerationMode::MultipleChoice, 10, "Biology", "Cells"));
        assert!(!queue.is_duplicate(&sig, GenerationMode::OpenEnded, 10, "Biology", "Cells"));
        assert!(!queue.is_duplicate(&sig, GenerationMode::MultipleChoice, 11, "Biology", "Cells"));
        assert!(!queue.is_duplicate(&sig, GenerationMode::MultipleChoice, 10, "Chemistry", "Cells"));
        assert!(!queue.is_duplicate(&sig, GenerationMode::MultipleChoice, 10, "Biology", "Membranes"));
    }

    #[test]
    fn test_running_items_count_as_duplicates_terminal_do_not() {
        let mut queue = GenerationQueue::new();
        let sub = submission("a.txt", b"a");
        let sig = sub.signature.clone();
        queue.enqueue(QueueItem::new(sub));

        let id = queue.items()[0].id.clone();
        queue.get_mut(&id).unwrap().status = QueueStatus::Running;
        assert!(queue.is_duplicate(&sig, GenerationMode::MultipleChoice, 10, "Biology", "Cells"));

        queue.get_mut(&id).unwrap().status = QueueStatus::Done;
        assert!(!queue.is_duplicate(&sig, GenerationMode::MultipleChoice, 10, "Biology", "Cells"));

        queue.get_mut(&id).unwrap().status = QueueStatus::Error;
        assert!(!queue.is_duplicate(&sig, GenerationMode::MultipleChoice, 10, "Biology", "Cells"));
    }

    #[test]
    fn test_remove_by_id() {
        let mut queue = GenerationQueue::new();
        queue.enqueue(QueueItem::new(submission("a.txt", b"a")));
        let id = queue.items()[0].id.clone();

        assert!(queue.remove(&id));
        assert!(queue.is_empty());
        assert!(!queue.remove(&id));
    }

    #[test]
    fn test_revive_stale_resets_orphaned_running_item() {
        let mut queue = GenerationQueue::new();
        queue.enqueue(QueueItem::new(submission("a.txt", b"a")));
        let id = queue.items()[0].id.clone();

        let item = queue.get_mut(&id).unwrap();
        item.status = QueueStatus::Running;
        item.started_at = Some(Utc::now());

        // No live job: the running item is an orphan.
        assert!(queue.revive_stale(None));
        let item = queue.get(&id).unwrap();
        assert_eq!(item.status, QueueStatus::Queued);
        assert!(item.started_at.is_none());

        // Second pass: nothing left to heal.
        assert!(!queue.revive_stale(None));
    }

    #[test]
    fn test_revive_stale_spares_the_live_job() {
        let mut queue = GenerationQueue::new();
        queue.enqueue(QueueItem::new(submission("a.txt", b"a")));
        let id = queue.items()[0].id.clone();

        let item = queue.get_mut(&id).unwrap();
        item.status = QueueStatus::Running;
        item.started_at = Some(Utc::now());

        assert!(!queue.revive_stale(Some(&id)));
        assert_eq!(queue.get(&id).unwrap().status, QueueStatus::Running);
    }

    #[test]
    fn test_to_params_echoes_item_fields() {
        let item = QueueItem::new(submission("a.txt", b"a"));
        let params = item.to_params();
        assert_eq!(params.source_name, "a.txt");
        assert_eq!(params.num_items, 10);
        assert_eq!(params.chunk_size, Settings::default().generation.chunk_size);
        assert!(!params.report_progress);
    }
}
