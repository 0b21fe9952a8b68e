use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::broadcast::audit::{AuditEvent, AuditKind, AuditLog};
use crate::broadcast::job_progress::JobProgressBroadcaster;
use crate::error::WorkerError;
use crate::pipeline::{GenerationOutcome, GenerationParams};
use crate::provider::ModelClient;
use crate::worker::future::{FuturePoll, JobFuture};
use crate::worker::pool::{GenerationExecutor, PipelineOutcome};

/// Status of an in-flight generation job. Monotonic: `Done` and
/// `Error` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Running,
    Done,
    Error,
}

/// Session-level wiring a job is started with: the model client,
/// optional overrides, and the event sinks.
#[derive(Clone)]
pub struct RuntimeContext {
    pub client: Arc<dyn ModelClient>,
    /// Session-wide model override applied to every started job.
    pub model_override: Option<String>,
    /// User id recorded in the audit trail.
    pub audit_user: Option<String>,
    pub progress: Option<JobProgressBroadcaster>,
    pub audit: Option<AuditLog>,
}

impl RuntimeContext {
    pub fn new(client: Arc<dyn ModelClient>) -> Self {
        Self {
            client,
            model_override: None,
            audit_user: None,
            progress: None,
            audit: None,
        }
    }
}

/// One in-flight background generation computation with its attached
/// future.
///
/// Created by [`JobRecord::start`]; mutated only by [`JobRecord::poll`];
/// `result` is present iff `status == Done`, `error` iff
/// `status == Error`.
#[derive(Debug)]
pub struct JobRecord {
    pub id: String,
    pub status: JobStatus,
    future: JobFuture<PipelineOutcome>,
    /// Echo of the submission parameters for display.
    pub params: GenerationParams,
    pub result: Option<GenerationOutcome>,
    pub error: Option<String>,
    pub completed_at: Option<DateTime<Utc>>,
    audit: Option<AuditLog>,
}

impl JobRecord {
    /// Builds the full pipeline request and submits it to the executor.
    /// Returns immediately with a `Running` record; never blocks on
    /// model I/O.
    pub fn start(
        mut params: GenerationParams,
        runtime: &RuntimeContext,
        executor: &GenerationExecutor,
    ) -> Result<JobRecord, WorkerError> {
        let id = Uuid::new_v4().to_string();

        // Background execution has no attached UI to update.
        params.report_progress = false;
        params.model_override = runtime.model_override.clone();
        params.audit_user = runtime.audit_user.clone();

        let future = executor.submit(
            &id,
            params.clone(),
            Arc::clone(&runtime.client),
            runtime.progress.clone(),
        )?;

        if let Some(audit) = &runtime.audit {
            let mut event = AuditEvent::new(
                AuditKind::JobSubmitted,
                &id,
                params.effective_model(),
                params.mode,
                params.num_items,
            );
            event.user = params.audit_user.clone();
            audit.record(event);
        }

        info!(
            "Started generation job {} for '{}' ({} items, {})",
            id, params.source_name, params.num_items, params.mode
        );

        Ok(Self {
            id,
            status: JobStatus::Running,
            future,
            params,
            result: None,
            error: None,
            completed_at: None,
            audit: runtime.audit.clone(),
        })
    }

    /// Non-blocking state transition, safe to call every render cycle.
    ///
    /// A pending future leaves the record unchanged. Completion
    /// transitions to `Done`/`Error` exactly once; repeated polls of a
    /// terminal record are no-ops and never re-run work.
    pub fn poll(&mut self) -> JobStatus {
        if self.status != JobStatus::Running {
            return self.status;
        }

        match self.future.poll() {
            FuturePoll::Pending => {}
            FuturePoll::Ready(Ok(outcome)) => {
                self.status = JobStatus::Done;
                self.completed_at = Some(Utc::now());
                self.record_completion_audit(Some(&outcome), None);
                self.result = Some(outcome);
            }
            FuturePoll::Ready(Err(e)) => {
                let message = e.to_string();
                self.status = JobStatus::Error;
                self.completed_at = Some(Utc::now());
                self.record_completion_audit(None, Some(&message));
                self.error = Some(message);
            }
            FuturePoll::Lost => {
                let message = "background worker terminated before the job completed".to_string();
                self.status = JobStatus::Error;
                self.completed_at = Some(Utc::now());
                self.record_completion_audit(None, Some(&message));
                self.error = Some(message);
            }
        }

        self.status
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.status, JobStatus::Done | JobStatus::Error)
    }

    fn record_completion_audit(&self, outcome: Option<&GenerationOutcome>, error: Option<&str>) {
        let Some(audit) = &self.audit else {
            return;
        };

        let kind = if error.is_some() {
            AuditKind::JobFailed
        } else {
            AuditKind::JobCompleted
        };
        let mut event = AuditEvent::new(
            kind,
            &self.id,
            self.params.effective_model(),
            self.params.mode,
            self.params.num_items,
        );
        event.user = self.params.audit_user.clone();
        if let Some(outcome) = outcome {
            event.item_count = Some(outcome.items.len());
            event.usage = outcome.usage;
        }
        audit.record(event);
    }
}
