//! Broadcasting modules for real-time event streaming.
//!
//! Fire-and-forget channels the rendering layer can subscribe to:
//! per-job generation progress and the audit trail. Losing events when
//! nobody is listening is fine by contract.

pub mod audit;
pub mod job_progress;

pub use audit::{AuditEvent, AuditKind, AuditLog};
pub use job_progress::{
    JobPhase, JobProgressBroadcaster, JobProgressEvent, JobProgressTracker,
};
