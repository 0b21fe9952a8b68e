pub mod bank;
pub mod broadcast;
pub mod chunk;
pub mod config;
pub mod error;
pub mod extract;
pub mod item;
pub mod merge;
pub mod observability;
pub mod pipeline;
pub mod prewarm;
pub mod provider;
pub mod queue;
pub mod select;
pub mod session;
pub mod signature;
pub mod worker;

pub use bank::{JsonFileStore, QuestionBank, QuestionStore};
pub use broadcast::{AuditEvent, AuditKind, AuditLog, JobPhase, JobProgressBroadcaster, JobProgressEvent};
pub use config::{load_or_default, load_settings, Settings};
pub use error::{
    ConfigError, ExtractError, ParseError, ProviderError, QuizforgeError, Result, StoreError,
    WorkerError,
};
pub use extract::{extract_cached, ExtractorRegistry, SourceKind, TextExtractor};
pub use item::{GenerationMode, QuizItem};
pub use pipeline::{GenerationOutcome, GenerationParams, GenerationPipeline};
pub use prewarm::PrewarmCache;
pub use provider::{ApiCredentials, ModelClient, StubClient};
pub use queue::{GenerationQueue, QueueItem, QueueStatus, Submission};
pub use select::{allocate, select_items, Distribution};
pub use session::{CurrentJob, SessionState};
pub use signature::Signature;
pub use worker::{GenerationExecutor, JobRecord, JobStatus, RuntimeContext};
