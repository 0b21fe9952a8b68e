pub mod future;
pub mod job;
pub mod pool;

pub use future::{FuturePoll, JobFuture};
pub use job::{JobRecord, JobStatus, RuntimeContext};
pub use pool::{GenerationExecutor, PipelineOutcome};

// Re-export crossbeam_channel for embedders wiring their own channels
pub use crossbeam_channel;
