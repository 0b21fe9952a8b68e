use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{bounded, Receiver, Sender};
use log::{debug, error, info};

use crate::broadcast::job_progress::{JobProgressBroadcaster, JobProgressTracker};
use crate::error::WorkerError;
use crate::pipeline::{
    BroadcastProgress, GenerationContext, GenerationError, GenerationOutcome, GenerationParams,
    GenerationPipeline, NoopProgress,
};
use crate::provider::ModelClient;
use crate::worker::future::JobFuture;

/// Outcome a worker sends back through a job's future.
pub type PipelineOutcome = Result<GenerationOutcome, GenerationError>;

/// One submission to the executor: everything a worker needs to run the
/// chunk pipeline, plus the sending half of the job's outcome channel.
struct PipelineJob {
    job_id: String,
    params: GenerationParams,
    client: Arc<dyn ModelClient>,
    progress: Option<JobProgressBroadcaster>,
    outcome_tx: Sender<PipelineOutcome>,
}

/// Bounded background worker pool for generation jobs.
///
/// Sized for outbound network calls, not CPU: a modest fixed pool
/// avoids rate-limit contention with the model provider. Submission is
/// non-blocking for the interactive session; only worker threads block
/// inside the pipeline.
pub struct GenerationExecutor {
    job_sender: Sender<PipelineJob>,
    workers: Vec<JoinHandle<()>>,
    shutdown: Arc<AtomicBool>,
}

impl GenerationExecutor {
    pub const DEFAULT_WORKERS: usize = 4;

    /// Creates a new executor.
    ///
    /// # Panics
    /// Panics if `worker_count` is 0.
    pub fn new(worker_count: usize) -> Self {
        assert!(worker_count > 0, "worker_count must be > 0");
        let (job_sender, job_receiver) = bounded::<PipelineJob>(worker_count * 2);
        let shutdown = Arc::new(AtomicBool::new(false));

        let mut workers = Vec::with_capacity(worker_count);
        for worker_id in 0..worker_count {
            let job_rx = job_receiver.clone();
            let shutdown_flag = Arc::clone(&shutdown);
            let handle = thread::spawn(move || {
                run_worker(worker_id, job_rx, shutdown_flag);
            });
            workers.push(handle);
        }

        info!("Started {} generation workers", worker_count);

        Self {
            job_sender,
            workers,
            shutdown,
        }
    }

    /// Creates an executor sized from the session settings.
    pub fn from_settings(settings: &crate::config::Settings) -> Self {
        Self::new(settings.generation.worker_count)
    }

    /// Process-wide executor, lazily created on first use.
    pub fn global() -> &'static GenerationExecutor {
        static EXECUTOR: OnceLock<GenerationExecutor> = OnceLock::new();
        EXECUTOR.get_or_init(|| GenerationExecutor::new(Self::DEFAULT_WORKERS))
    }

    /// Submits one generation job and returns its future. Never waits
    /// on model I/O.
    pub fn submit(
        &self,
        job_id: &str,
        params: GenerationParams,
        client: Arc<dyn ModelClient>,
        progress: Option<JobProgressBroadcaster>,
    ) -> Result<JobFuture<PipelineOutcome>, WorkerError> {
        if self.shutdown.load(Ordering::Relaxed) {
            return Err(WorkerError::ChannelClosed);
        }

        let (outcome_tx, outcome_rx) = bounded::<PipelineOutcome>(1);
        let job = PipelineJob {
            job_id: job_id.to_string(),
            params,
            client,
            progress,
            outcome_tx,
        };

        self.job_sender
            .send(job)
            .map_err(|_| WorkerError::ChannelClosed)?;

        Ok(JobFuture::new(outcome_rx))
    }

    pub fn shutdown(&self) {
        info!("Shutting down generation executor...");
        self.shutdown.store(true, Ordering::Relaxed);
    }

    pub fn wait(self) {
        // Drop sender to signal workers to exit
        drop(self.job_sender);

        for (i, worker) in self.workers.into_iter().enumerate() {
            if let Err(e) = worker.join() {
                error!("Worker {} panicked: {:?}", i, e);
            } else {
                debug!("Worker {} finished", i);
            }
        }

        info!("All generation workers have stopped");
    }

    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::Relaxed)
    }
}

fn run_worker(worker_id: usize, job_receiver: Receiver<PipelineJob>, shutdown: Arc<AtomicBool>) {
    debug!("Worker {} started", worker_id);

    loop {
        if shutdown.load(Ordering::Relaxed) {
            debug!("Worker {} received shutdown signal", worker_id);
            break;
        }

        match job_receiver.recv_timeout(std::time::Duration::from_millis(100)) {
            Ok(job) => {
                debug!("Worker {} processing job {}", worker_id, job.job_id);

                let source_name = job.params.source_name.clone();
                let model = job.params.effective_model().to_string();
                let pipeline = GenerationPipeline::new(Arc::clone(&job.client));
                let ctx = GenerationContext::new(job.job_id.clone(), job.params);

                let outcome = if let Some(broadcaster) = &job.progress {
                    let tracker = JobProgressTracker::new(
                        &job.job_id,
                        &source_name,
                        &model,
                        broadcaster.sender(),
                    );
                    pipeline.run(ctx, &BroadcastProgress::new(tracker))
                } else {
                    pipeline.run(ctx, &NoopProgress)
                };

                // A dropped receiver means the session abandoned the
                // job; the queue revives it later, nothing to do here.
                if job.outcome_tx.send(outcome).is_err() {
                    debug!("Worker {}: job {} outcome receiver gone", worker_id, job.job_id);
                }
            }
            Err(crossbeam_channel::RecvTimeoutError::Timeout) => {
                continue;
            }
            Err(crossbeam_channel::RecvTimeoutError::Disconnected) => {
                debug!("Worker {} job channel disconnected", worker_id);
                break;
            }
        }
    }

    debug!("Worker {} stopped", worker_id);
}
