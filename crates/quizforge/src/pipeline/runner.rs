use std::sync::Arc;

use tracing::{debug, info_span};
use uuid::Uuid;

use crate::broadcast::job_progress::JobPhase;
use crate::chunk::split_text;
use crate::item::QuizItem;
use crate::merge::{self, DuplicateFlag};
use crate::provider::{sanitize_for_prompt, ChunkRequest, ModelClient, TokenUsage};

use super::context::GenerationContext;
use super::error::GenerationError;
use super::progress::{ProgressEvent, ProgressReporter};

/// Result of a completed generation job.
#[derive(Debug, Clone)]
pub struct GenerationOutcome {
    /// Merged items in chunk order.
    pub items: Vec<QuizItem>,
    /// Near-duplicate pairs surfaced by the merger.
    pub duplicates: Vec<DuplicateFlag>,
    /// Accumulated provider token usage, when reported.
    pub usage: Option<TokenUsage>,
}

/// The chunk-generation pipeline: split, generate per chunk, merge.
///
/// Runs entirely on a worker thread; the model call is the only
/// blocking operation inside.
pub struct GenerationPipeline {
    client: Arc<dyn ModelClient>,
}

impl GenerationPipeline {
    pub fn new(client: Arc<dyn ModelClient>) -> Self {
        Self { client }
    }

    /// Runs the full pipeline for one job.
    pub fn run(
        &self,
        mut ctx: GenerationContext,
        progress: &dyn ProgressReporter,
    ) -> Result<GenerationOutcome, GenerationError> {
        let _pipeline_span = info_span!("generation",
            job_id = %ctx.job_id,
            source = %ctx.params.source_name,
            model = %ctx.params.effective_model(),
        )
        .entered();

        // Step 1: Split into overlapping windows
        {
            let _step = info_span!("chunk").entered();
            progress.report(ProgressEvent::Phase {
                phase: JobPhase::Chunking,
                message: "Splitting text into windows...".to_string(),
            });
            if let Err(e) = self.step_chunk(&mut ctx) {
                progress.report(ProgressEvent::Failed {
                    error: e.to_string(),
                });
                return Err(e);
            }
        }

        // Step 2: Generate and parse per chunk, in source order
        {
            let _step = info_span!("generate").entered();
            if let Err(e) = self.step_generate(&mut ctx, progress) {
                progress.report(ProgressEvent::Failed {
                    error: e.to_string(),
                });
                return Err(e);
            }
        }

        // Step 3: Merge, filter, flag duplicates
        {
            let _step = info_span!("merge").entered();
            progress.report(ProgressEvent::Phase {
                phase: JobPhase::Merging,
                message: "Merging chunk results...".to_string(),
            });
            self.step_merge(&mut ctx);
        }

        let items = ctx.merged.take().unwrap_or_default();
        progress.report(ProgressEvent::Completed {
            item_count: items.len(),
        });

        Ok(GenerationOutcome {
            items,
            duplicates: ctx.duplicates,
            usage: ctx.usage,
        })
    }

    fn step_chunk(&self, ctx: &mut GenerationContext) -> Result<(), GenerationError> {
        let chunks = split_text(
            &ctx.params.raw_text,
            ctx.params.chunk_size,
            ctx.params.overlap,
        )?;
        debug!(chunks = chunks.len(), "text split");
        ctx.chunks = Some(chunks);
        Ok(())
    }

    fn step_generate(
        &self,
        ctx: &mut GenerationContext,
        progress: &dyn ProgressReporter,
    ) -> Result<(), GenerationError> {
        let chunks = ctx.chunks.as_ref().expect("step 1 completed");
        let total = chunks.len();
        if total == 0 {
            return Ok(());
        }

        let per_chunk = ctx.params.num_items.div_ceil(total).max(1);
        let mut usage_total: Option<TokenUsage> = None;

        for (index, chunk) in chunks.iter().enumerate() {
            progress.report(ProgressEvent::Phase {
                phase: JobPhase::Generating,
                message: format!("Generating questions (chunk {}/{})...", index + 1, total),
            });

            let request = ChunkRequest {
                mode: ctx.params.mode,
                count: per_chunk,
                model: ctx.params.effective_model(),
                style: ctx.params.style_text.as_deref(),
                subject: &ctx.params.subject,
                unit: &ctx.params.unit,
            };

            let safe_chunk = sanitize_for_prompt(chunk);
            let response = self.client.generate(&safe_chunk, &request)?;

            if let Some(usage) = response.usage {
                usage_total.get_or_insert_with(TokenUsage::default).add(usage);
            }

            if ctx.params.report_progress {
                progress.report(ProgressEvent::Phase {
                    phase: JobPhase::Parsing,
                    message: format!("Parsing model output (chunk {}/{})...", index + 1, total),
                });
            }

            let parsed = crate::provider::parse_model_output(&response.text, ctx.params.mode)?;
            let items = parsed
                .into_iter()
                .map(|p| QuizItem {
                    id: Uuid::new_v4().to_string(),
                    mode: ctx.params.mode,
                    stem: p.stem,
                    options: p.options,
                    answer: p.answer,
                    explanation: p.explanation,
                    subject: ctx.params.subject.clone(),
                    unit: ctx.params.unit.clone(),
                    source_signature: Some(ctx.params.signature.clone()),
                })
                .collect();

            ctx.chunk_items.push(items);
        }

        ctx.usage = usage_total;
        Ok(())
    }

    fn step_merge(&self, ctx: &mut GenerationContext) {
        // Chunk order is semantically meaningful: merged output must
        // read in source order.
        let mut items: Vec<QuizItem> = ctx.chunk_items.drain(..).flatten().collect();

        if ctx.params.quality_filter {
            items = merge::apply_min_length(items, ctx.params.min_stem_length);
        }

        let flags = merge::flag_near_duplicates(&items, ctx.params.similarity_threshold);
        if ctx.params.drop_duplicates {
            items = merge::drop_flagged(items, &flags);
        }
        ctx.duplicates = flags;
        ctx.merged = Some(items);
    }
}
