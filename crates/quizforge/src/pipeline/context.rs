use crate::item::QuizItem;
use crate::merge::DuplicateFlag;
use crate::pipeline::config::GenerationParams;
use crate::provider::TokenUsage;

pub struct GenerationContext {
    // Input
    pub job_id: String,
    pub params: GenerationParams,

    // Step 1 result — guaranteed Some after step_chunk
    pub chunks: Option<Vec<String>>,

    // Step 2 results, one entry per chunk, in chunk order
    pub chunk_items: Vec<Vec<QuizItem>>,
    pub usage: Option<TokenUsage>,

    // Step 3 results
    pub merged: Option<Vec<QuizItem>>,
    pub duplicates: Vec<DuplicateFlag>,
}

impl GenerationContext {
    pub fn new(job_id: String, params: GenerationParams) -> Self {
        Self {
            job_id,
            params,
            chunks: None,
            chunk_items: Vec::new(),
            usage: None,
            merged: None,
            duplicates: Vec::new(),
        }
    }
}
