use serde::{Deserialize, Serialize};

use crate::signature::Signature;

/// Kind of study question a generation run produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationMode {
    MultipleChoice,
    OpenEnded,
    Flashcard,
}

impl std::fmt::Display for GenerationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GenerationMode::MultipleChoice => write!(f, "multiple choice"),
            GenerationMode::OpenEnded => write!(f, "open ended"),
            GenerationMode::Flashcard => write!(f, "flashcard"),
        }
    }
}

/// One generated study question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizItem {
    /// Unique item identifier.
    pub id: String,
    /// Question kind this item was generated as.
    pub mode: GenerationMode,
    /// The question text shown to the student.
    pub stem: String,
    /// Answer options (multiple choice only; empty otherwise).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    /// The correct answer. For multiple choice this matches one option.
    pub answer: String,
    /// Optional explanation of the answer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    /// Subject tag echoed from the generation request.
    pub subject: String,
    /// Unit tag echoed from the generation request.
    pub unit: String,
    /// Signature of the source document this item was generated from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_signature: Option<Signature>,
}
