//! Quality filtering and duplicate flagging for merged generation output.
//!
//! Per-chunk results are concatenated in chunk order by the pipeline;
//! this module then drops items with too-short stems and flags pairs of
//! near-duplicate items. Flagged pairs are surfaced to the caller and
//! only removed when the settings explicitly opt in to dropping.

use std::collections::HashSet;

use serde::Serialize;

use crate::item::QuizItem;

/// A pair of items whose stems are nearly identical.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateFlag {
    /// Index of the earlier item in the merged sequence.
    pub first: usize,
    /// Index of the later item.
    pub second: usize,
    pub similarity: f32,
}

/// Drops items whose trimmed stem is shorter than `min_stem_length`
/// characters. Order of the survivors is preserved.
pub fn apply_min_length(items: Vec<QuizItem>, min_stem_length: usize) -> Vec<QuizItem> {
    items
        .into_iter()
        .filter(|item| item.stem.trim().chars().count() >= min_stem_length)
        .collect()
}

/// Flags every pair of items whose stem similarity meets `threshold`.
///
/// Similarity is Jaccard over lowercase word sets: insensitive to word
/// order, which is what rephrased duplicates from adjacent overlapping
/// chunks look like.
pub fn flag_near_duplicates(items: &[QuizItem], threshold: f32) -> Vec<DuplicateFlag> {
    let words: Vec<HashSet<String>> = items.iter().map(|i| word_set(&i.stem)).collect();
    let mut flags = Vec::new();

    for i in 0..items.len() {
        for j in (i + 1)..items.len() {
            let similarity = jaccard(&words[i], &words[j]);
            if similarity >= threshold {
                flags.push(DuplicateFlag {
                    first: i,
                    second: j,
                    similarity,
                });
            }
        }
    }

    flags
}

/// Removes the *later* item of every flagged pair. Only called when
/// `drop_duplicates` is enabled in the settings.
pub fn drop_flagged(items: Vec<QuizItem>, flags: &[DuplicateFlag]) -> Vec<QuizItem> {
    let doomed: HashSet<usize> = flags.iter().map(|f| f.second).collect();
    items
        .into_iter()
        .enumerate()
        .filter(|(index, _)| !doomed.contains(index))
        .map(|(_, item)| item)
        .collect()
}

fn word_set(stem: &str) -> HashSet<String> {
    stem.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(|w| w.to_lowercase())
        .collect()
}

fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f32 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;
    if union == 0 {
        0.0
    } else {
        intersection as f32 / union as f32
    }
}
