//! Parsing of line-oriented model output into structured items.
//!
//! The prompts ask the model for blocks of the form
//!
//! ```text
//! Q: question stem
//! O: wrong option
//! O*: correct option
//! O: wrong option
//! E: optional explanation
//! ```
//!
//! separated by blank lines. Open-ended and flashcard modes replace the
//! option lines with a single `A:` answer line. Malformed output fails
//! the whole chunk; partial or corrupt items are never returned.

use crate::error::ParseError;
use crate::item::GenerationMode;

/// One parsed item before it is stamped with ids and request tags.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedItem {
    pub stem: String,
    pub options: Vec<String>,
    pub answer: String,
    pub explanation: Option<String>,
}

/// Parses raw model output for one chunk.
pub fn parse_model_output(
    text: &str,
    mode: GenerationMode,
) -> Result<Vec<ParsedItem>, ParseError> {
    let mut items = Vec::new();

    for block in text.split("\n\n").map(str::trim).filter(|b| !b.is_empty()) {
        let index = items.len() + 1;
        if let Some(item) = parse_block(block, mode, index)? {
            items.push(item);
        }
    }

    if items.is_empty() {
        return Err(ParseError::EmptyOutput);
    }
    Ok(items)
}

fn parse_block(
    block: &str,
    mode: GenerationMode,
    index: usize,
) -> Result<Option<ParsedItem>, ParseError> {
    let mut stem = String::new();
    let mut options = Vec::new();
    let mut correct: Option<String> = None;
    let mut answer: Option<String> = None;
    let mut explanation: Option<String> = None;

    for raw_line in block.lines() {
        let line = strip_enumeration(raw_line.trim());
        if line.is_empty() {
            continue;
        }

        if let Some(rest) = line.strip_prefix("Q:") {
            if !stem.is_empty() {
                return Err(ParseError::Malformed(format!(
                    "item {} has multiple stems",
                    index
                )));
            }
            stem = rest.trim().to_string();
        } else if let Some(rest) = line.strip_prefix("O*:") {
            let option = rest.trim().to_string();
            correct = Some(option.clone());
            options.push(option);
        } else if let Some(rest) = line.strip_prefix("O:") {
            options.push(rest.trim().to_string());
        } else if let Some(rest) = line.strip_prefix("A:") {
            answer = Some(rest.trim().to_string());
        } else if let Some(rest) = line.strip_prefix("E:") {
            explanation = Some(rest.trim().to_string());
        } else if stem.is_empty() {
            // Models sometimes emit a preamble line before the first
            // item; tolerate it only outside an item.
            continue;
        } else {
            // Continuation of the stem (wrapped question text).
            stem.push(' ');
            stem.push_str(line);
        }
    }

    if stem.is_empty() {
        if answer.is_some() || !options.is_empty() {
            return Err(ParseError::Malformed(format!(
                "item {} has answers but no stem",
                index
            )));
        }
        // Block contained only preamble text.
        return Ok(None);
    }

    match mode {
        GenerationMode::MultipleChoice => {
            if options.len() < 2 {
                return Err(ParseError::MissingOptions {
                    item: index,
                    found: options.len(),
                });
            }
            let answer = correct
                .or(answer)
                .ok_or(ParseError::MissingAnswer { item: index })?;
            if !options.iter().any(|o| o == &answer) {
                return Err(ParseError::AnswerNotInOptions { item: index });
            }
            Ok(Some(ParsedItem {
                stem,
                options,
                answer,
                explanation,
            }))
        }
        GenerationMode::OpenEnded | GenerationMode::Flashcard => {
            let answer = answer.ok_or(ParseError::MissingAnswer { item: index })?;
            Ok(Some(ParsedItem {
                stem,
                options: Vec::new(),
                answer,
                explanation,
            }))
        }
    }
}

/// Strips a leading "1." / "2)" style enumeration the model sometimes
/// adds despite the prompt.
fn strip_enumeration(line: &str) -> &str {
    let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits == 0 || digits > 3 {
        return line;
    }
    let rest = &line[digits..];
    if let Some(stripped) = rest.strip_prefix('.').or_else(|| rest.strip_prefix(')')) {
        stripped.trim_start()
    } else {
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_multiple_choice_blocks() {
        let output = "Q: Which organelle produces ATP?\nO: Ribosome\nO*: Mitochondrion\nO: Nucleus\nE: Site of oxidative phosphorylation.\n\nQ: What does DNA stand for?\nO*: Deoxyribonucleic acid\nO: Dinucleic acid\n";
        let items = parse_model_output(output, GenerationMode::MultipleChoice).unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].stem, "Which organelle produces ATP?");
        assert_eq!(items[0].options.len(), 3);
        assert_eq!(items[0].answer, "Mitochondrion");
        assert_eq!(
            items[0].explanation.as_deref(),
            Some("Site of oxidative phosphorylation.")
        );
        assert_eq!(items[1].answer, "Deoxyribonucleic acid");
    }

    #[test]
    fn test_parses_open_ended() {
        let output = "Q: Explain osmosis.\nA: Diffusion of water across a membrane.\n";
        let items = parse_model_output(output, GenerationMode::OpenEnded).unwrap();
        assert_eq!(items.len(), 1);
        assert!(items[0].options.is_empty());
        assert_eq!(items[0].answer, "Diffusion of water across a membrane.");
    }

    #[test]
    fn test_strips_enumeration_prefixes() {
        let output = "1. Q: First?\nA: Yes.\n\n2) Q: Second?\nA: Also yes.\n";
        let items = parse_model_output(output, GenerationMode::Flashcard).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].stem, "First?");
        assert_eq!(items[1].stem, "Second?");
    }

    #[test]
    fn test_wrapped_stem_lines_join() {
        let output = "Q: A question that\nwraps onto two lines?\nA: Answer.\n";
        let items = parse_model_output(output, GenerationMode::OpenEnded).unwrap();
        assert_eq!(items[0].stem, "A question that wraps onto two lines?");
    }

    #[test]
    fn test_preamble_is_tolerated() {
        let output = "Here are your questions:\n\nQ: Real one?\nA: Yes.\n";
        let items = parse_model_output(output, GenerationMode::OpenEnded).unwrap();
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn test_empty_output_is_error() {
        assert!(matches!(
            parse_model_output("", GenerationMode::OpenEnded),
            Err(ParseError::EmptyOutput)
        ));
        assert!(matches!(
            parse_model_output("no items here", GenerationMode::OpenEnded),
            Err(ParseError::EmptyOutput)
        ));
    }

    #[test]
    fn test_answers_without_stem_are_malformed() {
        let output = "A: An answer floating free.\n";
        assert!(matches!(
            parse_model_output(output, GenerationMode::OpenEnded),
            Err(ParseError::Malformed(_))
        ));
    }

    #[test]
    fn test_missing_answer_fails_block() {
        let output = "Q: Unanswered?\n";
        assert!(matches!(
            parse_model_output(output, GenerationMode::OpenEnded),
            Err(ParseError::MissingAnswer { item: 1 })
        ));
    }

    #[test]
    fn test_multiple_choice_needs_two_options() {
        let output = "Q: Only one option?\nO*: Sole\n";
        assert!(matches!(
            parse_model_output(output, GenerationMode::MultipleChoice),
            Err(ParseError::MissingOptions { item: 1, found: 1 })
        ));
    }

    #[test]
    fn test_answer_must_match_an_option() {
        let output = "Q: Mismatch?\nO: A\nO: B\nA: C\n";
        assert!(matches!(
            parse_model_output(output, GenerationMode::MultipleChoice),
            Err(ParseError::AnswerNotInOptions { item: 1 })
        ));
    }
}
