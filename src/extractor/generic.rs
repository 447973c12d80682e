//! Fallback extraction by question-token overlap.
//!
//! Picks the single sentence sharing the most question tokens with the
//! question. This is the last strategy in every pipeline run: weaker than
//! the specialized extractors, but applicable to any prose document.

use std::collections::HashSet;

use crate::models::{AnswerResult, Document, ExtractorKind};

use super::Extractor;

const CONFIDENCE: f32 = 0.6;

/// Minimum number of distinct question tokens a sentence must contain.
const MIN_OVERLAP: usize = 2;

/// Question tokens at or below this length carry no signal.
const MIN_TOKEN_LEN: usize = 4;

/// Sentences shorter than this are fragments, not answers.
const MIN_SENTENCE_LEN: usize = 10;

/// Selects the document sentence with the highest question-token overlap.
#[derive(Debug, Default)]
pub struct GenericOverlapExtractor;

impl GenericOverlapExtractor {
    /// Creates a new overlap extractor.
    pub fn new() -> Self {
        Self
    }
}

impl Extractor for GenericOverlapExtractor {
    fn kind(&self) -> ExtractorKind {
        ExtractorKind::GenericOverlap
    }

    fn attempt(&self, question: &str, documents: &[&Document]) -> Option<AnswerResult> {
        let tokens = question_tokens(question);
        if tokens.is_empty() {
            return None;
        }

        let mut best: Option<(usize, &str, &Document)> = None;

        for &document in documents {
            for sentence in sentences(&document.content) {
                let lowered = sentence.to_lowercase();
                let score = tokens
                    .iter()
                    .filter(|token| lowered.contains(token.as_str()))
                    .count();

                if score < MIN_OVERLAP {
                    continue;
                }

                // Strictly-greater comparison keeps the earliest sentence
                // (and earliest-ranked document) on ties.
                let better = match best {
                    None => true,
                    Some((best_score, _, _)) => score > best_score,
                };
                if better {
                    best = Some((score, sentence, document));
                }
            }
        }

        let (_, sentence, document) = best?;
        Some(AnswerResult::new(
            format!("{sentence}."),
            Some(document.filename.clone()),
            CONFIDENCE,
            ExtractorKind::GenericOverlap,
        ))
    }
}

/// Splits content into sentences on terminal punctuation and line breaks,
/// dropping fragments.
fn sentences(content: &str) -> impl Iterator<Item = &str> {
    content
        .split(['.', '!', '?', '\n'])
        .map(str::trim)
        .filter(|sentence| sentence.len() >= MIN_SENTENCE_LEN)
}

/// Distinct lowercased question tokens longer than three characters.
fn question_tokens(question: &str) -> HashSet<String> {
    question
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| token.len() >= MIN_TOKEN_LEN)
        .map(str::to_string)
        .collect()
}
