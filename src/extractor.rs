//! Answer-extraction strategies.
//!
//! Each extractor attempts to synthesize a direct answer from one or more
//! candidate documents. Failure to answer is a normal, expected outcome
//! expressed as `None`, never as an error: internal parse problems are
//! recovered locally so the pipeline can move on to the next strategy.

mod generic;
mod structured;
mod tabular;

pub use generic::GenericOverlapExtractor;
pub use structured::{ExtractionRule, StructuredTextExtractor};
pub use tabular::TabularExtractor;

use crate::models::{AnswerResult, Document, ExtractorKind};

/// A strategy that attempts to synthesize a specific answer from document
/// text.
///
/// Implementations share one edge policy: if the question's dimension or
/// keyword is absent from all candidate documents, the extractor returns
/// `None` rather than guessing.
pub trait Extractor: Send + Sync {
    /// Identifies this strategy in answer attribution.
    fn kind(&self) -> ExtractorKind;

    /// Attempts to answer the question from the candidate documents,
    /// which are ordered best-match first.
    fn attempt(&self, question: &str, documents: &[&Document]) -> Option<AnswerResult>;
}
