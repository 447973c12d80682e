//! Extractor routing: one question, one ordered queue of strategies, one
//! answer-shaped result.
//!
//! The pipeline never fails. Every path, including "no extractor could
//! answer" and "the corpus is empty", terminates in an `AnswerResult`
//! so callers see a low-confidence textual answer instead of an error.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use crate::extractor::{
    Extractor, GenericOverlapExtractor, StructuredTextExtractor, TabularExtractor,
};
use crate::models::{AnswerResult, Category, Document, ExtractorKind};
use crate::ranker::RankedCandidate;

/// Terminal answer when every extractor came up empty.
const FALLBACK_MESSAGE: &str =
    "I found related information but couldn't extract a specific answer. \
     Try rephrasing your question.";

/// Answer when the corpus holds no documents at all.
const NO_DOCUMENTS_MESSAGE: &str =
    "No documents have been uploaded yet, so there is nothing to answer from.";

const FALLBACK_CONFIDENCE: f32 = 0.3;

/// Routes a classified question through extractors in priority order.
///
/// The extractor queue is derived from the matched categories
/// (tabular > onboarding > policy > generic), with the overlap fallback
/// always appended last. The category-to-extractor mapping is
/// configuration data, so deployments can swap strategies without
/// touching the routing.
pub struct AnswerPipeline {
    extractors: BTreeMap<Category, Box<dyn Extractor>>,
    fallback: GenericOverlapExtractor,
}

impl Default for AnswerPipeline {
    fn default() -> Self {
        let mut extractors: BTreeMap<Category, Box<dyn Extractor>> = BTreeMap::new();
        extractors.insert(Category::Tabular, Box::new(TabularExtractor::new()));
        extractors.insert(
            Category::Onboarding,
            Box::new(StructuredTextExtractor::onboarding()),
        );
        extractors.insert(Category::Policy, Box::new(StructuredTextExtractor::policy()));
        extractors.insert(Category::Generic, Box::new(GenericOverlapExtractor::new()));

        Self {
            extractors,
            fallback: GenericOverlapExtractor::new(),
        }
    }
}

impl AnswerPipeline {
    /// Creates a pipeline with the default category-to-extractor mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a pipeline with a custom category-to-extractor mapping.
    /// The overlap fallback still runs last regardless of the mapping.
    pub fn with_extractors(extractors: BTreeMap<Category, Box<dyn Extractor>>) -> Self {
        Self {
            extractors,
            fallback: GenericOverlapExtractor::new(),
        }
    }

    /// Runs the question through the extractor queue and returns the first
    /// non-empty result, or a terminal fallback answer.
    ///
    /// When ranking produced no candidates the full corpus is used
    /// instead, so a question can still be answered from a document that
    /// fell below the similarity threshold.
    pub fn run(
        &self,
        question: &str,
        categories: &BTreeSet<Category>,
        candidates: &[RankedCandidate<'_>],
        corpus: &[Document],
    ) -> AnswerResult {
        if corpus.is_empty() {
            return AnswerResult::new(NO_DOCUMENTS_MESSAGE, None, 0.0, ExtractorKind::Fallback);
        }

        let documents: Vec<&Document> = if candidates.is_empty() {
            corpus.iter().collect()
        } else {
            candidates.iter().map(|candidate| candidate.document).collect()
        };

        for category in categories {
            let Some(extractor) = self.extractors.get(category) else {
                continue;
            };
            if let Some(result) = extractor.attempt(question, &documents) {
                debug!(category = %category, extractor = %result.extractor(), "extractor answered");
                return result;
            }
        }

        // The overlap fallback always gets a turn, unless the generic
        // extractor already ran as a matched category.
        let generic_ran = categories.contains(&Category::Generic)
            && self.extractors.contains_key(&Category::Generic);
        if !generic_ran {
            if let Some(result) = self.fallback.attempt(question, &documents) {
                debug!(extractor = %result.extractor(), "fallback extractor answered");
                return result;
            }
        }

        let source = documents.first().map(|doc| doc.filename.clone());
        AnswerResult::new(
            FALLBACK_MESSAGE,
            source,
            FALLBACK_CONFIDENCE,
            ExtractorKind::Fallback,
        )
    }
}
