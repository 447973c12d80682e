use std::time::Instant;

use anyhow::{Context, Result};
use time::OffsetDateTime;
use tracing::info;

use crate::classifier::QuestionClassifier;
use crate::models::{Document, QueryLogEntry, QueryResponse, ScoredDocument};
use crate::pipeline::AnswerPipeline;
use crate::ranker::{self, EngineError};
use crate::store::CorpusStore;

/// Ranking configuration for queries.
///
/// Parsed from environment variables with fallback defaults.
#[derive(Debug, Clone)]
pub struct QueryConfig {
    /// Minimum cosine similarity for a document to become a candidate
    /// (default 0.2).
    pub similarity_threshold: f32,
    /// Maximum number of candidates kept after ranking (default 5).
    pub top_k: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.2,
            top_k: 5,
        }
    }
}

impl QueryConfig {
    /// Parses configuration from environment variables.
    ///
    /// Falls back to defaults when env vars are not set or invalid.
    ///
    /// # Environment Variables
    ///
    /// - `DOCQ_THRESHOLD` (f32, default 0.2): Similarity threshold
    /// - `DOCQ_TOP_K` (usize, default 5): Candidate list size
    ///
    /// # Examples
    ///
    /// ```
    /// use docq::QueryConfig;
    ///
    /// let config = QueryConfig::from_env();
    /// assert_eq!(config.top_k, 5); // default when env var not set
    /// ```
    pub fn from_env() -> Self {
        let similarity_threshold = std::env::var("DOCQ_THRESHOLD")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(0.2);

        let top_k = std::env::var("DOCQ_TOP_K")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(5);

        Self {
            similarity_threshold,
            top_k,
        }
    }
}

/// Service layer composing ranking, classification, and extraction into
/// one query operation, with a query-log side effect.
///
/// QueryService owns a CorpusStore and is UI-independent: the CLI calls
/// it the same way a future HTTP surface would.
///
/// # Examples
///
/// ```
/// use docq::{CorpusStore, Database, QueryService};
///
/// # fn main() -> anyhow::Result<()> {
/// let store = CorpusStore::new(Database::in_memory()?)?;
/// let service = QueryService::new(store);
/// # Ok(())
/// # }
/// ```
pub struct QueryService {
    store: CorpusStore,
    classifier: QuestionClassifier,
    pipeline: AnswerPipeline,
    config: QueryConfig,
}

impl QueryService {
    /// Creates a service with the default query configuration.
    pub fn new(store: CorpusStore) -> Self {
        Self::with_config(store, QueryConfig::default())
    }

    /// Creates a service with an explicit query configuration.
    pub fn with_config(store: CorpusStore, config: QueryConfig) -> Self {
        Self {
            store,
            classifier: QuestionClassifier::new(),
            pipeline: AnswerPipeline::new(),
            config,
        }
    }

    /// Returns a reference to the underlying corpus store.
    pub fn store(&self) -> &CorpusStore {
        &self.store
    }

    /// Answers a question against the current corpus snapshot and appends
    /// one query-log entry.
    ///
    /// Ordinary "no answer" conditions never error: an empty corpus, an
    /// empty ranking, and extractor misses all degrade to a low-confidence
    /// answer. The only failures surfaced to the caller are the
    /// dimension-mismatch contract violation and storage faults.
    ///
    /// # Arguments
    ///
    /// * `question` - The natural-language question
    /// * `query_vector` - The question's embedding, produced upstream;
    ///   must match the corpus embedding dimension
    pub fn answer(&self, question: &str, query_vector: &[f32]) -> Result<QueryResponse> {
        let started = Instant::now();
        let snapshot = self.store.snapshot();

        let mut response = self.answer_snapshot(question, query_vector, &snapshot)?;
        response.latency_ms = started.elapsed().as_millis() as i64;

        self.store
            .append_query_log(&QueryLogEntry {
                question: question.to_string(),
                query_embedding: query_vector.to_vec(),
                result_count: response.candidates.len(),
                latency_ms: response.latency_ms,
                created_at: OffsetDateTime::now_utc(),
            })
            .context("Failed to append query log")?;

        info!(
            question,
            results = response.candidates.len(),
            latency_ms = response.latency_ms,
            confidence = response.answer.confidence(),
            "query answered"
        );

        Ok(response)
    }

    /// Runs the pure engine (rank, classify, extract) over a
    /// caller-provided corpus snapshot, without touching the store or the
    /// query log. `latency_ms` is left at zero.
    ///
    /// # Errors
    ///
    /// Only `EngineError::DimensionMismatch`.
    pub fn answer_snapshot(
        &self,
        question: &str,
        query_vector: &[f32],
        corpus: &[Document],
    ) -> Result<QueryResponse, EngineError> {
        let candidates = ranker::rank(
            query_vector,
            corpus,
            self.config.similarity_threshold,
            self.config.top_k,
        )?;
        let categories = self.classifier.classify(question);
        let answer = self.pipeline.run(question, &categories, &candidates, corpus);

        let scored = candidates
            .iter()
            .map(|candidate| {
                ScoredDocument::new(
                    candidate.document.id,
                    candidate.document.filename.as_str(),
                    candidate.similarity,
                    &candidate.document.content,
                )
            })
            .collect();

        Ok(QueryResponse {
            answer,
            candidates: scored,
            latency_ms: 0,
        })
    }
}
