use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::{AnswerResult, DocumentId};

/// Maximum number of content characters carried in a candidate preview.
const PREVIEW_LIMIT: usize = 500;

/// Display projection of a ranked candidate document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredDocument {
    pub id: DocumentId,
    pub filename: String,
    pub similarity: f32,
    /// Content truncated for display.
    pub preview: String,
}

impl ScoredDocument {
    /// Creates a scored document, truncating the content to a preview.
    pub fn new(id: DocumentId, filename: impl Into<String>, similarity: f32, content: &str) -> Self {
        let preview = if content.chars().count() > PREVIEW_LIMIT {
            let truncated: String = content.chars().take(PREVIEW_LIMIT).collect();
            format!("{truncated}...")
        } else {
            content.to_string()
        };
        Self {
            id,
            filename: filename.into(),
            similarity,
            preview,
        }
    }
}

/// The complete result of one query: the synthesized answer plus the
/// ranked candidates that informed it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResponse {
    pub answer: AnswerResult,
    pub candidates: Vec<ScoredDocument>,
    pub latency_ms: i64,
}

/// One append-only record of a processed query.
///
/// Written once per query by the orchestrator and never read by the
/// engine itself; consumed by the surrounding system for analytics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryLogEntry {
    pub question: String,
    pub query_embedding: Vec<f32>,
    pub result_count: usize,
    pub latency_ms: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}
