//! Cosine-similarity ranking of corpus documents against a query vector.
//!
//! The corpus is scanned linearly, O(n * D) per query. That is the
//! documented bound for the small in-memory corpora this engine targets;
//! a larger corpus would swap an approximate index in behind the same
//! `rank` contract.

use thiserror::Error;

use crate::models::Document;

/// Fatal engine contract violations.
///
/// Ordinary "no answer" conditions (empty corpus, nothing above the
/// similarity threshold, extractor misses) are NOT errors; they degrade to
/// answer-shaped results in the pipeline. The only hard failure is a
/// caller handing in vectors of mismatched dimension.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Query vector and document embeddings differ in length.
    #[error("embedding dimension mismatch: corpus has {expected}, query has {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

/// A document surviving similarity-threshold filtering for one query.
///
/// Ephemeral: borrows from the corpus snapshot and is recomputed per query.
#[derive(Debug, Clone, Copy)]
pub struct RankedCandidate<'a> {
    pub document: &'a Document,
    pub similarity: f32,
}

/// Scores and orders documents against a query vector.
///
/// Keeps candidates with cosine similarity `>= threshold`, sorted
/// descending, truncated to `top_k`. Documents with a zero-norm embedding
/// have no defined similarity and are skipped rather than erroring. Ties
/// preserve corpus insertion order (the sort is stable), so repeated calls
/// over the same corpus return the same list.
///
/// # Errors
///
/// Returns `EngineError::DimensionMismatch` if any document embedding has
/// a different length than the query vector. The query is aborted rather
/// than silently truncating either vector.
pub fn rank<'a>(
    query: &[f32],
    documents: &'a [Document],
    threshold: f32,
    top_k: usize,
) -> Result<Vec<RankedCandidate<'a>>, EngineError> {
    let mut candidates = Vec::new();

    for document in documents {
        if document.embedding.len() != query.len() {
            return Err(EngineError::DimensionMismatch {
                expected: document.embedding.len(),
                actual: query.len(),
            });
        }

        let Some(similarity) = cosine_similarity(query, &document.embedding) else {
            continue;
        };

        if similarity >= threshold {
            candidates.push(RankedCandidate {
                document,
                similarity,
            });
        }
    }

    // Stable sort: equal scores keep corpus insertion order.
    candidates.sort_by(|a, b| {
        b.similarity
            .partial_cmp(&a.similarity)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    candidates.truncate(top_k);

    Ok(candidates)
}

/// Normalized dot product of two equal-length vectors, in [-1, 1].
///
/// Returns `None` when either vector has zero norm.
fn cosine_similarity(a: &[f32], b: &[f32]) -> Option<f32> {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return None;
    }

    Some(dot / (norm_a * norm_b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DocumentBuilder, DocumentId};

    fn doc(id: i64, filename: &str, embedding: Vec<f32>) -> Document {
        DocumentBuilder::new()
            .id(DocumentId::new(id))
            .filename(filename)
            .content("content")
            .embedding(embedding)
            .build()
    }

    #[test]
    fn empty_corpus_yields_empty_ranking() {
        let result = rank(&[1.0, 0.0], &[], 0.2, 5).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn threshold_filters_low_similarity_documents() {
        // Similarities against the query [1, 0]: 0.9-ish, 0.15-ish, 0.05-ish.
        let corpus = vec![
            doc(1, "a.txt", vec![0.9, (1.0f32 - 0.81).sqrt()]),
            doc(2, "b.txt", vec![0.15, (1.0f32 - 0.0225).sqrt()]),
            doc(3, "c.txt", vec![0.05, (1.0f32 - 0.0025).sqrt()]),
        ];

        let result = rank(&[1.0, 0.0], &corpus, 0.2, 5).unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].document.filename, "a.txt");
        assert!((result[0].similarity - 0.9).abs() < 1e-5);
    }

    #[test]
    fn results_sorted_descending_by_similarity() {
        let corpus = vec![
            doc(1, "low.txt", vec![0.3, 1.0]),
            doc(2, "high.txt", vec![1.0, 0.0]),
            doc(3, "mid.txt", vec![1.0, 1.0]),
        ];

        let result = rank(&[1.0, 0.0], &corpus, 0.0, 5).unwrap();

        assert_eq!(result[0].document.filename, "high.txt");
        assert_eq!(result[1].document.filename, "mid.txt");
        assert_eq!(result[2].document.filename, "low.txt");
    }

    #[test]
    fn equal_scores_keep_corpus_insertion_order() {
        // Two documents with identical embeddings tie exactly.
        let corpus = vec![
            doc(1, "first.txt", vec![1.0, 1.0]),
            doc(2, "second.txt", vec![1.0, 1.0]),
        ];

        for _ in 0..3 {
            let result = rank(&[1.0, 0.0], &corpus, 0.0, 5).unwrap();
            assert_eq!(result[0].document.filename, "first.txt");
            assert_eq!(result[1].document.filename, "second.txt");
        }
    }

    #[test]
    fn top_k_truncates_result() {
        let corpus = vec![
            doc(1, "a.txt", vec![1.0, 0.0]),
            doc(2, "b.txt", vec![1.0, 0.1]),
            doc(3, "c.txt", vec![1.0, 0.2]),
        ];

        let result = rank(&[1.0, 0.0], &corpus, 0.0, 2).unwrap();
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn zero_norm_document_is_skipped_not_an_error() {
        let corpus = vec![
            doc(1, "zero.txt", vec![0.0, 0.0]),
            doc(2, "ok.txt", vec![1.0, 0.0]),
        ];

        let result = rank(&[1.0, 0.0], &corpus, 0.0, 5).unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].document.filename, "ok.txt");
    }

    #[test]
    fn zero_norm_query_matches_nothing() {
        let corpus = vec![doc(1, "a.txt", vec![1.0, 0.0])];
        let result = rank(&[0.0, 0.0], &corpus, 0.0, 5).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn dimension_mismatch_is_fatal() {
        let corpus = vec![doc(1, "a.txt", vec![1.0, 0.0, 0.0])];

        let err = rank(&[1.0, 0.0], &corpus, 0.0, 5).unwrap_err();
        match err {
            EngineError::DimensionMismatch { expected, actual } => {
                assert_eq!(expected, 3);
                assert_eq!(actual, 2);
            }
        }
    }

    #[test]
    fn cosine_of_opposite_vectors_is_negative_one() {
        let sim = cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]).unwrap();
        assert!((sim + 1.0).abs() < 1e-6);
    }
}
