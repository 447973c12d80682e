//! Embedding generation via an external service.
//!
//! The engine never computes embeddings itself; it consumes vectors
//! produced by a deployed embedding service. This module provides the
//! blocking HTTP client for that service plus the `Embedder` trait used
//! to mock it in tests.

mod client;

pub use client::{EmbedError, Embedder, HttpEmbedder, HttpEmbedderBuilder, retry_with_backoff};
