pub mod classifier;
pub mod db;
pub mod embed;
pub mod extractor;
pub mod ingest;
pub mod models;
pub mod pipeline;
pub mod ranker;
pub mod service;
pub mod store;
pub mod utils;

pub use classifier::QuestionClassifier;
pub use db::Database;
pub use embed::{EmbedError, Embedder, HttpEmbedder, HttpEmbedderBuilder};
pub use extractor::{
    Extractor, GenericOverlapExtractor, StructuredTextExtractor, TabularExtractor,
};
pub use ingest::{DocumentIngestor, IngestError};
pub use models::{
    AnswerResult, Category, Document, DocumentBuilder, DocumentId, ExtractorKind, FileType,
    QueryLogEntry, QueryResponse, ScoredDocument,
};
pub use pipeline::AnswerPipeline;
pub use ranker::{EngineError, RankedCandidate, rank};
pub use service::{QueryConfig, QueryService};
pub use store::CorpusStore;
