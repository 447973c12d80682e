mod answer;
mod document;
mod ids;
mod query;

pub use answer::{AnswerResult, Category, ExtractorKind};
pub use document::{Document, DocumentBuilder, FileType};
pub use ids::DocumentId;
pub use query::{QueryLogEntry, QueryResponse, ScoredDocument};
