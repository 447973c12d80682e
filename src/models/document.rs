use serde::{Deserialize, Serialize};
use std::fmt;

use super::DocumentId;

/// Source format of an ingested document.
///
/// Determined from the file extension at ingestion time. The engine only
/// ever sees the normalized text content; the type is kept for display
/// and for ingestion routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Text,
    Markdown,
    Csv,
    Json,
}

impl FileType {
    /// Maps a file extension (without the dot, any case) to a file type.
    ///
    /// Returns `None` for unsupported extensions.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "txt" => Some(Self::Text),
            "md" | "markdown" => Some(Self::Markdown),
            "csv" => Some(Self::Csv),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    /// Returns the canonical lowercase name of the file type.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Markdown => "markdown",
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }

    /// Parses the canonical name back into a file type.
    ///
    /// Unknown names fall back to `Text` so that rows written by older
    /// versions of the schema still load.
    pub fn parse(s: &str) -> Self {
        match s {
            "markdown" => Self::Markdown,
            "csv" => Self::Csv,
            "json" => Self::Json,
            _ => Self::Text,
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An uploaded document with its normalized text content and embedding.
///
/// Documents are immutable once created: they are built at ingestion time,
/// owned by the corpus store, and only ever handed to the engine as part of
/// a read-only snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Unique identifier from the database.
    pub id: DocumentId,
    /// Original filename of the upload.
    pub filename: String,
    /// Normalized plain-text content.
    pub content: String,
    /// Fixed-length embedding vector for the content.
    pub embedding: Vec<f32>,
    /// Source format of the upload.
    pub file_type: FileType,
}

/// Builder for constructing `Document` instances.
///
/// # Examples
///
/// ```
/// use docq::{DocumentBuilder, DocumentId};
///
/// let doc = DocumentBuilder::new()
///     .id(DocumentId::new(1))
///     .filename("handbook.md")
///     .content("Welcome to the company.")
///     .embedding(vec![0.1, 0.2, 0.3])
///     .build();
///
/// assert_eq!(doc.filename, "handbook.md");
/// ```
#[derive(Debug, Default)]
pub struct DocumentBuilder {
    id: Option<DocumentId>,
    filename: Option<String>,
    content: Option<String>,
    embedding: Option<Vec<f32>>,
    file_type: Option<FileType>,
}

impl DocumentBuilder {
    /// Creates a new `DocumentBuilder`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the document ID.
    pub fn id(mut self, id: DocumentId) -> Self {
        self.id = Some(id);
        self
    }

    /// Sets the filename.
    pub fn filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// Sets the text content.
    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Sets the embedding vector.
    pub fn embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = Some(embedding);
        self
    }

    /// Sets the file type. Defaults to `FileType::Text` when not set.
    pub fn file_type(mut self, file_type: FileType) -> Self {
        self.file_type = Some(file_type);
        self
    }

    /// Builds the `Document`.
    ///
    /// # Panics
    ///
    /// Panics if `id`, `filename`, `content`, or `embedding` have not been set.
    pub fn build(self) -> Document {
        Document {
            id: self.id.expect("id is required"),
            filename: self.filename.expect("filename is required"),
            content: self.content.expect("content is required"),
            embedding: self.embedding.expect("embedding is required"),
            file_type: self.file_type.unwrap_or(FileType::Text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_creates_document_with_default_file_type() {
        let doc = DocumentBuilder::new()
            .id(DocumentId::new(1))
            .filename("notes.txt")
            .content("hello")
            .embedding(vec![1.0, 0.0])
            .build();

        assert_eq!(doc.id, DocumentId::new(1));
        assert_eq!(doc.file_type, FileType::Text);
    }

    #[test]
    fn file_type_from_extension_covers_supported_formats() {
        assert_eq!(FileType::from_extension("txt"), Some(FileType::Text));
        assert_eq!(FileType::from_extension("MD"), Some(FileType::Markdown));
        assert_eq!(FileType::from_extension("csv"), Some(FileType::Csv));
        assert_eq!(FileType::from_extension("json"), Some(FileType::Json));
        assert_eq!(FileType::from_extension("docx"), None);
    }

    #[test]
    fn file_type_round_trips_through_canonical_name() {
        for ft in [
            FileType::Text,
            FileType::Markdown,
            FileType::Csv,
            FileType::Json,
        ] {
            assert_eq!(FileType::parse(ft.as_str()), ft);
        }
    }
}
