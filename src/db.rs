mod schema;

use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::Connection;
use time::OffsetDateTime;

use schema::INITIAL_SCHEMA;

use crate::models::{Document, DocumentBuilder, DocumentId, FileType, QueryLogEntry};

/// Database wrapper providing connection management and schema
/// initialization for documents and query history.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens an in-memory SQLite database.
    ///
    /// Automatically initializes the schema on connection open.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.initialize_schema()?;
        Ok(db)
    }

    /// Opens a file-based SQLite database at the given path.
    ///
    /// Creates the database file if it does not exist.
    /// Automatically initializes the schema on connection open.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.initialize_schema()?;
        Ok(db)
    }

    /// Initializes the database schema.
    ///
    /// All statements use IF NOT EXISTS, so execution is idempotent on
    /// both fresh and existing databases.
    fn initialize_schema(&self) -> Result<()> {
        self.conn.execute_batch(INITIAL_SCHEMA)?;
        Ok(())
    }

    /// Returns a reference to the underlying connection.
    ///
    /// Useful for executing custom queries in tests.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Inserts a document and returns it with its assigned ID.
    ///
    /// The embedding is stored as a JSON array, the upload time as a Unix
    /// timestamp.
    pub fn insert_document(
        &self,
        filename: &str,
        content: &str,
        file_type: FileType,
        embedding: &[f32],
    ) -> Result<Document> {
        let embedding_json =
            serde_json::to_string(embedding).context("Failed to serialize embedding")?;
        let now = OffsetDateTime::now_utc().unix_timestamp();

        self.conn.execute(
            "INSERT INTO documents (filename, content, file_type, embedding, uploaded_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            (filename, content, file_type.as_str(), &embedding_json, now),
        )?;

        let id = self.conn.last_insert_rowid();

        Ok(DocumentBuilder::new()
            .id(DocumentId::new(id))
            .filename(filename)
            .content(content)
            .embedding(embedding.to_vec())
            .file_type(file_type)
            .build())
    }

    /// Loads every document in corpus insertion order.
    ///
    /// Insertion order is what ranking ties break on, so the ORDER BY id
    /// here is load-bearing.
    pub fn all_documents(&self) -> Result<Vec<Document>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, filename, content, file_type, embedding
             FROM documents ORDER BY id",
        )?;

        let rows = stmt.query_map([], |row| {
            let id: i64 = row.get(0)?;
            let filename: String = row.get(1)?;
            let content: String = row.get(2)?;
            let file_type: String = row.get(3)?;
            let embedding_json: String = row.get(4)?;
            Ok((id, filename, content, file_type, embedding_json))
        })?;

        let mut documents = Vec::new();
        for row_result in rows {
            let (id, filename, content, file_type, embedding_json) = row_result?;
            let embedding: Vec<f32> = serde_json::from_str(&embedding_json)
                .with_context(|| format!("Corrupt embedding for document {id}"))?;

            documents.push(
                DocumentBuilder::new()
                    .id(DocumentId::new(id))
                    .filename(filename)
                    .content(content)
                    .embedding(embedding)
                    .file_type(FileType::parse(&file_type))
                    .build(),
            );
        }

        Ok(documents)
    }

    /// Returns the number of stored documents.
    pub fn document_count(&self) -> Result<i64> {
        let count =
            self.conn
                .query_row("SELECT COUNT(*) FROM documents", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Appends one query-history row.
    pub fn append_query_log(&self, entry: &QueryLogEntry) -> Result<()> {
        let embedding_json = serde_json::to_string(&entry.query_embedding)
            .context("Failed to serialize query embedding")?;

        self.conn.execute(
            "INSERT INTO query_history (question, query_embedding, result_count, latency_ms, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            (
                &entry.question,
                &embedding_json,
                entry.result_count as i64,
                entry.latency_ms,
                entry.created_at.unix_timestamp(),
            ),
        )?;

        Ok(())
    }

    /// Returns the number of logged queries.
    pub fn query_count(&self) -> Result<i64> {
        let count =
            self.conn
                .query_row("SELECT COUNT(*) FROM query_history", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Loads the most recent query-log entries, newest first.
    pub fn recent_queries(&self, limit: usize) -> Result<Vec<QueryLogEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT question, query_embedding, result_count, latency_ms, created_at
             FROM query_history ORDER BY id DESC LIMIT ?1",
        )?;

        let rows = stmt.query_map([limit as i64], |row| {
            let question: String = row.get(0)?;
            let embedding_json: String = row.get(1)?;
            let result_count: i64 = row.get(2)?;
            let latency_ms: i64 = row.get(3)?;
            let created_at: i64 = row.get(4)?;
            Ok((question, embedding_json, result_count, latency_ms, created_at))
        })?;

        let mut entries = Vec::new();
        for row_result in rows {
            let (question, embedding_json, result_count, latency_ms, created_at) = row_result?;
            let query_embedding: Vec<f32> = serde_json::from_str(&embedding_json)
                .context("Corrupt query embedding in history")?;

            entries.push(QueryLogEntry {
                question,
                query_embedding,
                result_count: result_count as usize,
                latency_ms,
                created_at: OffsetDateTime::from_unix_timestamp(created_at)?,
            });
        }

        Ok(entries)
    }
}
