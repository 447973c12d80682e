/// Complete database schema for the document Q&A service.
///
/// Uses CREATE TABLE/INDEX IF NOT EXISTS for idempotent execution.
/// Embeddings are stored as JSON arrays in TEXT columns, matching how the
/// documents were embedded at ingestion time.
pub const INITIAL_SCHEMA: &str = r#"
-- Documents table: normalized text content plus its embedding vector.
-- Rowid order is corpus insertion order, which ranking relies on for
-- deterministic tie-breaking.
CREATE TABLE IF NOT EXISTS documents (
    id INTEGER PRIMARY KEY,
    filename TEXT NOT NULL,
    content TEXT NOT NULL,
    file_type TEXT NOT NULL,
    embedding TEXT NOT NULL,
    uploaded_at INTEGER
);

-- Query history: one append-only row per processed query.
CREATE TABLE IF NOT EXISTS query_history (
    id INTEGER PRIMARY KEY,
    question TEXT NOT NULL,
    query_embedding TEXT NOT NULL,
    result_count INTEGER,
    latency_ms INTEGER,
    created_at INTEGER
);

-- Index for filename lookups (the `show` command).
CREATE INDEX IF NOT EXISTS idx_documents_filename ON documents(filename);

-- Index for time-ordered history reads.
CREATE INDEX IF NOT EXISTS idx_query_history_created ON query_history(created_at);
"#;
