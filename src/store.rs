//! Corpus ownership and snapshot semantics.
//!
//! A single `CorpusStore` owns document lifetime. The engine only ever
//! receives read-only snapshots: readers clone an `Arc` under a read lock,
//! insertions build a new corpus vector and swap it in under the write
//! lock. A concurrent reader therefore sees either the pre-insertion or
//! the post-insertion corpus, never a partially-inserted one.

use std::sync::{Arc, Mutex, RwLock};

use anyhow::{Result, bail};

use crate::db::Database;
use crate::models::{Document, FileType, QueryLogEntry};

/// Owns the document corpus and the append-only query log.
pub struct CorpusStore {
    db: Mutex<Database>,
    corpus: RwLock<Arc<Vec<Document>>>,
}

impl CorpusStore {
    /// Creates a store over the given database, loading the existing
    /// corpus into memory.
    pub fn new(db: Database) -> Result<Self> {
        let documents = db.all_documents()?;
        Ok(Self {
            db: Mutex::new(db),
            corpus: RwLock::new(Arc::new(documents)),
        })
    }

    /// Returns an immutable snapshot of the corpus in insertion order.
    ///
    /// Cheap: clones an `Arc`, not the documents.
    pub fn snapshot(&self) -> Arc<Vec<Document>> {
        Arc::clone(&self.corpus.read().expect("corpus lock poisoned"))
    }

    /// Ingests a document: persists it, then atomically publishes the new
    /// corpus snapshot.
    ///
    /// # Errors
    ///
    /// Fails if the embedding dimension differs from the existing corpus
    /// (the corpus-wide dimension invariant), or on storage errors.
    pub fn add_document(
        &self,
        filename: &str,
        content: &str,
        file_type: FileType,
        embedding: &[f32],
    ) -> Result<Document> {
        let mut corpus = self.corpus.write().expect("corpus lock poisoned");

        if let Some(existing) = corpus.first() {
            if existing.embedding.len() != embedding.len() {
                bail!(
                    "Embedding dimension {} does not match corpus dimension {}",
                    embedding.len(),
                    existing.embedding.len()
                );
            }
        }

        let document = self
            .db
            .lock()
            .expect("database lock poisoned")
            .insert_document(filename, content, file_type, embedding)?;

        let mut next = corpus.as_ref().clone();
        next.push(document.clone());
        *corpus = Arc::new(next);

        Ok(document)
    }

    /// Returns the number of documents in the corpus.
    pub fn len(&self) -> usize {
        self.corpus.read().expect("corpus lock poisoned").len()
    }

    /// True when the corpus holds no documents.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Looks up a document by filename in the current snapshot.
    ///
    /// Filenames are not unique; the earliest upload wins.
    pub fn document_by_filename(&self, filename: &str) -> Option<Document> {
        self.snapshot()
            .iter()
            .find(|doc| doc.filename == filename)
            .cloned()
    }

    /// Appends one entry to the query log.
    pub fn append_query_log(&self, entry: &QueryLogEntry) -> Result<()> {
        self.db
            .lock()
            .expect("database lock poisoned")
            .append_query_log(entry)
    }

    /// Returns the number of logged queries.
    pub fn query_count(&self) -> Result<i64> {
        self.db
            .lock()
            .expect("database lock poisoned")
            .query_count()
    }

    /// Loads the most recent query-log entries, newest first.
    pub fn recent_queries(&self, limit: usize) -> Result<Vec<QueryLogEntry>> {
        self.db
            .lock()
            .expect("database lock poisoned")
            .recent_queries(limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> CorpusStore {
        CorpusStore::new(Database::in_memory().unwrap()).unwrap()
    }

    #[test]
    fn new_store_over_empty_database_is_empty() {
        let store = store();
        assert!(store.is_empty());
        assert!(store.snapshot().is_empty());
    }

    #[test]
    fn add_document_appears_in_new_snapshots_only() {
        let store = store();

        let before = store.snapshot();
        store
            .add_document("a.txt", "alpha", FileType::Text, &[1.0, 0.0])
            .unwrap();
        let after = store.snapshot();

        // The pre-insertion snapshot is immutable.
        assert!(before.is_empty());
        assert_eq!(after.len(), 1);
        assert_eq!(after[0].filename, "a.txt");
    }

    #[test]
    fn mismatched_embedding_dimension_is_rejected() {
        let store = store();
        store
            .add_document("a.txt", "alpha", FileType::Text, &[1.0, 0.0])
            .unwrap();

        let result = store.add_document("b.txt", "beta", FileType::Text, &[1.0, 0.0, 0.0]);
        assert!(result.is_err());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn store_reloads_corpus_from_database() {
        let db = Database::in_memory().unwrap();
        db.insert_document("a.txt", "alpha", FileType::Text, &[1.0])
            .unwrap();
        db.insert_document("b.txt", "beta", FileType::Text, &[0.5])
            .unwrap();

        let store = CorpusStore::new(db).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.snapshot()[1].filename, "b.txt");
    }

    #[test]
    fn document_by_filename_finds_earliest_match() {
        let store = store();
        store
            .add_document("dup.txt", "first", FileType::Text, &[1.0])
            .unwrap();
        store
            .add_document("dup.txt", "second", FileType::Text, &[1.0])
            .unwrap();

        let found = store.document_by_filename("dup.txt").unwrap();
        assert_eq!(found.content, "first");

        assert!(store.document_by_filename("missing.txt").is_none());
    }

    #[test]
    fn query_log_round_trips_through_store() {
        let store = store();

        let entry = QueryLogEntry {
            question: "anything".to_string(),
            query_embedding: vec![0.3],
            result_count: 1,
            latency_ms: 4,
            created_at: time::OffsetDateTime::now_utc(),
        };
        store.append_query_log(&entry).unwrap();

        assert_eq!(store.query_count().unwrap(), 1);
        assert_eq!(store.recent_queries(5).unwrap()[0].question, "anything");
    }
}
