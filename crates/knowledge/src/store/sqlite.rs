//! SQLite-backed index store, one database file per partition.

use crate::embeddings::EmbeddingProvider;
use crate::store::{cosine_distance, IndexStore};
use crate::topic::Topic;
use crate::types::{Chunk, MetadataFilter, ScoredChunk};
use docqa_core::{AppError, AppResult};
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS chunks (
    id INTEGER PRIMARY KEY,
    source TEXT NOT NULL,
    topic TEXT NOT NULL,
    position INTEGER NOT NULL,
    text TEXT NOT NULL,
    embedding BLOB NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_chunks_source ON chunks(source);
CREATE INDEX IF NOT EXISTS idx_chunks_topic ON chunks(topic);
"#;

const DEFAULT_BATCH_SIZE: usize = 100;

/// Row as stored, before the topic label and embedding are decoded.
type RawRow = (String, String, i64, String, Vec<u8>);

/// Index store persisted in a SQLite database.
pub struct SqliteIndexStore {
    name: String,
    conn: Mutex<Connection>,
    embedder: Arc<dyn EmbeddingProvider>,
    batch_size: usize,
}

impl SqliteIndexStore {
    /// Open (or create) the store at `db_path`.
    pub fn open(
        name: impl Into<String>,
        db_path: &Path,
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> AppResult<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                AppError::Knowledge(format!("Failed to create index directory: {}", e))
            })?;
        }

        let conn = Connection::open(db_path)
            .map_err(|e| AppError::Knowledge(format!("Failed to open SQLite index: {}", e)))?;

        tracing::debug!("Opened SQLite index at {:?}", db_path);
        Self::with_connection(name.into(), conn, embedder)
    }

    /// Store backed by a private in-memory database.
    pub fn open_in_memory(
        name: impl Into<String>,
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> AppResult<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| AppError::Knowledge(format!("Failed to open SQLite index: {}", e)))?;
        Self::with_connection(name.into(), conn, embedder)
    }

    fn with_connection(
        name: String,
        conn: Connection,
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> AppResult<Self> {
        conn.execute_batch(SCHEMA)
            .map_err(|e| AppError::Knowledge(format!("Failed to create tables: {}", e)))?;

        Ok(Self {
            name,
            conn: Mutex::new(conn),
            embedder,
            batch_size: DEFAULT_BATCH_SIZE,
        })
    }

    /// Number of texts sent to the embedding provider per call during rebuilds.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn embedder(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.embedder
    }

    /// Replace the store's contents with `chunks`.
    ///
    /// Embeddings are computed first; the table swap happens in a single
    /// transaction, so a failed rebuild leaves the previous contents intact.
    pub async fn rebuild(&self, chunks: &[Chunk]) -> AppResult<usize> {
        let mut embeddings = Vec::with_capacity(chunks.len());
        for batch in chunks.chunks(self.batch_size) {
            let texts: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();
            let vectors = self.embedder.embed_batch(&texts).await?;
            if vectors.len() != texts.len() {
                return Err(AppError::Knowledge(format!(
                    "Embedding provider returned {} vectors for {} texts",
                    vectors.len(),
                    texts.len()
                )));
            }
            embeddings.extend(vectors);
        }

        self.replace_all(chunks, &embeddings)?;

        tracing::info!(
            store = %self.name,
            chunks = chunks.len(),
            model = self.embedder.model_name(),
            "Rebuilt index store"
        );

        Ok(chunks.len())
    }

    fn lock(&self) -> AppResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| AppError::Knowledge(format!("Index '{}' lock poisoned", self.name)))
    }

    fn replace_all(&self, chunks: &[Chunk], embeddings: &[Vec<f32>]) -> AppResult<()> {
        let mut conn = self.lock()?;
        let tx = conn
            .transaction()
            .map_err(|e| AppError::Knowledge(format!("Failed to begin transaction: {}", e)))?;

        tx.execute("DELETE FROM chunks", [])
            .map_err(|e| AppError::Knowledge(format!("Failed to delete chunks: {}", e)))?;

        {
            let mut stmt = tx
                .prepare(
                    "INSERT INTO chunks (source, topic, position, text, embedding)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                )
                .map_err(|e| AppError::Knowledge(format!("Failed to prepare insert: {}", e)))?;

            for (chunk, embedding) in chunks.iter().zip(embeddings) {
                stmt.execute(params![
                    chunk.metadata.source,
                    chunk.metadata.topic.as_str(),
                    chunk.metadata.position as i64,
                    chunk.text,
                    embedding_to_bytes(embedding),
                ])
                .map_err(|e| AppError::Knowledge(format!("Failed to insert chunk: {}", e)))?;
            }
        }

        tx.commit()
            .map_err(|e| AppError::Knowledge(format!("Failed to commit rebuild: {}", e)))?;

        Ok(())
    }

    fn scan(
        &self,
        query_embedding: &[f32],
        filter: Option<&MetadataFilter>,
    ) -> AppResult<Vec<ScoredChunk>> {
        let conn = self.lock()?;

        let (sql, value) = match filter {
            None => (
                "SELECT source, topic, position, text, embedding FROM chunks",
                None,
            ),
            Some(MetadataFilter::Source(source)) => (
                "SELECT source, topic, position, text, embedding FROM chunks WHERE source = ?1",
                Some(source.clone()),
            ),
            Some(MetadataFilter::Topic(topic)) => (
                "SELECT source, topic, position, text, embedding FROM chunks WHERE topic = ?1",
                Some(topic.as_str().to_string()),
            ),
        };

        let mut stmt = conn
            .prepare(sql)
            .map_err(|e| AppError::Knowledge(format!("Failed to prepare query: {}", e)))?;

        let read_row = |row: &rusqlite::Row<'_>| -> rusqlite::Result<RawRow> {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
        };

        let rows: Vec<RawRow> = match value {
            Some(value) => stmt.query_map(params![value], read_row),
            None => stmt.query_map([], read_row),
        }
        .and_then(|rows| rows.collect())
        .map_err(|e| AppError::Knowledge(format!("Failed to query chunks: {}", e)))?;

        rows.into_iter()
            .map(|(source, topic, position, text, blob)| {
                let topic = Topic::parse(&topic).ok_or_else(|| {
                    AppError::Knowledge(format!("Unknown topic '{}' in index", topic))
                })?;
                let embedding = bytes_to_embedding(&blob)?;

                Ok(ScoredChunk {
                    distance: cosine_distance(query_embedding, &embedding),
                    chunk: Chunk::new(text, source, topic, position as u32),
                })
            })
            .collect()
    }

    fn count_rows(&self) -> AppResult<usize> {
        let conn = self.lock()?;
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM chunks", [], |row| row.get(0))
            .map_err(|e| AppError::Knowledge(format!("Failed to count chunks: {}", e)))?;
        Ok(count as usize)
    }
}

#[async_trait::async_trait]
impl IndexStore for SqliteIndexStore {
    fn name(&self) -> &str {
        &self.name
    }

    async fn similarity_search_with_score(
        &self,
        query: &str,
        k: usize,
        filter: Option<&MetadataFilter>,
    ) -> AppResult<Vec<ScoredChunk>> {
        if k == 0 {
            return Ok(Vec::new());
        }

        let query_embedding = self.embedder.embed(query).await?;
        let mut results = self.scan(&query_embedding, filter)?;

        results.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.chunk.metadata.source.cmp(&b.chunk.metadata.source))
                .then_with(|| a.chunk.metadata.position.cmp(&b.chunk.metadata.position))
        });
        results.truncate(k);

        tracing::debug!(
            store = %self.name,
            filter = ?filter,
            "Retrieved {} chunks (requested top-{})",
            results.len(),
            k
        );

        Ok(results)
    }

    async fn count(&self) -> AppResult<usize> {
        self.count_rows()
    }
}

/// Convert embedding vector to little-endian bytes for storage.
fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(embedding.len() * 4);
    for &value in embedding {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    bytes
}

/// Convert bytes back to embedding vector.
fn bytes_to_embedding(bytes: &[u8]) -> AppResult<Vec<f32>> {
    if bytes.len() % 4 != 0 {
        return Err(AppError::Knowledge(
            "Invalid embedding bytes length".to_string(),
        ));
    }

    Ok(bytes
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect())
}
