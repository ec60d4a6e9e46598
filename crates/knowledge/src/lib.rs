//! Document question answering over a partitioned local index.
//!
//! Documents are ingested into two SQLite-backed index stores, one for PDFs
//! and one for every other format. Questions are classified, routed to one
//! store, filtered by relevance and answered by a generative model.

pub mod embeddings;
pub mod ingest;
pub mod rag;
pub mod store;
pub mod topic;
pub mod types;

#[cfg(test)]
mod tests;

pub use embeddings::{create_provider, EmbeddingConfig, EmbeddingProvider};
pub use ingest::{load_or_build_stores, IndexConfig, IngestMode, IngestReport, SkippedDocument};
pub use rag::{Answer, AnswerOutcome, AskRequest, QuestionType, RagPipeline};
pub use store::{IndexStore, PartitionedStores, SqliteIndexStore};
pub use topic::{assign_topic, Topic};
pub use types::{Chunk, ChunkMetadata, MetadataFilter, Partition, ScoredChunk};
