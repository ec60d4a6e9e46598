//! Knowledge system type definitions.

use crate::topic::{extension_of, Topic};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Metadata attached to every chunk at ingestion time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    /// Original document's file name
    pub source: String,

    /// Topic assigned from the file name
    pub topic: Topic,

    /// Ordinal of the chunk within its document
    pub position: u32,
}

/// A retrievable passage of a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub text: String,
    pub metadata: ChunkMetadata,
}

impl Chunk {
    pub fn new(text: impl Into<String>, source: impl Into<String>, topic: Topic, position: u32) -> Self {
        Self {
            text: text.into(),
            metadata: ChunkMetadata {
                source: source.into(),
                topic,
                position,
            },
        }
    }
}

/// A chunk paired with its cosine distance to the query (smaller is closer).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    pub distance: f32,
}

/// Single equality predicate applied to chunk metadata during retrieval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataFilter {
    Source(String),
    Topic(Topic),
}

impl MetadataFilter {
    /// Whether a chunk satisfies the predicate.
    pub fn matches(&self, metadata: &ChunkMetadata) -> bool {
        match self {
            Self::Source(source) => metadata.source == *source,
            Self::Topic(topic) => metadata.topic == *topic,
        }
    }
}

impl fmt::Display for MetadataFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Source(source) => write!(f, "source = {}", source),
            Self::Topic(topic) => write!(f, "topic = {}", topic),
        }
    }
}

/// The two index partitions, split by document format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Partition {
    /// Chunks from `.pdf` documents
    Pdf,
    /// Chunks from every other supported format
    NonPdf,
}

impl Partition {
    pub const ALL: [Partition; 2] = [Partition::Pdf, Partition::NonPdf];

    /// Partition that holds a document's chunks, decided by its format.
    pub fn for_document(file_name: &str) -> Self {
        match extension_of(file_name).as_deref() {
            Some(".pdf") => Self::Pdf,
            _ => Self::NonPdf,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::NonPdf => "non_pdf",
        }
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
