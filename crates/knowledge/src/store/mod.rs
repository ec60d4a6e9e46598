//! Index stores.
//!
//! An index store is a persistent collection of embedded chunks plus the
//! embedding provider that turns queries into comparable vectors. Two stores
//! exist, one per [`Partition`].

pub mod sqlite;

pub use sqlite::SqliteIndexStore;

use crate::types::{MetadataFilter, Partition, ScoredChunk};
use docqa_core::AppResult;
use std::sync::Arc;

/// Similarity search over one partition.
#[async_trait::async_trait]
pub trait IndexStore: Send + Sync {
    /// Store name used in logs.
    fn name(&self) -> &str;

    /// Up to `k` chunks ordered by ascending cosine distance to `query`.
    ///
    /// With a filter, only chunks whose metadata equals the filter value are
    /// candidates.
    async fn similarity_search_with_score(
        &self,
        query: &str,
        k: usize,
        filter: Option<&MetadataFilter>,
    ) -> AppResult<Vec<ScoredChunk>>;

    /// Number of chunks held by the store.
    async fn count(&self) -> AppResult<usize>;
}

/// The two partition stores.
#[derive(Clone)]
pub struct PartitionedStores {
    pub pdf: Arc<dyn IndexStore>,
    pub non_pdf: Arc<dyn IndexStore>,
}

impl PartitionedStores {
    pub fn new(pdf: Arc<dyn IndexStore>, non_pdf: Arc<dyn IndexStore>) -> Self {
        Self { pdf, non_pdf }
    }

    /// Store backing a partition.
    pub fn get(&self, partition: Partition) -> &Arc<dyn IndexStore> {
        match partition {
            Partition::Pdf => &self.pdf,
            Partition::NonPdf => &self.non_pdf,
        }
    }
}

/// Cosine distance (`1 - cosine similarity`), in `[0, 2]`.
///
/// Mismatched lengths and zero vectors count as orthogonal.
pub fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 1.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 1.0;
    }

    (1.0 - dot_product / (norm_a * norm_b)).clamp(0.0, 2.0)
}
