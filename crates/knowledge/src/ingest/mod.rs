//! Ingestion: documents folder to the two partition stores.
//!
//! Partitions are built once per corpus snapshot and rebuilt wholesale on
//! demand. They are never updated incrementally.

pub mod loaders;
pub mod manifest;
pub mod splitter;

pub use loaders::{load_document, DocumentFormat, LoadedDocument};
pub use manifest::{Manifest, PartitionManifest};
pub use splitter::DocumentSplitter;

use crate::embeddings::{create_provider, EmbeddingConfig};
use crate::store::{IndexStore, PartitionedStores, SqliteIndexStore};
use crate::topic::assign_topic;
use crate::types::{Chunk, Partition};
use chrono::Utc;
use docqa_core::{AppConfig, AppError, AppResult};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use walkdir::WalkDir;

/// Resolved ingestion and index settings.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexConfig {
    pub documents_dir: PathBuf,
    pub index_dir: PathBuf,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub pdf_embedding: EmbeddingConfig,
    pub non_pdf_embedding: EmbeddingConfig,
}

impl IndexConfig {
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            documents_dir: config.documents_dir(),
            index_dir: config.index_dir(),
            chunk_size: config.index.chunk_size,
            chunk_overlap: config.index.chunk_overlap,
            pdf_embedding: EmbeddingConfig::from(&config.index.pdf_embedding),
            non_pdf_embedding: EmbeddingConfig::from(&config.index.non_pdf_embedding),
        }
    }

    pub fn embedding(&self, partition: Partition) -> &EmbeddingConfig {
        match partition {
            Partition::Pdf => &self.pdf_embedding,
            Partition::NonPdf => &self.non_pdf_embedding,
        }
    }

    /// Database file of a partition.
    pub fn store_path(&self, partition: Partition) -> PathBuf {
        self.index_dir.join(format!("{}.sqlite", partition.as_str()))
    }
}

/// How the stores were obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IngestMode {
    Loaded,
    Built,
}

/// A file that was not ingested, and why.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedDocument {
    pub file: String,
    pub reason: String,
}

/// Summary of a `load_or_build_stores` call.
#[derive(Debug, Clone, Serialize)]
pub struct IngestReport {
    pub mode: IngestMode,
    pub documents: usize,
    pub skipped: Vec<SkippedDocument>,
    pub pdf_chunks: usize,
    pub non_pdf_chunks: usize,
    pub duration_secs: f64,
}

/// Load both partitions from disk, or build them from the documents folder.
///
/// Existing stores are reused unless `force_rebuild` is set, either database
/// file is missing or empty, or the recorded embedding models no longer
/// match the configuration.
pub async fn load_or_build_stores(
    config: &IndexConfig,
    force_rebuild: bool,
) -> AppResult<(PartitionedStores, IngestReport)> {
    let start = Instant::now();

    // Checked before opening, which creates empty database files.
    let reusable = !force_rebuild && stores_reusable(config)?;

    let pdf_embedder = create_provider(&config.pdf_embedding).await?;
    let non_pdf_embedder = create_provider(&config.non_pdf_embedding).await?;

    let pdf_store = SqliteIndexStore::open(
        Partition::Pdf.as_str(),
        &config.store_path(Partition::Pdf),
        pdf_embedder,
    )?
    .with_batch_size(config.pdf_embedding.batch_size);
    let non_pdf_store = SqliteIndexStore::open(
        Partition::NonPdf.as_str(),
        &config.store_path(Partition::NonPdf),
        non_pdf_embedder,
    )?
    .with_batch_size(config.non_pdf_embedding.batch_size);

    if reusable {
        tracing::info!("Index stores found on disk, loading");
        let report = IngestReport {
            mode: IngestMode::Loaded,
            documents: Manifest::read(&config.index_dir)?
                .map(|m| m.documents)
                .unwrap_or(0),
            skipped: Vec::new(),
            pdf_chunks: pdf_store.count().await?,
            non_pdf_chunks: non_pdf_store.count().await?,
            duration_secs: start.elapsed().as_secs_f64(),
        };

        return Ok((stores(pdf_store, non_pdf_store), report));
    }

    tracing::info!(
        "Rebuilding index stores from {:?}",
        config.documents_dir
    );

    // A build that stops partway must not leave a manifest vouching for it.
    Manifest::remove(&config.index_dir)?;

    let corpus = collect_chunks(config)?;

    let pdf_chunks = pdf_store.rebuild(&corpus.pdf).await?;
    let non_pdf_chunks = non_pdf_store.rebuild(&corpus.non_pdf).await?;

    Manifest {
        built_at: Utc::now(),
        documents: corpus.documents,
        pdf: PartitionManifest {
            chunks: pdf_chunks,
            embedding: config.pdf_embedding.clone(),
        },
        non_pdf: PartitionManifest {
            chunks: non_pdf_chunks,
            embedding: config.non_pdf_embedding.clone(),
        },
    }
    .write(&config.index_dir)?;

    let report = IngestReport {
        mode: IngestMode::Built,
        documents: corpus.documents,
        skipped: corpus.skipped,
        pdf_chunks,
        non_pdf_chunks,
        duration_secs: start.elapsed().as_secs_f64(),
    };

    tracing::info!(
        "Index build completed: {} documents, {} pdf chunks, {} non-pdf chunks in {:.2}s",
        report.documents,
        report.pdf_chunks,
        report.non_pdf_chunks,
        report.duration_secs
    );

    Ok((stores(pdf_store, non_pdf_store), report))
}

fn stores(pdf: SqliteIndexStore, non_pdf: SqliteIndexStore) -> PartitionedStores {
    PartitionedStores::new(Arc::new(pdf), Arc::new(non_pdf))
}

/// Both database files exist with content, and were built with the
/// currently configured embedding models.
fn stores_reusable(config: &IndexConfig) -> AppResult<bool> {
    for partition in Partition::ALL {
        if !file_non_empty(&config.store_path(partition)) {
            return Ok(false);
        }
    }

    let Some(manifest) = Manifest::read(&config.index_dir)? else {
        tracing::warn!("Index stores have no manifest, rebuilding");
        return Ok(false);
    };

    for partition in Partition::ALL {
        let recorded = &manifest.partition(partition).embedding;
        if let Err(e) = config.embedding(partition).validate_consistency(recorded) {
            tracing::warn!(partition = %partition, "Embedding settings changed ({}), rebuilding", e);
            return Ok(false);
        }
    }

    Ok(true)
}

fn file_non_empty(path: &Path) -> bool {
    std::fs::metadata(path)
        .map(|m| m.is_file() && m.len() > 0)
        .unwrap_or(false)
}

/// Chunks from the documents folder, split by partition.
#[derive(Debug, Default)]
struct Corpus {
    documents: usize,
    skipped: Vec<SkippedDocument>,
    pdf: Vec<Chunk>,
    non_pdf: Vec<Chunk>,
}

fn collect_chunks(config: &IndexConfig) -> AppResult<Corpus> {
    if !config.documents_dir.is_dir() {
        return Err(AppError::Knowledge(format!(
            "Documents folder not found: {:?}",
            config.documents_dir
        )));
    }

    let splitter = DocumentSplitter::new(config.chunk_size, config.chunk_overlap)?;
    let mut corpus = Corpus::default();

    for entry in WalkDir::new(&config.documents_dir)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
    {
        let path = entry.path();
        let file = entry.file_name().to_string_lossy().to_string();

        let document = match load_document(path) {
            Ok(Some(document)) => document,
            Ok(None) => {
                tracing::warn!("Skipping unsupported file type: {:?}", path);
                corpus.skipped.push(SkippedDocument {
                    file,
                    reason: "unsupported file type".to_string(),
                });
                continue;
            }
            Err(e) => {
                tracing::warn!("Skipping {:?}: {}", path, e);
                corpus.skipped.push(SkippedDocument {
                    file,
                    reason: e.to_string(),
                });
                continue;
            }
        };

        let chunks = chunk_document(&document, &splitter);
        tracing::debug!("Loaded {:?}: {} chunks", path, chunks.len());

        corpus.documents += 1;
        match Partition::for_document(&document.source) {
            Partition::Pdf => corpus.pdf.extend(chunks),
            Partition::NonPdf => corpus.non_pdf.extend(chunks),
        }
    }

    Ok(corpus)
}

/// Tag a loaded document's passages with source, topic and position.
pub fn chunk_document(document: &LoadedDocument, splitter: &DocumentSplitter) -> Vec<Chunk> {
    let topic = assign_topic(&document.source);

    let texts: Vec<String> = if document.format.needs_splitting() {
        document
            .passages
            .iter()
            .flat_map(|passage| splitter.split(passage))
            .collect()
    } else {
        document
            .passages
            .iter()
            .filter(|p| !p.trim().is_empty())
            .cloned()
            .collect()
    };

    texts
        .into_iter()
        .enumerate()
        .map(|(position, text)| Chunk::new(text, document.source.clone(), topic, position as u32))
        .collect()
}
