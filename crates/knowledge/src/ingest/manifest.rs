//! Build manifest written next to the partition databases.

use crate::embeddings::EmbeddingConfig;
use crate::types::Partition;
use chrono::{DateTime, Utc};
use docqa_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const MANIFEST_FILE: &str = "manifest.json";

/// Record of the last index build.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub built_at: DateTime<Utc>,
    pub documents: usize,
    pub pdf: PartitionManifest,
    pub non_pdf: PartitionManifest,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PartitionManifest {
    pub chunks: usize,
    pub embedding: EmbeddingConfig,
}

impl Manifest {
    pub fn partition(&self, partition: Partition) -> &PartitionManifest {
        match partition {
            Partition::Pdf => &self.pdf,
            Partition::NonPdf => &self.non_pdf,
        }
    }

    /// Read the manifest, or `None` when no build has been recorded.
    pub fn read(index_dir: &Path) -> AppResult<Option<Self>> {
        let path = index_dir.join(MANIFEST_FILE);
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&path).map_err(|e| {
            AppError::Knowledge(format!("Failed to read manifest at {:?}: {}", path, e))
        })?;

        let manifest = serde_json::from_str(&content).map_err(|e| {
            AppError::Knowledge(format!("Failed to parse manifest at {:?}: {}", path, e))
        })?;

        Ok(Some(manifest))
    }

    pub fn write(&self, index_dir: &Path) -> AppResult<()> {
        std::fs::create_dir_all(index_dir).map_err(|e| {
            AppError::Knowledge(format!("Failed to create index directory: {}", e))
        })?;

        let path = index_dir.join(MANIFEST_FILE);
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, json).map_err(|e| {
            AppError::Knowledge(format!("Failed to write manifest to {:?}: {}", path, e))
        })?;

        tracing::debug!("Wrote manifest to {:?}", path);
        Ok(())
    }

    /// Forget the recorded build so the stores are not reused until a new
    /// manifest is written.
    pub fn remove(index_dir: &Path) -> AppResult<()> {
        let path = index_dir.join(MANIFEST_FILE);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::Knowledge(format!(
                "Failed to remove manifest at {:?}: {}",
                path, e
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_then_read() {
        let temp = TempDir::new().unwrap();
        let manifest = Manifest {
            built_at: Utc::now(),
            documents: 4,
            pdf: PartitionManifest {
                chunks: 12,
                embedding: EmbeddingConfig::default(),
            },
            non_pdf: PartitionManifest {
                chunks: 30,
                embedding: EmbeddingConfig::default(),
            },
        };

        manifest.write(temp.path()).unwrap();
        let loaded = Manifest::read(temp.path()).unwrap().unwrap();

        assert_eq!(loaded, manifest);
        assert_eq!(loaded.partition(Partition::NonPdf).chunks, 30);

        Manifest::remove(temp.path()).unwrap();
        assert!(Manifest::read(temp.path()).unwrap().is_none());
        Manifest::remove(temp.path()).unwrap();
    }

    #[test]
    fn test_missing_manifest() {
        let temp = TempDir::new().unwrap();
        assert!(Manifest::read(temp.path()).unwrap().is_none());
    }
}
