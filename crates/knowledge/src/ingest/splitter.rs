//! Character-based text splitting with overlap.

use docqa_core::{AppError, AppResult};
use text_splitter::{Characters, ChunkConfig, TextSplitter};

/// Splits long passages into overlapping chunks of at most `chunk_size` characters.
pub struct DocumentSplitter {
    inner: TextSplitter<Characters>,
}

impl DocumentSplitter {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> AppResult<Self> {
        let config = ChunkConfig::new(chunk_size)
            .with_overlap(chunk_overlap)
            .map_err(|e| AppError::Config(format!("Invalid chunk settings: {}", e)))?;

        Ok(Self {
            inner: TextSplitter::new(config),
        })
    }

    /// Non-empty chunks of `text`, in document order.
    pub fn split(&self, text: &str) -> Vec<String> {
        self.inner
            .chunks(text)
            .filter(|chunk| !chunk.trim().is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_is_one_chunk() {
        let splitter = DocumentSplitter::new(600, 100).unwrap();
        let chunks = splitter.split("Nikola Tesla was born in 1856.");
        assert_eq!(chunks, vec!["Nikola Tesla was born in 1856.".to_string()]);
    }

    #[test]
    fn test_long_text_respects_chunk_size() {
        let splitter = DocumentSplitter::new(100, 20).unwrap();
        let text = "Alternating current changed power distribution. ".repeat(20);

        let chunks = splitter.split(&text);
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 100);
        }
    }

    #[test]
    fn test_utf8_text() {
        let splitter = DocumentSplitter::new(50, 10).unwrap();
        let text = "Marie Skłodowska-Curie reçut deux prix Nobel. ".repeat(10);
        assert!(!splitter.split(&text).is_empty());
    }

    #[test]
    fn test_blank_text_yields_nothing() {
        let splitter = DocumentSplitter::new(600, 100).unwrap();
        assert!(splitter.split("   \n\n  ").is_empty());
    }

    #[test]
    fn test_overlap_must_be_smaller_than_chunk() {
        assert!(DocumentSplitter::new(100, 100).is_err());
    }
}
