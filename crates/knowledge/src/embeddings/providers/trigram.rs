//! Offline hashing embedder over words and character trigrams.

use crate::embeddings::provider::EmbeddingProvider;
use docqa_core::AppResult;
use std::collections::BTreeMap;

const PROVIDER: &str = "trigram";
const MODEL: &str = "trigram-v1";

/// Words carrying no topical signal.
const STOP_WORDS: &[&str] = &[
    "the", "is", "at", "which", "on", "a", "an", "as", "are", "was", "were", "for", "to", "of",
    "in", "and", "or", "but", "with", "by", "from", "this", "that", "be", "have", "has", "had",
    "it", "its", "their", "they", "them", "what", "when", "who", "how", "why", "does", "did",
];

const WORD_SEED: u64 = 31;
const TRIGRAM_SEED: u64 = 37;

/// Deterministic embedder for offline indexes and tests.
///
/// Each non-stop word adds its term frequency to one hashed bucket and the
/// square root of it to the bucket of each of its character trigrams. Output
/// vectors are unit length (or all zeros for text with no usable words), so
/// similarity reflects lexical overlap only.
#[derive(Debug, Clone)]
pub struct TrigramProvider {
    dimensions: usize,
}

impl TrigramProvider {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    fn vector(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];

        for (word, count) in term_counts(text) {
            let count = count as f32;
            vector[self.bucket(word.as_bytes(), WORD_SEED)] += count;

            let chars: Vec<char> = word.chars().collect();
            for trigram in chars.windows(3) {
                let trigram: String = trigram.iter().collect();
                vector[self.bucket(trigram.as_bytes(), TRIGRAM_SEED)] += count.sqrt();
            }
        }

        normalize(&mut vector);
        vector
    }

    fn bucket(&self, bytes: &[u8], seed: u64) -> usize {
        let hash = bytes
            .iter()
            .fold(0u64, |acc, &b| acc.wrapping_mul(seed).wrapping_add(u64::from(b)));
        (hash % self.dimensions as u64) as usize
    }
}

/// Lowercased words longer than two characters, minus stop words, with counts.
///
/// Ordered so that float accumulation is identical across runs.
fn term_counts(text: &str) -> BTreeMap<String, u32> {
    let mut counts = BTreeMap::new();
    for word in text
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() > 2 && !STOP_WORDS.contains(w))
    {
        *counts.entry(word.to_string()).or_insert(0) += 1;
    }
    counts
}

fn normalize(vector: &mut [f32]) {
    let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        vector.iter_mut().for_each(|x| *x /= norm);
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for TrigramProvider {
    fn provider_name(&self) -> &str {
        PROVIDER
    }

    fn model_name(&self) -> &str {
        MODEL
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|text| self.vector(text)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::cosine_distance;

    fn norm(v: &[f32]) -> f32 {
        v.iter().map(|x| x * x).sum::<f32>().sqrt()
    }

    #[test]
    fn test_term_counts_drop_noise() {
        let counts = term_counts("What year was Nikola Tesla born? Tesla, TESLA.");
        assert_eq!(counts.get("tesla"), Some(&3));
        assert_eq!(counts.get("nikola"), Some(&1));
        assert!(!counts.contains_key("was"));
        assert!(!counts.contains_key("what"));
    }

    #[tokio::test]
    async fn test_batch_vectors_are_unit_length() {
        let provider = TrigramProvider::new(384);
        let texts = vec![
            "Ocean warming bleaches coral reefs.".to_string(),
            "Marie Skłodowska-Curie élève 🧪 à Paris, prix Nobel".to_string(),
        ];

        let vectors = provider.embed_batch(&texts).await.unwrap();
        assert_eq!(vectors.len(), 2);
        for v in &vectors {
            assert_eq!(v.len(), 384);
            assert!((norm(v) - 1.0).abs() < 1e-3);
        }
    }

    #[tokio::test]
    async fn test_same_text_same_vector() {
        let provider = TrigramProvider::new(128);
        let a = provider.embed("Gradient descent minimises loss").await.unwrap();
        let b = provider.embed("Gradient descent minimises loss").await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_text_without_words_is_zero() {
        let provider = TrigramProvider::new(64);
        let v = provider.embed("a an the ?!").await.unwrap();
        assert!(v.iter().all(|&x| x == 0.0));
    }

    #[tokio::test]
    async fn test_overlapping_text_is_closer() {
        let provider = TrigramProvider::new(384);
        let query = provider.embed("When was Nikola Tesla born?").await.unwrap();
        let related = provider
            .embed("Nikola Tesla was born in 1856 in Smiljan.")
            .await
            .unwrap();
        let unrelated = provider
            .embed("Cheddar pairs well with a robust red wine.")
            .await
            .unwrap();

        assert!(cosine_distance(&query, &related) < cosine_distance(&query, &unrelated));
    }

    #[test]
    fn test_reports_identity() {
        let provider = TrigramProvider::new(384);
        assert_eq!(provider.provider_name(), "trigram");
        assert_eq!(provider.model_name(), "trigram-v1");
        assert_eq!(provider.dimensions(), 384);
    }
}
