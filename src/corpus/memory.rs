//! In-memory corpus backed by a JSON records file.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use super::{Corpus, SemanticQuery};
use crate::error::{Error, Result};
use crate::search::{Embedding, FilterSet, ProviderRecord, RankedProvider};

/// A record with its precomputed embedding of `semantic_summary`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredProvider {
    #[serde(flatten)]
    pub record: ProviderRecord,
    pub embedding: Embedding,
}

/// Corpus held entirely in memory. Storage order is file order.
#[derive(Debug, Default)]
pub struct MemoryCorpus {
    entries: Vec<StoredProvider>,
    dimensions: usize,
}

impl MemoryCorpus {
    /// Build a corpus; every embedding must have the same length.
    pub fn new(entries: Vec<StoredProvider>) -> Result<Self> {
        let dimensions = entries.first().map(|e| e.embedding.len()).unwrap_or(0);
        if let Some(bad) = entries.iter().find(|e| e.embedding.len() != dimensions) {
            return Err(Error::Config(format!(
                "record '{}' has {} embedding dimensions, expected {}",
                bad.record.id,
                bad.embedding.len(),
                dimensions
            )));
        }
        Ok(Self {
            entries,
            dimensions,
        })
    }

    /// Load a JSON array of [`StoredProvider`] from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read {}: {}", path.display(), e)))?;
        let entries: Vec<StoredProvider> = serde_json::from_str(&raw)
            .map_err(|e| Error::Config(format!("invalid records file {}: {}", path.display(), e)))?;
        let corpus = Self::new(entries)?;
        info!(
            records = corpus.len(),
            dimensions = corpus.dimensions,
            "Loaded in-memory corpus from {}",
            path.display()
        );
        Ok(corpus)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Embedding length shared by every record (0 when empty).
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }
}

/// Cosine similarity mapped from [-1, 1] onto [0, 1].
fn similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    ((dot / (norm_a * norm_b) + 1.0) / 2.0).clamp(0.0, 1.0)
}

#[async_trait]
impl Corpus for MemoryCorpus {
    fn name(&self) -> &str {
        "memory"
    }

    async fn semantic_search(&self, query: &SemanticQuery) -> Result<Vec<RankedProvider>> {
        if !self.entries.is_empty() && query.embedding.len() != self.dimensions {
            return Err(Error::RetrievalFailure(format!(
                "query has {} dimensions, corpus has {}",
                query.embedding.len(),
                self.dimensions
            )));
        }

        let mut ranked: Vec<RankedProvider> = self
            .entries
            .iter()
            .filter(|e| e.record.matches(&query.filters))
            .map(|e| RankedProvider {
                record: e.record.clone(),
                similarity: similarity(&query.embedding, &e.embedding),
            })
            .collect();

        // Stable: equal scores keep file order
        ranked.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
        ranked.truncate(query.match_count);
        Ok(ranked)
    }

    async fn filter_scan(&self, filters: &FilterSet, limit: usize) -> Result<Vec<ProviderRecord>> {
        Ok(self
            .entries
            .iter()
            .filter(|e| e.record.matches(filters))
            .take(limit)
            .map(|e| e.record.clone())
            .collect())
    }
}
