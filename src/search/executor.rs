//! Query execution against the embedding provider and the corpus.

use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use super::embedding::EmbeddingProvider;
use super::filters::FilterSet;
use super::types::{ProviderRecord, RankedProvider};
use crate::corpus::{Corpus, SemanticQuery};
use crate::error::{Error, Result};

/// Runs one retrieval per request. Every outbound call is bounded by a timeout and
/// never retried.
pub struct QueryExecutor {
    embedder: Arc<dyn EmbeddingProvider>,
    corpus: Arc<dyn Corpus>,
    embedding_timeout: Duration,
    retrieval_timeout: Duration,
}

impl QueryExecutor {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        corpus: Arc<dyn Corpus>,
        embedding_timeout: Duration,
        retrieval_timeout: Duration,
    ) -> Self {
        Self {
            embedder,
            corpus,
            embedding_timeout,
            retrieval_timeout,
        }
    }

    /// Embed `query`, then retrieve up to `limit` records ranked by descending
    /// similarity and narrowed by the active filters.
    ///
    /// An embedding failure aborts the request; there is no structured fallback.
    pub async fn execute_semantic(
        &self,
        query: &str,
        filters: &FilterSet,
        limit: usize,
    ) -> Result<Vec<RankedProvider>> {
        let embedding = tokio::time::timeout(self.embedding_timeout, self.embedder.embed(query))
            .await
            .map_err(|_| {
                Error::EmbeddingUnavailable(format!(
                    "embedding timed out after {}ms",
                    self.embedding_timeout.as_millis()
                ))
            })??;

        if embedding.len() != self.embedder.dimensions() {
            return Err(Error::EmbeddingUnavailable(format!(
                "expected {} dimensions, got {}",
                self.embedder.dimensions(),
                embedding.len()
            )));
        }

        let request = SemanticQuery {
            embedding,
            match_count: limit,
            filters: filters.clone(),
        };
        let mut ranked = self
            .bounded(self.corpus.semantic_search(&request))
            .await?;

        for hit in &mut ranked {
            hit.similarity = if hit.similarity.is_nan() {
                0.0
            } else {
                hit.similarity.clamp(0.0, 1.0)
            };
        }
        // Stable sort: a correctly ranked corpus response is left untouched
        ranked.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
        ranked.truncate(limit);

        debug!(corpus = self.corpus.name(), results = ranked.len(), "Semantic retrieval done");
        Ok(ranked)
    }

    /// Retrieve up to `limit` records passing the active filters, without ranking.
    pub async fn execute_structured(
        &self,
        filters: &FilterSet,
        limit: usize,
    ) -> Result<Vec<ProviderRecord>> {
        let mut records = self
            .bounded(self.corpus.filter_scan(filters, limit))
            .await?;
        records.truncate(limit);

        debug!(corpus = self.corpus.name(), results = records.len(), "Structured retrieval done");
        Ok(records)
    }

    async fn bounded<T>(&self, call: impl std::future::Future<Output = Result<T>>) -> Result<T> {
        tokio::time::timeout(self.retrieval_timeout, call)
            .await
            .map_err(|_| {
                Error::RetrievalFailure(format!(
                    "retrieval timed out after {}ms",
                    self.retrieval_timeout.as_millis()
                ))
            })?
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{ScriptedCorpus, ScriptedEmbedder};
    use super::*;

    fn executor(
        embedder: ScriptedEmbedder,
        corpus: ScriptedCorpus,
    ) -> (QueryExecutor, Arc<ScriptedEmbedder>, Arc<ScriptedCorpus>) {
        let embedder = Arc::new(embedder);
        let corpus = Arc::new(corpus);
        let exec = QueryExecutor::new(
            embedder.clone(),
            corpus.clone(),
            Duration::from_millis(200),
            Duration::from_millis(200),
        );
        (exec, embedder, corpus)
    }

    #[tokio::test]
    async fn test_semantic_passes_embedding_limit_and_filters() {
        let (exec, embedder, corpus) = executor(
            ScriptedEmbedder::ok(vec![0.3, 0.4]),
            ScriptedCorpus::ranked(&[("a", 0.9), ("b", 0.5)]),
        );
        let filters = FilterSet {
            industry: Some("Real Estate".into()),
            ..Default::default()
        };

        let ranked = exec
            .execute_semantic("voice AI for real estate", &filters, 100)
            .await
            .unwrap();

        assert_eq!(ranked.len(), 2);
        assert_eq!(embedder.calls(), vec!["voice AI for real estate".to_string()]);
        let calls = corpus.semantic_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].embedding, vec![0.3, 0.4]);
        assert_eq!(calls[0].match_count, 100);
        assert_eq!(calls[0].filters, filters);
    }

    #[tokio::test]
    async fn test_semantic_enforces_ranking_and_bounds() {
        let (exec, _, _) = executor(
            ScriptedEmbedder::ok(vec![0.3, 0.4]),
            ScriptedCorpus::ranked(&[("low", 0.2), ("high", 1.4), ("mid", 0.5), ("neg", -0.3)]),
        );

        let ranked = exec
            .execute_semantic("crm", &FilterSet::default(), 3)
            .await
            .unwrap();

        let ids: Vec<_> = ranked.iter().map(|r| r.record.id.as_str()).collect();
        assert_eq!(ids, vec!["high", "mid", "low"]);
        assert_eq!(ranked[0].similarity, 1.0);
        assert!(ranked.windows(2).all(|w| w[0].similarity >= w[1].similarity));
        assert!(ranked.iter().all(|r| (0.0..=1.0).contains(&r.similarity)));
    }

    #[tokio::test]
    async fn test_embedding_failure_skips_retrieval() {
        let (exec, _, corpus) = executor(
            ScriptedEmbedder::failing(Error::EmbeddingUnavailable("503".into())),
            ScriptedCorpus::ranked(&[("a", 0.9)]),
        );

        let err = exec
            .execute_semantic("crm", &FilterSet::default(), 10)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::EmbeddingUnavailable(_)));
        assert!(corpus.semantic_calls().is_empty());
        assert!(corpus.scan_calls().is_empty());
    }

    #[tokio::test]
    async fn test_embedding_timeout() {
        let mut embedder = ScriptedEmbedder::ok(vec![0.1, 0.2]);
        embedder.delay = Duration::from_secs(5);
        let (exec, _, corpus) = executor(embedder, ScriptedCorpus::default());

        let err = exec
            .execute_semantic("crm", &FilterSet::default(), 10)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::EmbeddingUnavailable(_)));
        assert!(err.to_string().contains("timed out"));
        assert!(corpus.semantic_calls().is_empty());
    }

    #[tokio::test]
    async fn test_wrong_dimensions_rejected() {
        let mut embedder = ScriptedEmbedder::ok(vec![0.1, 0.2, 0.3]);
        embedder.dimensions = 2;
        let (exec, _, _) = executor(embedder, ScriptedCorpus::default());

        let err = exec
            .execute_semantic("crm", &FilterSet::default(), 10)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::EmbeddingUnavailable(_)));
    }

    #[tokio::test]
    async fn test_retrieval_timeout() {
        let corpus = ScriptedCorpus {
            delay: Duration::from_secs(5),
            ..ScriptedCorpus::ranked(&[("a", 0.9)])
        };
        let (exec, _, _) = executor(ScriptedEmbedder::ok(vec![0.1, 0.2]), corpus);

        let err = exec
            .execute_semantic("crm", &FilterSet::default(), 10)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::RetrievalFailure(_)));
    }

    #[tokio::test]
    async fn test_structured_makes_one_scan_and_no_embedding() {
        let (exec, embedder, corpus) = executor(
            ScriptedEmbedder::ok(vec![0.1, 0.2]),
            ScriptedCorpus::records(&["a", "b", "c"]),
        );

        let records = exec
            .execute_structured(&FilterSet::default(), 2)
            .await
            .unwrap();

        assert_eq!(records.len(), 2);
        assert!(embedder.calls().is_empty());
        assert_eq!(corpus.scan_calls(), vec![(FilterSet::default(), 2)]);
    }

    #[tokio::test]
    async fn test_structured_failure_propagates() {
        let corpus = ScriptedCorpus {
            fail: true,
            ..Default::default()
        };
        let (exec, _, _) = executor(ScriptedEmbedder::ok(vec![0.1]), corpus);

        let err = exec
            .execute_structured(&FilterSet::default(), 50)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::RetrievalFailure(_)));
    }
}
