//! Request pipeline: mode selection, execution, relax evaluation and response
//! assembly.

use std::time::Instant;
use tracing::{info, warn, Instrument};

use super::executor::QueryExecutor;
use super::mode::select_mode;
use super::relax::suggest_relax_below;
use super::types::{SearchHit, SearchMode, SearchRequest, SearchResponse};
use crate::config::SearchSettings;
use crate::error::{Error, Result};

/// Stateless search entry point shared by all requests.
pub struct SearchEngine {
    executor: QueryExecutor,
    settings: SearchSettings,
}

impl SearchEngine {
    pub fn new(executor: QueryExecutor, settings: SearchSettings) -> Self {
        Self { executor, settings }
    }

    pub fn settings(&self) -> &SearchSettings {
        &self.settings
    }

    /// Handle one search request end to end.
    ///
    /// Failures are returned as errors and never converted into an empty result
    /// set, so callers can tell "no matches" from "search failed".
    pub async fn search(&self, request: SearchRequest) -> Result<SearchResponse> {
        let request_id = uuid::Uuid::new_v4();
        let started = Instant::now();

        self.validate(&request)?;
        let SearchRequest { query, filters } = request;
        let filters = filters.normalized();
        filters.validate()?;

        let query = query.unwrap_or_default();
        let mode = select_mode(Some(&query));
        let limit = filters.effective_limit(mode, &self.settings);

        let span = tracing::info_span!("search", %request_id, %mode, limit);
        let outcome = async {
            match mode {
                SearchMode::Semantic => self
                    .executor
                    .execute_semantic(&query, &filters, limit)
                    .await
                    .map(|ranked| ranked.into_iter().map(SearchHit::from).collect::<Vec<_>>()),
                SearchMode::Structured => self
                    .executor
                    .execute_structured(&filters, limit)
                    .await
                    .map(|records| records.into_iter().map(SearchHit::from).collect::<Vec<_>>()),
            }
        }
        .instrument(span.clone())
        .await;

        let elapsed = started.elapsed();
        metrics::histogram!("search_duration_seconds", "mode" => mode.as_str())
            .record(elapsed.as_secs_f64());

        let hits = match outcome {
            Ok(hits) => hits,
            Err(err) => {
                metrics::counter!("search_errors_total", "kind" => err.kind()).increment(1);
                span.in_scope(|| warn!(kind = err.kind(), "Search failed: {}", err));
                return Err(err);
            }
        };

        let suggest = suggest_relax_below(self.settings.relax_threshold, hits.len(), &filters);
        metrics::counter!("search_requests_total", "mode" => mode.as_str()).increment(1);
        span.in_scope(|| {
            info!(
                results = hits.len(),
                filtered = !filters.is_empty(),
                suggest_relax = suggest,
                elapsed_ms = elapsed.as_millis() as u64,
                "Search complete"
            )
        });

        Ok(SearchResponse::assemble(hits, query, filters, mode, suggest))
    }

    fn validate(&self, request: &SearchRequest) -> Result<()> {
        let chars = request.query_text().chars().count();
        if chars > self.settings.max_query_chars {
            return Err(Error::MalformedRequest(format!(
                "query exceeds {} characters",
                self.settings.max_query_chars
            )));
        }
        Ok(())
    }
}
