//! Supabase / PostgREST corpus backend.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

use super::{Corpus, SemanticQuery};
use crate::config::CorpusSettings;
use crate::error::{Error, Result};
use crate::search::{FilterSet, ProviderRecord, RankedProvider};

/// Connection settings for [`PostgrestCorpus`].
#[derive(Debug, Clone)]
pub struct PostgrestConfig {
    /// Project base URL, e.g. `https://xyz.supabase.co`.
    pub base_url: String,
    pub api_key: String,
    pub rpc_function: String,
    pub table: String,
    pub timeout: Duration,
}

impl PostgrestConfig {
    pub fn from_settings(
        settings: &CorpusSettings,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            rpc_function: settings.rpc_function.clone(),
            table: settings.table.clone(),
            timeout: Duration::from_millis(settings.timeout_ms),
        }
    }
}

/// Argument names of the semantic ranking function.
#[derive(Serialize)]
struct RankingArgs<'a> {
    query_embedding: &'a [f32],
    match_count: usize,
    filter_use_case: Option<&'a str>,
    filter_business_function: Option<&'a str>,
    filter_industry: Option<&'a str>,
    filter_region: Option<&'a str>,
    filter_country: Option<&'a str>,
}

/// Corpus served by a PostgREST endpoint.
#[derive(Debug, Clone)]
pub struct PostgrestCorpus {
    client: Client,
    config: PostgrestConfig,
}

impl PostgrestCorpus {
    pub fn new(config: PostgrestConfig) -> Result<Self> {
        if config.base_url.trim().is_empty() {
            return Err(Error::ConfigurationMissing("corpus URL cannot be empty".into()));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    fn rest_url(&self, path: &str) -> String {
        format!("{}/rest/v1/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("apikey", &self.config.api_key)
            .bearer_auth(&self.config.api_key)
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        let response = self.authorized(builder).send().await.map_err(|e| {
            if e.is_timeout() {
                Error::RetrievalFailure(format!(
                    "corpus request timed out after {}ms",
                    self.config.timeout.as_millis()
                ))
            } else {
                Error::RetrievalFailure(format!("corpus request failed: {}", e))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::RetrievalFailure(format!(
                "corpus returned {}: {}",
                status, body
            )));
        }
        Ok(response)
    }
}

/// Query string for a filtered table scan.
///
/// Taxonomy filters become array containment (`cs.{"label"}`), region an equality
/// test and country a case-insensitive substring match.
pub(crate) fn scan_query(filters: &FilterSet, limit: usize) -> String {
    let mut params: Vec<(&str, String)> = vec![("select", "*".to_string())];

    if let Some(v) = &filters.use_case {
        params.push(("use_cases", format!("cs.{{{}}}", array_literal(v))));
    }
    if let Some(v) = &filters.business_function {
        params.push(("business_functions", format!("cs.{{{}}}", array_literal(v))));
    }
    if let Some(v) = &filters.industry {
        params.push(("industries_served", format!("cs.{{{}}}", array_literal(v))));
    }
    if let Some(v) = &filters.region {
        params.push(("region", format!("eq.{}", v)));
    }
    if let Some(v) = &filters.country {
        params.push(("country", format!("ilike.*{}*", like_literal(v))));
    }
    params.push(("limit", limit.to_string()));

    params
        .iter()
        .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Quote a value as a Postgres array element.
fn array_literal(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Escape LIKE metacharacters; `*` is PostgREST's wildcard and is dropped.
fn like_literal(value: &str) -> String {
    value
        .chars()
        .filter(|&c| c != '*')
        .fold(String::with_capacity(value.len()), |mut out, c| {
            if matches!(c, '%' | '_' | '\\') {
                out.push('\\');
            }
            out.push(c);
            out
        })
}

#[async_trait]
impl Corpus for PostgrestCorpus {
    fn name(&self) -> &str {
        "postgrest"
    }

    async fn semantic_search(&self, query: &SemanticQuery) -> Result<Vec<RankedProvider>> {
        let f = &query.filters;
        let args = RankingArgs {
            query_embedding: &query.embedding,
            match_count: query.match_count,
            filter_use_case: f.use_case.as_deref(),
            filter_business_function: f.business_function.as_deref(),
            filter_industry: f.industry.as_deref(),
            filter_region: f.region.as_deref(),
            filter_country: f.country.as_deref(),
        };

        let url = self.rest_url(&format!("rpc/{}", self.config.rpc_function));
        let response = self.send(self.client.post(url).json(&args)).await?;
        let rows: Vec<RankedProvider> = response
            .json()
            .await
            .map_err(|e| Error::RetrievalFailure(format!("malformed ranking response: {}", e)))?;

        debug!(rows = rows.len(), function = %self.config.rpc_function, "Ranking function returned");
        Ok(rows)
    }

    async fn filter_scan(&self, filters: &FilterSet, limit: usize) -> Result<Vec<ProviderRecord>> {
        let url = format!(
            "{}?{}",
            self.rest_url(&self.config.table),
            scan_query(filters, limit)
        );
        let response = self.send(self.client.get(url)).await?;
        let rows: Vec<ProviderRecord> = response
            .json()
            .await
            .map_err(|e| Error::RetrievalFailure(format!("malformed scan response: {}", e)))?;

        debug!(rows = rows.len(), table = %self.config.table, "Filter scan returned");
        Ok(rows)
    }
}
