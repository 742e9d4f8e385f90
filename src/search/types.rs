//! Request, record and response types.

use serde::{Deserialize, Deserializer, Serialize};

use super::filters::FilterSet;

/// Retrieval mode chosen for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    /// Embedding similarity ranking, narrowed by filters.
    Semantic,
    /// Filter-only scan, no ranking.
    Structured,
}

impl SearchMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchMode::Semantic => "semantic",
            SearchMode::Structured => "structured",
        }
    }
}

impl std::fmt::Display for SearchMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inbound search request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Free-text intent; absent or blank selects structured mode.
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub filters: FilterSet,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>, filters: FilterSet) -> Self {
        Self {
            query: Some(query.into()),
            filters,
        }
    }

    /// Query text, or the empty string when absent.
    pub fn query_text(&self) -> &str {
        self.query.as_deref().unwrap_or("")
    }
}

/// A provider directory entry.
///
/// Columns missing from the backing store (older schema versions) deserialize to
/// their defaults. Unknown columns such as the stored embedding are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderRecord {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skool: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub services: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industries: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pricing: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semantic_summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_quality: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub use_cases: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub business_functions: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub industries_served: Vec<String>,
}

impl ProviderRecord {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: Some(name.into()),
            ..Default::default()
        }
    }

    /// True if the record passes every active filter.
    ///
    /// Taxonomy filters are membership tests on the tag sets, region is an exact
    /// match and country is a case-insensitive substring match.
    pub fn matches(&self, filters: &FilterSet) -> bool {
        let contains = |tags: &[String], wanted: &Option<String>| {
            wanted
                .as_ref()
                .map_or(true, |w| tags.iter().any(|t| t == w))
        };

        let region_ok = filters
            .region
            .as_ref()
            .map_or(true, |r| self.region.as_deref() == Some(r.as_str()));

        let country_ok = filters.country.as_ref().map_or(true, |c| {
            self.country
                .as_deref()
                .is_some_and(|own| own.to_lowercase().contains(&c.to_lowercase()))
        });

        contains(&self.use_cases, &filters.use_case)
            && contains(&self.business_functions, &filters.business_function)
            && contains(&self.industries_served, &filters.industry)
            && region_ok
            && country_ok
    }
}

/// A record paired with its similarity score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedProvider {
    #[serde(flatten)]
    pub record: ProviderRecord,
    /// A null score from the corpus reads as zero.
    #[serde(deserialize_with = "null_as_default")]
    pub similarity: f32,
}

/// One entry of a search response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    #[serde(flatten)]
    pub record: ProviderRecord,
    /// Present only for semantic results.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub similarity: Option<f32>,
}

impl From<RankedProvider> for SearchHit {
    fn from(ranked: RankedProvider) -> Self {
        Self {
            record: ranked.record,
            similarity: Some(ranked.similarity),
        }
    }
}

impl From<ProviderRecord> for SearchHit {
    fn from(record: ProviderRecord) -> Self {
        Self {
            record,
            similarity: None,
        }
    }
}

/// Successful search response.
///
/// Only built through [`SearchResponse::assemble`], which keeps `count` equal to
/// the number of results.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    results: Vec<SearchHit>,
    count: usize,
    query: String,
    filters: FilterSet,
    mode: SearchMode,
    suggest_relax_filters: bool,
}

impl SearchResponse {
    /// Build a response without reordering or filtering `results`.
    pub fn assemble(
        results: Vec<SearchHit>,
        query: impl Into<String>,
        filters: FilterSet,
        mode: SearchMode,
        suggest_relax_filters: bool,
    ) -> Self {
        Self {
            count: results.len(),
            results,
            query: query.into(),
            filters,
            mode,
            suggest_relax_filters,
        }
    }

    pub fn results(&self) -> &[SearchHit] {
        &self.results
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn filters(&self) -> &FilterSet {
        &self.filters
    }

    pub fn mode(&self) -> SearchMode {
        self.mode
    }

    pub fn suggest_relax_filters(&self) -> bool {
        self.suggest_relax_filters
    }
}

/// Deserialize `null` as the type's default.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accept either a JSON string or number for identifiers.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(s) => s,
        Id::Number(n) => n.to_string(),
    })
}
