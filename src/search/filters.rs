//! Structured filters attached to a search request.

use serde::{Deserialize, Serialize};

use super::types::SearchMode;
use crate::config::SearchSettings;
use crate::error::{Error, Result};
use crate::taxonomy::Region;

/// Longest accepted filter value, in characters.
pub const MAX_FILTER_VALUE_CHARS: usize = 200;

/// Optional filter values, each a single scalar or absent.
///
/// An absent value imposes no constraint on its dimension; set values compose as a
/// logical AND.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_case: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_function: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

impl FilterSet {
    /// Trim every value and drop blanks; a zero limit counts as unset. Region labels
    /// are matched exactly downstream, so known labels are rewritten to their
    /// canonical casing.
    pub fn normalized(self) -> Self {
        fn clean(value: Option<String>) -> Option<String> {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        }

        Self {
            use_case: clean(self.use_case),
            business_function: clean(self.business_function),
            industry: clean(self.industry),
            region: clean(self.region).map(|r| match Region::from_label(&r) {
                Some(region) => region.label().to_string(),
                None => r,
            }),
            country: clean(self.country),
            limit: self.limit.filter(|&l| l > 0),
        }
    }

    /// Reject values no taxonomy label or country name could plausibly have.
    pub fn validate(&self) -> Result<()> {
        for (key, value) in self.active() {
            if value.chars().count() > MAX_FILTER_VALUE_CHARS {
                return Err(Error::MalformedRequest(format!(
                    "filter '{}' exceeds {} characters",
                    key, MAX_FILTER_VALUE_CHARS
                )));
            }
            if value.chars().any(char::is_control) {
                return Err(Error::MalformedRequest(format!(
                    "filter '{}' contains control characters",
                    key
                )));
            }
        }
        Ok(())
    }

    /// Active filter values keyed by their wire name.
    pub fn active(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            ("useCase", &self.use_case),
            ("businessFunction", &self.business_function),
            ("industry", &self.industry),
            ("region", &self.region),
            ("country", &self.country),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.as_deref().map(|v| (key, v)))
    }

    /// True if no value filter is set (the limit does not count).
    pub fn is_empty(&self) -> bool {
        self.active().next().is_none()
    }

    /// True if any of the closed-taxonomy dimensions is constrained.
    pub fn has_taxonomy_filter(&self) -> bool {
        self.use_case.is_some() || self.business_function.is_some() || self.industry.is_some()
    }

    /// Result cap for `mode`: the requested limit or the mode default, clamped to
    /// the system maximum.
    pub fn effective_limit(&self, mode: SearchMode, settings: &SearchSettings) -> usize {
        let default = match mode {
            SearchMode::Semantic => settings.default_semantic_limit,
            SearchMode::Structured => settings.default_structured_limit,
        };
        self.limit.unwrap_or(default).min(settings.max_limit)
    }
}
