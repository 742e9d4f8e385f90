//! Retrieval mode selection.

use super::types::SearchMode;

/// Choose the retrieval mode for a query.
///
/// Blank or absent text skips the embedding call entirely and browses by filters.
pub fn select_mode(query: Option<&str>) -> SearchMode {
    match query.map(str::trim) {
        Some(text) if !text.is_empty() => SearchMode::Semantic,
        _ => SearchMode::Structured,
    }
}
