//! Over-constrained query detection.

use super::filters::FilterSet;

/// Result count below which a taxonomy-filtered search is considered over-constrained.
pub const RELAX_THRESHOLD: usize = 5;

/// Whether the caller should be prompted to relax filters, using [`RELAX_THRESHOLD`].
pub fn should_suggest_relax(result_count: usize, filters: &FilterSet) -> bool {
    suggest_relax_below(RELAX_THRESHOLD, result_count, filters)
}

/// True iff fewer than `threshold` results came back while a use case, business
/// function or industry filter was set. Region and country never trigger it.
pub fn suggest_relax_below(threshold: usize, result_count: usize, filters: &FilterSet) -> bool {
    result_count < threshold && filters.has_taxonomy_filter()
}
