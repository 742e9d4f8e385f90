//! Provider search core.
//!
//! Each request runs through a fixed, stateless pipeline:
//!
//! ```text
//!        SearchRequest { query, filters }
//!                     │
//!                     ▼
//!             ┌───────────────┐
//!             │ select_mode   │  blank query ─────────────┐
//!             └───────┬───────┘                           │
//!                     │ text                              │
//!                     ▼                                   ▼
//!          ┌────────────────────┐              ┌──────────────────┐
//!          │ EmbeddingProvider  │              │ Corpus           │
//!          │   embed(query)     │              │   filter_scan    │
//!          └─────────┬──────────┘              └────────┬─────────┘
//!                    ▼                                  │
//!          ┌────────────────────┐                       │
//!          │ Corpus             │                       │
//!          │   semantic_search  │                       │
//!          └─────────┬──────────┘                       │
//!                    └──────────────┬───────────────────┘
//!                                   ▼
//!                       ┌──────────────────────┐
//!                       │ should_suggest_relax │
//!                       └──────────┬───────────┘
//!                                  ▼
//!                           SearchResponse
//! ```

mod embedding;
mod engine;
mod executor;
mod filters;
mod mode;
mod relax;
mod types;

pub use embedding::{Embedding, EmbeddingProvider, EmbeddingService, EmbeddingServiceConfig};
pub use engine::SearchEngine;
pub use executor::QueryExecutor;
pub use filters::{FilterSet, MAX_FILTER_VALUE_CHARS};
pub use mode::select_mode;
pub use relax::{should_suggest_relax, suggest_relax_below, RELAX_THRESHOLD};
pub use types::{ProviderRecord, RankedProvider, SearchHit, SearchMode, SearchRequest, SearchResponse};

#[cfg(test)]
pub(crate) use executor::testing;
