//! Provider corpus retrieval.
//!
//! The corpus owns both filtering and ranking; the search core never pulls the full
//! record set into the request path. Two backends are provided:
//!
//! - [`PostgrestCorpus`]: Supabase/PostgREST over HTTP. Semantic retrieval calls a
//!   server-side ranking function, structured retrieval is a filtered table scan.
//! - [`MemoryCorpus`]: records with precomputed embeddings loaded from a JSON file,
//!   for local development and tests.

mod memory;
mod postgrest;

pub use memory::{MemoryCorpus, StoredProvider};
pub use postgrest::{PostgrestConfig, PostgrestCorpus};

use async_trait::async_trait;

use crate::error::Result;
use crate::search::{Embedding, FilterSet, ProviderRecord, RankedProvider};

/// Parameters for a similarity-ranked retrieval.
#[derive(Debug, Clone, PartialEq)]
pub struct SemanticQuery {
    pub embedding: Embedding,
    /// Maximum number of records to return.
    pub match_count: usize,
    pub filters: FilterSet,
}

/// Read-only access to the provider corpus.
#[async_trait]
pub trait Corpus: Send + Sync {
    /// Backend name for logs.
    fn name(&self) -> &str;

    /// Records passing every active filter, ranked by descending similarity to the
    /// query embedding and truncated to `match_count`.
    async fn semantic_search(&self, query: &SemanticQuery) -> Result<Vec<RankedProvider>>;

    /// Records passing every active filter, in storage order, truncated to `limit`.
    async fn filter_scan(&self, filters: &FilterSet, limit: usize) -> Result<Vec<ProviderRecord>>;
}
