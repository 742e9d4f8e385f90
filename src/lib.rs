//! Provider directory search service.
//!
//! Answers one question per request: given an optional free-text query and a set of
//! categorical filters, which providers should be shown? Queries with text are
//! ranked by embedding similarity; queries without text are a plain filtered scan.
//! Either way the response says whether the filters look too tight for the result
//! count (`suggestRelaxFilters`).

pub mod api;
pub mod config;
pub mod corpus;
pub mod error;
pub mod metrics;
pub mod search;
pub mod service;
pub mod taxonomy;

pub use api::{ApiConfig, ApiError, ApiServer, AppState, HealthResponse, RateLimitConfig, RateLimitService};
pub use config::{CorpusBackend, Credentials, ServiceConfig};
pub use corpus::{Corpus, MemoryCorpus, PostgrestConfig, PostgrestCorpus, SemanticQuery, StoredProvider};
pub use error::{Error, Result};
pub use metrics::MetricsService;
pub use search::{
    select_mode, should_suggest_relax, EmbeddingProvider, EmbeddingService, FilterSet,
    ProviderRecord, QueryExecutor, RankedProvider, SearchEngine, SearchHit, SearchMode,
    SearchRequest, SearchResponse,
};
pub use service::build_engine;
pub use taxonomy::{Region, TaxonomyCatalog};
