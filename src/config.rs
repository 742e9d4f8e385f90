//! Service configuration.
//!
//! Loaded from a TOML file (see `provider-search init`). Credentials are never stored
//! in the file; they are resolved from the process environment at startup by
//! [`Credentials::from_env`].

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};

/// Environment variable holding the embedding provider API key.
pub const ENV_EMBEDDING_API_KEY: &str = "OPENAI_API_KEY";

/// Environment variable holding the corpus (Supabase/PostgREST) base URL.
pub const ENV_CORPUS_URL: &str = "SUPABASE_URL";

/// Environment variable holding the corpus service key.
pub const ENV_CORPUS_KEY: &str = "SUPABASE_SERVICE_ROLE_KEY";

/// Top-level service configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub api: ApiSettings,
    pub embedding: EmbeddingSettings,
    pub corpus: CorpusSettings,
    pub search: SearchSettings,
    pub rate_limit: RateLimitSettings,
}

impl ServiceConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read {}: {}", path.display(), e)))?;
        let config: ServiceConfig = toml::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Write configuration to a TOML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let raw = toml::to_string_pretty(self)?;
        std::fs::write(path, raw)?;
        Ok(())
    }

    /// Reject settings that cannot produce a working service.
    pub fn validate(&self) -> Result<()> {
        if self.search.max_limit == 0 {
            return Err(Error::Config("search.max_limit must be at least 1".into()));
        }
        if self.embedding.dimensions == 0 {
            return Err(Error::Config("embedding.dimensions must be at least 1".into()));
        }
        if self.embedding.timeout_ms == 0 || self.corpus.timeout_ms == 0 {
            return Err(Error::Config("timeouts must be greater than zero".into()));
        }
        if self.corpus.backend == CorpusBackend::Memory && self.corpus.data_path.is_none() {
            return Err(Error::Config(
                "corpus.data_path is required when corpus.backend = \"memory\"".into(),
            ));
        }
        Ok(())
    }
}

/// HTTP API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    /// Address to listen on.
    pub listen_address: String,
    /// Whether CORS headers are emitted at all.
    pub cors_enabled: bool,
    /// Allowed origins; `"*"` permits any origin.
    pub cors_origins: Vec<String>,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            listen_address: "0.0.0.0:8080".to_string(),
            cors_enabled: true,
            cors_origins: vec!["*".to_string()],
        }
    }
}

/// Embedding provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// Base URL of an OpenAI-compatible API (without the `/embeddings` suffix).
    pub endpoint: String,
    /// Embedding model identifier.
    pub model: String,
    /// Expected vector length.
    pub dimensions: usize,
    /// Bounded wait for the embedding call.
    pub timeout_ms: u64,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1".to_string(),
            model: "text-embedding-3-small".to_string(),
            dimensions: 1536,
            timeout_ms: 10_000,
        }
    }
}

/// Which corpus implementation serves retrieval.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorpusBackend {
    /// Supabase / PostgREST over HTTP.
    #[default]
    Postgrest,
    /// JSON file loaded into memory.
    Memory,
}

/// Corpus retrieval settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorpusSettings {
    pub backend: CorpusBackend,
    /// Server-side ranking function for semantic retrieval.
    pub rpc_function: String,
    /// Table (or view) scanned by structured retrieval.
    pub table: String,
    /// Records file for the memory backend.
    pub data_path: Option<String>,
    /// Bounded wait for a retrieval call.
    pub timeout_ms: u64,
}

impl Default for CorpusSettings {
    fn default() -> Self {
        Self {
            backend: CorpusBackend::Postgrest,
            rpc_function: "search_providers".to_string(),
            table: "providers".to_string(),
            data_path: None,
            timeout_ms: 10_000,
        }
    }
}

/// Search behavior knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    /// Result cap applied to every request.
    pub max_limit: usize,
    /// Limit used in semantic mode when the request has none.
    pub default_semantic_limit: usize,
    /// Limit used in structured mode when the request has none.
    pub default_structured_limit: usize,
    /// Below this many results, active taxonomy filters trigger a relax suggestion.
    pub relax_threshold: usize,
    /// Longest accepted query text, in characters.
    pub max_query_chars: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            max_limit: 100,
            default_semantic_limit: 100,
            default_structured_limit: 50,
            relax_threshold: 5,
            max_query_chars: 1_000,
        }
    }
}

/// Global request rate limit for the search route.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitSettings {
    pub enabled: bool,
    pub requests_per_second: u32,
    pub burst: u32,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            requests_per_second: 20,
            burst: 40,
        }
    }
}

/// Credentials resolved from the environment.
#[derive(Clone, Default)]
pub struct Credentials {
    pub embedding_api_key: String,
    pub corpus_url: Option<String>,
    pub corpus_key: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("embedding_api_key", &"<redacted>")
            .field("corpus_url", &self.corpus_url)
            .field("corpus_key", &self.corpus_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Credentials {
    /// Resolve credentials for the given configuration from the process environment.
    pub fn from_env(config: &ServiceConfig) -> Result<Self> {
        Self::resolve(config, |key| std::env::var(key).ok())
    }

    /// Resolve credentials using an arbitrary lookup.
    ///
    /// Corpus credentials are only required for the PostgREST backend.
    pub fn resolve(
        config: &ServiceConfig,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let require = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| Error::ConfigurationMissing(format!("{} is not set", key)))
        };

        let embedding_api_key = require(ENV_EMBEDDING_API_KEY)?;
        let (corpus_url, corpus_key) = match config.corpus.backend {
            CorpusBackend::Postgrest => {
                (Some(require(ENV_CORPUS_URL)?), Some(require(ENV_CORPUS_KEY)?))
            }
            CorpusBackend::Memory => (None, None),
        };

        Ok(Self {
            embedding_api_key,
            corpus_url,
            corpus_key,
        })
    }
}
