//! Wiring of configuration into a ready [`SearchEngine`].

use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::config::{CorpusBackend, Credentials, ServiceConfig};
use crate::corpus::{Corpus, MemoryCorpus, PostgrestConfig, PostgrestCorpus};
use crate::error::{Error, Result};
use crate::search::{
    EmbeddingProvider, EmbeddingService, EmbeddingServiceConfig, QueryExecutor, SearchEngine,
};

/// Build the corpus selected by `config.corpus.backend`.
pub fn build_corpus(config: &ServiceConfig, credentials: &Credentials) -> Result<Arc<dyn Corpus>> {
    match config.corpus.backend {
        CorpusBackend::Postgrest => {
            let (url, key) = match (&credentials.corpus_url, &credentials.corpus_key) {
                (Some(url), Some(key)) => (url.clone(), key.clone()),
                _ => {
                    return Err(Error::ConfigurationMissing(
                        "corpus URL and key are required for the postgrest backend".into(),
                    ))
                }
            };
            let corpus = PostgrestCorpus::new(PostgrestConfig::from_settings(
                &config.corpus,
                url,
                key,
            ))?;
            info!(table = %config.corpus.table, function = %config.corpus.rpc_function, "Using PostgREST corpus");
            Ok(Arc::new(corpus))
        }
        CorpusBackend::Memory => {
            let path = config.corpus.data_path.as_deref().ok_or_else(|| {
                Error::ConfigurationMissing("corpus.data_path is not set".into())
            })?;
            let corpus = MemoryCorpus::load(path)?;
            if !corpus.is_empty() && corpus.dimensions() != config.embedding.dimensions {
                return Err(Error::Config(format!(
                    "corpus embeddings have {} dimensions but embedding.dimensions is {}",
                    corpus.dimensions(),
                    config.embedding.dimensions
                )));
            }
            Ok(Arc::new(corpus))
        }
    }
}

/// Build the embedding client.
pub fn build_embedder(
    config: &ServiceConfig,
    credentials: &Credentials,
) -> Result<Arc<dyn EmbeddingProvider>> {
    let service = EmbeddingService::new(
        EmbeddingServiceConfig::from(&config.embedding),
        credentials.embedding_api_key.clone(),
    )?;
    info!(model = %config.embedding.model, dims = config.embedding.dimensions, "Using embedding endpoint {}", config.embedding.endpoint);
    Ok(Arc::new(service))
}

/// Build a search engine from validated configuration and resolved credentials.
pub fn build_engine(config: &ServiceConfig, credentials: &Credentials) -> Result<SearchEngine> {
    config.validate()?;
    let executor = QueryExecutor::new(
        build_embedder(config, credentials)?,
        build_corpus(config, credentials)?,
        Duration::from_millis(config.embedding.timeout_ms),
        Duration::from_millis(config.corpus.timeout_ms),
    );
    Ok(SearchEngine::new(executor, config.search.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn memory_config(path: &str, dimensions: usize) -> ServiceConfig {
        let mut config = ServiceConfig::default();
        config.corpus.backend = CorpusBackend::Memory;
        config.corpus.data_path = Some(path.to_string());
        config.embedding.dimensions = dimensions;
        config
    }

    fn records_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[{{"id": "a", "embedding": [0.1, 0.2, 0.3]}}]"#).unwrap();
        file
    }

    fn credentials() -> Credentials {
        Credentials {
            embedding_api_key: "sk-test".into(),
            corpus_url: None,
            corpus_key: None,
        }
    }

    #[test]
    fn test_memory_engine_builds() {
        let file = records_file();
        let config = memory_config(file.path().to_str().unwrap(), 3);
        let engine = build_engine(&config, &credentials()).unwrap();
        assert_eq!(engine.settings().max_limit, 100);
    }

    #[test]
    fn test_memory_dimension_mismatch() {
        let file = records_file();
        let config = memory_config(file.path().to_str().unwrap(), 1536);
        let result = build_engine(&config, &credentials());
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_postgrest_without_credentials() {
        let config = ServiceConfig::default();
        let result = build_corpus(&config, &credentials());
        assert!(matches!(result, Err(Error::ConfigurationMissing(_))));
    }

    #[test]
    fn test_postgrest_with_credentials() {
        let config = ServiceConfig::default();
        let creds = Credentials {
            corpus_url: Some("https://example.supabase.co".into()),
            corpus_key: Some("service-key".into()),
            ..credentials()
        };
        let corpus = build_corpus(&config, &creds).unwrap();
        assert_eq!(corpus.name(), "postgrest");
    }
}
