//! HTTP API server.
//!
//! Routes:
//! - `POST /search` (also `POST /functions/v1/search`)
//! - `GET /health`
//! - `GET /taxonomy`
//! - `GET /metrics`
//!
//! CORS preflight requests are answered by the CORS layer with an empty `200`.

mod error;
mod handlers;
mod rate_limit;

pub use error::ApiError;
pub use handlers::HealthResponse;
pub use rate_limit::{RateLimitConfig, RateLimitService};

use axum::{
    http::{header, HeaderName, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::ApiSettings;
use crate::error::{Error, Result};
use crate::metrics::MetricsService;
use crate::search::SearchEngine;

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub listen_address: String,
    pub cors_enabled: bool,
    pub cors_origins: Vec<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiSettings::default().into()
    }
}

impl From<ApiSettings> for ApiConfig {
    fn from(settings: ApiSettings) -> Self {
        Self {
            listen_address: settings.listen_address,
            cors_enabled: settings.cors_enabled,
            cors_origins: settings.cors_origins,
        }
    }
}

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<SearchEngine>,
    pub start_time: Instant,
    pub rate_limiter: Option<Arc<RateLimitService>>,
    pub metrics: Option<MetricsService>,
}

impl AppState {
    pub fn new(engine: Arc<SearchEngine>) -> Self {
        Self {
            engine,
            start_time: Instant::now(),
            rate_limiter: None,
            metrics: None,
        }
    }

    pub fn with_rate_limiter(mut self, limiter: RateLimitService) -> Self {
        self.rate_limiter = Some(Arc::new(limiter));
        self
    }

    pub fn with_metrics(mut self, metrics: MetricsService) -> Self {
        self.metrics = Some(metrics);
        self
    }
}

/// HTTP API server.
pub struct ApiServer {
    config: ApiConfig,
    state: AppState,
}

impl ApiServer {
    pub fn with_state(config: ApiConfig, state: AppState) -> Self {
        Self { config, state }
    }

    /// Build the router with tracing and CORS middleware.
    pub fn router(&self) -> Router {
        let middleware = ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(cors_layer(&self.config));

        Router::new()
            .route("/search", post(handlers::search))
            .route("/functions/v1/search", post(handlers::search))
            .route("/health", get(handlers::health))
            .route("/taxonomy", get(handlers::taxonomy))
            .route("/metrics", get(handlers::metrics))
            .with_state(self.state.clone())
            .layer(middleware)
    }

    /// Serve on `addr` until the process is stopped.
    pub async fn run(&self, addr: &str) -> Result<()> {
        self.run_until(addr, std::future::pending()).await
    }

    /// Serve on `addr` until `shutdown` resolves; in-flight requests are drained.
    pub async fn run_until(
        &self,
        addr: &str,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> Result<()> {
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| Error::Api(format!("failed to bind {}: {}", addr, e)))?;
        info!("API listening on {}", addr);

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| Error::Api(format!("server error: {}", e)))
    }
}

fn cors_layer(config: &ApiConfig) -> CorsLayer {
    if !config.cors_enabled {
        return CorsLayer::new();
    }

    let origins = if config.cors_origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        let parsed: Vec<HeaderValue> = config
            .cors_origins
            .iter()
            .filter_map(|o| match HeaderValue::from_str(o) {
                Ok(v) => Some(v),
                Err(_) => {
                    warn!("Ignoring invalid CORS origin: {}", o);
                    None
                }
            })
            .collect();
        AllowOrigin::list(parsed)
    };

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            HeaderName::from_static("apikey"),
            HeaderName::from_static("x-client-info"),
        ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SearchSettings;
    use crate::search::testing::{ScriptedCorpus, ScriptedEmbedder};
    use crate::search::QueryExecutor;
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::{json, Value};
    use std::num::NonZeroU32;
    use std::time::Duration;

    fn state(embedder: ScriptedEmbedder, corpus: ScriptedCorpus) -> AppState {
        let executor = QueryExecutor::new(
            Arc::new(embedder),
            Arc::new(corpus),
            Duration::from_secs(1),
            Duration::from_secs(1),
        );
        AppState::new(Arc::new(SearchEngine::new(executor, SearchSettings::default())))
    }

    fn server(state: AppState) -> TestServer {
        let api = ApiServer::with_state(ApiConfig::default(), state);
        TestServer::new(api.router()).unwrap()
    }

    #[tokio::test]
    async fn test_browse_mode_response_shape() {
        let server = server(state(
            ScriptedEmbedder::ok(vec![0.1, 0.2]),
            ScriptedCorpus::records(&["a", "b", "c"]),
        ));

        let response = server
            .post("/search")
            .json(&json!({ "query": "", "filters": {} }))
            .await;

        assert_eq!(response.status_code(), StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["count"], 3);
        assert_eq!(body["results"].as_array().map(Vec::len), Some(3));
        assert_eq!(body["mode"], "structured");
        assert_eq!(body["suggestRelaxFilters"], false);
        assert!(body["results"][0].get("similarity").is_none());
    }

    #[tokio::test]
    async fn test_semantic_response_with_relax_suggestion() {
        let server = server(state(
            ScriptedEmbedder::ok(vec![0.1, 0.2]),
            ScriptedCorpus::ranked(&[("a", 0.9), ("b", 0.5), ("c", 0.25)]),
        ));

        let response = server
            .post("/search")
            .json(&json!({
                "query": "voice AI for real estate",
                "filters": { "industry": "Real Estate", "useCase": null }
            }))
            .await;

        assert_eq!(response.status_code(), StatusCode::OK);
        let body: Value = response.json();
        assert_eq!(body["count"], 3);
        assert_eq!(body["suggestRelaxFilters"], true);
        assert_eq!(body["query"], "voice AI for real estate");
        assert_eq!(body["filters"]["industry"], "Real Estate");
        let top = body["results"][0]["similarity"].as_f64().unwrap();
        assert!((top - 0.9).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_embedding_failure_is_error_payload() {
        let server = server(state(
            ScriptedEmbedder::failing(Error::EmbeddingUnavailable("provider returned 503".into())),
            ScriptedCorpus::records(&["a"]),
        ));

        let response = server
            .post("/search")
            .json(&json!({ "query": "crm", "filters": {} }))
            .await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["kind"], "EmbeddingUnavailable");
        assert!(body["error"].as_str().unwrap().contains("503"));
        assert!(body.get("results").is_none());
        assert!(body.get("count").is_none());
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let server = server(state(
            ScriptedEmbedder::ok(vec![0.1, 0.2]),
            ScriptedCorpus::default(),
        ));

        let response = server
            .post("/search")
            .json(&json!({ "query": "crm", "filters": { "limit": "lots" } }))
            .await;

        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["kind"], "MalformedRequest");
    }

    #[tokio::test]
    async fn test_function_path_alias() {
        let server = server(state(
            ScriptedEmbedder::ok(vec![0.1, 0.2]),
            ScriptedCorpus::records(&["a"]),
        ));

        let response = server
            .post("/functions/v1/search")
            .json(&json!({ "query": "" }))
            .await;

        assert_eq!(response.status_code(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_preflight_is_empty_success_with_cors_headers() {
        let server = server(state(
            ScriptedEmbedder::ok(vec![0.1, 0.2]),
            ScriptedCorpus::default(),
        ));

        let response = server
            .method(Method::OPTIONS, "/search")
            .add_header(
                header::ORIGIN,
                HeaderValue::from_static("https://directory.example"),
            )
            .add_header(
                header::ACCESS_CONTROL_REQUEST_METHOD,
                HeaderValue::from_static("POST"),
            )
            .add_header(
                header::ACCESS_CONTROL_REQUEST_HEADERS,
                HeaderValue::from_static("content-type,apikey"),
            )
            .await;

        assert_eq!(response.status_code(), StatusCode::OK);
        assert!(response.text().is_empty());
        let headers = response.headers();
        assert_eq!(
            headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN),
            Some(&HeaderValue::from_static("*"))
        );
        assert!(headers.contains_key(header::ACCESS_CONTROL_ALLOW_METHODS));
    }

    #[tokio::test]
    async fn test_simple_request_carries_allow_origin() {
        let server = server(state(
            ScriptedEmbedder::ok(vec![0.1, 0.2]),
            ScriptedCorpus::records(&["a"]),
        ));

        let response = server
            .post("/search")
            .add_header(
                header::ORIGIN,
                HeaderValue::from_static("https://directory.example"),
            )
            .json(&json!({ "query": "" }))
            .await;

        assert_eq!(
            response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN),
            Some(&HeaderValue::from_static("*"))
        );
    }

    #[tokio::test]
    async fn test_rate_limited() {
        let limiter = RateLimitService::new(RateLimitConfig {
            requests_per_second: NonZeroU32::new(1).unwrap(),
            burst: NonZeroU32::new(1).unwrap(),
        });
        let server = server(
            state(
                ScriptedEmbedder::ok(vec![0.1, 0.2]),
                ScriptedCorpus::records(&["a"]),
            )
            .with_rate_limiter(limiter),
        );

        let first = server.post("/search").json(&json!({})).await;
        assert_eq!(first.status_code(), StatusCode::OK);

        let second = server.post("/search").json(&json!({})).await;
        assert_eq!(second.status_code(), StatusCode::TOO_MANY_REQUESTS);
        let body: Value = second.json();
        assert_eq!(body["kind"], "RateLimited");
    }

    #[tokio::test]
    async fn test_health_and_taxonomy() {
        let server = server(state(
            ScriptedEmbedder::ok(vec![0.1, 0.2]),
            ScriptedCorpus::default(),
        ));

        let health: HealthResponse = server.get("/health").await.json();
        assert_eq!(health.status, "ok");

        let taxonomy: Value = server.get("/taxonomy").await.json();
        assert_eq!(taxonomy["regions"].as_array().map(Vec::len), Some(7));
        assert!(taxonomy["useCases"]
            .as_array()
            .unwrap()
            .contains(&json!("Voice AI")));
    }

    #[tokio::test]
    async fn test_metrics_disabled_is_not_found() {
        let server = server(state(
            ScriptedEmbedder::ok(vec![0.1, 0.2]),
            ScriptedCorpus::default(),
        ));

        let response = server.get("/metrics").expect_failure().await;
        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    }
}
