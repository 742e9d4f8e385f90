//! Provider search CLI
//!
//! Command-line interface for running the provider search service.

use clap::{Parser, Subcommand};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use provider_search::{
    build_engine, ApiConfig, ApiServer, AppState, Credentials, HealthResponse, MetricsService,
    RateLimitConfig, RateLimitService, Region, Result, ServiceConfig,
};

#[derive(Parser)]
#[command(name = "provider-search")]
#[command(author, version, about = "Provider directory search service", long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file
    Init {
        /// Output path for configuration file
        #[arg(short, long, default_value = "config.toml")]
        output: String,
    },

    /// Start the search API
    Start {
        /// HTTP API listen address (overrides the configuration file)
        #[arg(long)]
        api_addr: Option<String>,
    },

    /// Check service health
    Health {
        /// API endpoint to check
        #[arg(long, default_value = "http://localhost:8080")]
        endpoint: String,
    },

    /// Print the directory region for a country name
    Region {
        /// Country name, e.g. "Germany"
        country: String,
    },
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    match cli.command {
        Commands::Init { output } => {
            info!("Writing default configuration to: {}", output);
            let config = ServiceConfig::default();
            config.save(&output)?;
            info!("Configuration saved successfully");
        }

        Commands::Start { api_addr } => {
            info!("Starting provider search...");

            // 1. Load configuration (or use defaults with CLI overrides)
            let mut config = if Path::new(&cli.config).exists() {
                info!("Loading configuration from: {}", cli.config);
                ServiceConfig::load(&cli.config)?
            } else {
                info!("Using default configuration");
                ServiceConfig::default()
            };
            if let Some(addr) = api_addr {
                config.api.listen_address = addr;
            }

            // 2. Credentials come from the environment only
            let credentials = match Credentials::from_env(&config) {
                Ok(credentials) => credentials,
                Err(e) => {
                    error!("{}", e);
                    std::process::exit(1);
                }
            };

            // 3. Embedding client, corpus, executor, engine
            let engine = build_engine(&config, &credentials)?;
            info!(backend = ?config.corpus.backend, "Search engine ready");

            // 4. Shared state with rate limiting and metrics
            let mut state = AppState::new(Arc::new(engine)).with_metrics(MetricsService::install()?);
            if let Some(limits) = RateLimitConfig::from_settings(&config.rate_limit) {
                info!(
                    rps = limits.requests_per_second.get(),
                    burst = limits.burst.get(),
                    "Rate limiting enabled"
                );
                state = state.with_rate_limiter(RateLimitService::new(limits));
            }

            // 5. Serve until Ctrl+C
            let api_config = ApiConfig::from(config.api.clone());
            let listen_address = api_config.listen_address.clone();
            let api_server = ApiServer::with_state(api_config, state);

            info!("API address: {}", listen_address);
            info!("Press Ctrl+C to stop");

            api_server
                .run_until(&listen_address, async {
                    let _ = signal::ctrl_c().await;
                    info!("Received shutdown signal");
                })
                .await?;

            info!("Service stopped");
        }

        Commands::Health { endpoint } => {
            info!("Checking service health at: {}", endpoint);

            let health_url = format!("{}/health", endpoint.trim_end_matches('/'));
            match check_health(&health_url).await {
                Ok(response) => {
                    info!("Service status: {}", response.status);
                    info!("Version: {}", response.version);
                    info!("Uptime: {} seconds", response.uptime);
                }
                Err(e) => {
                    error!("Health check failed: {}", e);
                    std::process::exit(1);
                }
            }
        }

        Commands::Region { country } => {
            println!("{}", Region::from_country(&country).label());
        }
    }

    Ok(())
}

/// Perform a health check against the API endpoint.
async fn check_health(url: &str) -> Result<HealthResponse> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
        .map_err(|e| provider_search::Error::Api(format!("Client setup failed: {}", e)))?;

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| provider_search::Error::Api(format!("Request failed: {}", e)))?;

    if !response.status().is_success() {
        return Err(provider_search::Error::Api(format!(
            "Unexpected status: {}",
            response.status()
        )));
    }

    response
        .json::<HealthResponse>()
        .await
        .map_err(|e| provider_search::Error::Api(format!("JSON parse error: {}", e)))
}
