//! Legal risk analysis server
//!
//! Accepts a contract (PDF or DOCX), splits it into clauses, has an LLM
//! score every clause for legal risk and returns the per-clause results
//! with the document's overall risk.
//!
//! ## Endpoints
//!
//! - `POST /api/v1/analyze` - multipart upload, field `file`
//! - `GET /api/v1/health`, `GET /health` - liveness
//!
//! Configuration comes from command-line flags, falling back to
//! environment variables (a `.env` file is loaded first).

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use clap::Parser;
use risk_engine::{
    OpenRouterConfig, OpenRouterScorer, PipelineConfig, RetryPolicy, RiskPipeline,
    SegmenterConfig,
};
use tower::ServiceBuilder;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod api;
mod error;

use api::{handle_analyze, handle_health};

/// Room for multipart boundaries and part headers on top of the file itself
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Command-line arguments for the risk API
#[derive(Parser, Debug)]
#[command(name = "risk-api")]
#[command(about = "Clause-by-clause legal risk analysis for PDF and DOCX contracts")]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value = "8001")]
    port: u16,

    /// Host address to bind to
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: String,

    /// OpenRouter API key
    #[arg(long, env = "OPENROUTER_API_KEY", hide_env_values = true)]
    openrouter_api_key: String,

    /// Chat completions endpoint
    #[arg(long, env = "OPENROUTER_URL", default_value = risk_engine::openrouter::DEFAULT_OPENROUTER_URL)]
    openrouter_url: String,

    /// Model used to score clauses
    #[arg(long, env = "OPENROUTER_MODEL", default_value = risk_engine::openrouter::DEFAULT_OPENROUTER_MODEL)]
    openrouter_model: String,

    /// Largest accepted upload in bytes
    #[arg(long, env = "MAX_UPLOAD_BYTES", default_value = "10485760")]
    max_upload_bytes: usize,

    /// Clause scoring calls in flight per document
    #[arg(long, env = "MAX_CONCURRENCY", default_value = "4")]
    max_concurrency: usize,

    /// Retries per clause on transient scoring failures
    #[arg(long, env = "MAX_RETRIES", default_value = "2")]
    max_retries: u32,

    /// Deadline for a whole analysis request in seconds
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value = "300")]
    request_timeout_secs: u64,

    /// Timeout of a single scoring call in seconds
    #[arg(long, env = "LLM_TIMEOUT_SECS", default_value = "60")]
    llm_timeout_secs: u64,

    /// Shorter clauses are skipped
    #[arg(long, env = "MIN_CLAUSE_CHARS", default_value = "20")]
    min_clause_chars: usize,

    /// Also split clauses at semicolons
    #[arg(long, env = "SPLIT_ON_SEMICOLONS")]
    split_on_semicolons: bool,

    /// Rate limit: requests per second per IP (burst of twice that)
    #[arg(long, env = "RATE_LIMIT", default_value = "2")]
    rate_limit: u32,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<RiskPipeline>,
    pub request_timeout: Duration,
    pub max_upload_bytes: usize,
}

/// Routes and middleware shared by the binary and the HTTP tests.
///
/// Rate limiting needs the peer address and is layered on in `main`.
pub fn app_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let body_limit = state.max_upload_bytes.saturating_add(MULTIPART_OVERHEAD);

    Router::new()
        // Health check
        .route("/health", get(handle_health))
        .route("/api/v1/health", get(handle_health))
        // Analysis
        .route("/api/v1/analyze", post(handle_analyze))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

/// Milliseconds between replenished requests for a limit of `rate` requests per second.
///
/// The governor replenishes one request per interval, so the interval shrinks as the rate grows.
pub(crate) fn replenish_interval_ms(rate: u32) -> u64 {
    (1000 / u64::from(rate.max(1))).max(1)
}

fn pipeline_from_args(args: &Args) -> anyhow::Result<RiskPipeline> {
    let openrouter = OpenRouterConfig::new(args.openrouter_api_key.as_str())?
        .with_url(args.openrouter_url.as_str())
        .with_model(args.openrouter_model.as_str())
        .with_timeout(Duration::from_secs(args.llm_timeout_secs));
    info!("Scoring with {:?}", openrouter);

    let scorer = OpenRouterScorer::new(openrouter)?;
    let config = PipelineConfig {
        max_concurrency: args.max_concurrency,
        retry: RetryPolicy {
            max_retries: args.max_retries,
            ..RetryPolicy::default()
        },
        segmenter: SegmenterConfig {
            min_clause_chars: args.min_clause_chars,
            split_on_semicolons: args.split_on_semicolons,
        },
    };

    Ok(RiskPipeline::new(Arc::new(scorer), config)?)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Initialize logging
    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting risk API on {}:{}", args.host, args.port);

    let pipeline = pipeline_from_args(&args).context("invalid analysis configuration")?;

    // Create rate limiter configuration
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_millisecond(replenish_interval_ms(args.rate_limit))
            .burst_size(args.rate_limit.max(1).saturating_mul(2))
            .finish()
            .context("invalid rate limit configuration")?,
    );

    let state = AppState {
        pipeline: Arc::new(pipeline),
        request_timeout: Duration::from_secs(args.request_timeout_secs),
        max_upload_bytes: args.max_upload_bytes,
    };

    let app = app_router(state).layer(GovernorLayer {
        config: governor_conf,
    });

    // Start server
    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Server listening on http://{}", addr);
    info!(
        "Rate limit: {} requests/second per IP (one every {}ms)",
        args.rate_limit.max(1),
        replenish_interval_ms(args.rate_limit)
    );
    info!(
        "Upload limit: {} bytes, request timeout: {}s",
        args.max_upload_bytes, args.request_timeout_secs
    );

    // The governor keys on the peer address
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
