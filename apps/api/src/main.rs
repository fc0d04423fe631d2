mod applications;
mod auth;
mod billing;
mod compensation;
mod config;
mod contracts;
mod cv;
mod db;
mod documents;
mod errors;
mod gdpr;
mod interview;
mod llm_client;
mod models;
mod rate_limit;
mod routes;
mod state;
mod storage;
mod subscription;

use anyhow::Result;
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::sync::Arc;

use crate::applications::indicators::KeywordIndicatorScorer;
use crate::auth::BaasAuthenticator;
use crate::config::Config;
use crate::db::create_pool;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Signatura API v{}", env!("CARGO_PKG_VERSION"));
    if !config.subscription_enforcement {
        warn!("SUBSCRIPTION_ENFORCEMENT is off: every usage check will pass");
    }

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;

    // Initialize Redis (rate limiting)
    let redis = redis::Client::open(config.redis_url.clone())?;
    info!(
        "Redis client initialized ({} requests/min per user)",
        config.rate_limit_per_minute
    );

    // Initialize S3 / MinIO
    let s3 = build_s3_client(&config).await;
    info!("S3 client initialized (bucket: {})", config.s3_bucket);

    // Initialize LLM client
    let llm = LlmClient::new(config.anthropic_api_key.clone())?;
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    // Token verification against the hosted auth service
    let auth = Arc::new(BaasAuthenticator::new(
        &config.baas_url,
        &config.baas_anon_key,
        db.clone(),
    )?);

    let indicator_scorer = Arc::new(KeywordIndicatorScorer);

    let state = AppState {
        db,
        redis,
        s3,
        llm,
        config: config.clone(),
        auth,
        indicator_scorer,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Constructs an S3 client configured for MinIO (local) or AWS (production).
async fn build_s3_client(config: &Config) -> aws_sdk_s3::Client {
    let credentials = Credentials::new(
        &config.aws_access_key_id,
        &config.aws_secret_access_key,
        None,
        None,
        "signatura-static",
    );

    let s3_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(credentials)
        .endpoint_url(&config.s3_endpoint)
        .load()
        .await;

    // MinIO serves buckets by path, not by virtual host.
    let s3_config = aws_sdk_s3::config::Builder::from(&s3_config)
        .force_path_style(true)
        .build();

    aws_sdk_s3::Client::from_conf(s3_config)
}
