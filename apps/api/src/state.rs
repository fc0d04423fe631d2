use std::sync::Arc;

use aws_sdk_s3::Client as S3Client;
use redis::Client as RedisClient;
use sqlx::PgPool;

use crate::applications::indicators::IndicatorScorer;
use crate::auth::Authenticator;
use crate::config::Config;
use crate::llm_client::LlmClient;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Backs the per-user rate-limit windows.
    pub redis: RedisClient,
    pub s3: S3Client,
    pub llm: LlmClient,
    pub config: Config,
    /// Token verification + profile lookup. Default: `BaasAuthenticator`.
    pub auth: Arc<dyn Authenticator>,
    /// Pluggable CV-vs-job scorer. Default: `KeywordIndicatorScorer`.
    pub indicator_scorer: Arc<dyn IndicatorScorer>,
}
