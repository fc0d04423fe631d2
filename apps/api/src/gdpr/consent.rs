use axum::http::{header, HeaderMap};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::gdpr::ConsentLogRow;

const MAX_USER_AGENT_LEN: usize = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsentType {
    Terms,
    Privacy,
    Marketing,
    Analytics,
    AiProcessing,
}

impl ConsentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConsentType::Terms => "terms",
            ConsentType::Privacy => "privacy",
            ConsentType::Marketing => "marketing",
            ConsentType::Analytics => "analytics",
            ConsentType::AiProcessing => "ai_processing",
        }
    }
}

/// First hop of `X-Forwarded-For`, which is the original client behind the proxy.
pub fn client_ip(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .map(str::to_string)
}

pub fn user_agent(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|ua| !ua.is_empty())
        .map(|ua| ua.chars().take(MAX_USER_AGENT_LEN).collect())
}

pub async fn record_consent(
    pool: &PgPool,
    user_id: Uuid,
    consent_type: ConsentType,
    granted: bool,
    headers: &HeaderMap,
) -> Result<ConsentLogRow, AppError> {
    Ok(sqlx::query_as::<_, ConsentLogRow>(
        r#"
        INSERT INTO consent_logs (id, user_id, consent_type, granted, ip_address, user_agent)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(consent_type.as_str())
    .bind(granted)
    .bind(client_ip(headers))
    .bind(user_agent(headers))
    .fetch_one(pool)
    .await?)
}

/// Latest record per consent type.
pub async fn current_consents(pool: &PgPool, user_id: Uuid) -> Result<Vec<ConsentLogRow>, AppError> {
    Ok(sqlx::query_as::<_, ConsentLogRow>(
        r#"
        SELECT DISTINCT ON (consent_type) *
        FROM consent_logs WHERE user_id = $1
        ORDER BY consent_type, created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?)
}
