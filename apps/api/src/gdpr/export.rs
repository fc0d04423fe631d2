//! Data-subject export: every row the caller owns, as one JSON document.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::application::JobApplicationRow;
use crate::models::compensation::CompensationStrategyRow;
use crate::models::contract::ContractAnalysisRow;
use crate::models::cv::CvVersionRow;
use crate::models::gdpr::{ConsentLogRow, DeletionRequestRow};
use crate::models::interview::InterviewSessionRow;
use crate::models::profile::ProfileRow;
use crate::models::usage::UsageCounterRow;

#[derive(Debug, Serialize)]
pub struct UserExport {
    pub exported_at: DateTime<Utc>,
    pub profile: ProfileRow,
    pub applications: Vec<JobApplicationRow>,
    pub cv_versions: Vec<CvVersionRow>,
    pub interview_sessions: Vec<InterviewSessionRow>,
    pub compensation_strategies: Vec<CompensationStrategyRow>,
    pub contract_analyses: Vec<ContractAnalysisRow>,
    pub consents: Vec<ConsentLogRow>,
    pub deletion_requests: Vec<DeletionRequestRow>,
    pub usage: Vec<UsageCounterRow>,
}

pub fn export_filename(at: DateTime<Utc>) -> String {
    format!("signatura-export-{}.json", at.format("%Y-%m-%d"))
}

async fn fetch_owned<T>(pool: &PgPool, sql: &str, user_id: Uuid) -> Result<Vec<T>, AppError>
where
    T: for<'r> sqlx::FromRow<'r, sqlx::postgres::PgRow> + Send + Unpin,
{
    Ok(sqlx::query_as::<_, T>(sql).bind(user_id).fetch_all(pool).await?)
}

pub async fn collect_user_data(
    pool: &PgPool,
    user_id: Uuid,
    now: DateTime<Utc>,
) -> Result<UserExport, AppError> {
    let profile = sqlx::query_as::<_, ProfileRow>("SELECT * FROM profiles WHERE id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Profile not found".to_string()))?;

    Ok(UserExport {
        exported_at: now,
        profile,
        applications: fetch_owned(
            pool,
            "SELECT * FROM job_applications WHERE user_id = $1 ORDER BY created_at",
            user_id,
        )
        .await?,
        cv_versions: fetch_owned(
            pool,
            "SELECT * FROM cv_versions WHERE user_id = $1 ORDER BY version",
            user_id,
        )
        .await?,
        interview_sessions: fetch_owned(
            pool,
            "SELECT * FROM interview_sessions WHERE user_id = $1 ORDER BY created_at",
            user_id,
        )
        .await?,
        compensation_strategies: fetch_owned(
            pool,
            "SELECT * FROM compensation_strategies WHERE user_id = $1 ORDER BY created_at",
            user_id,
        )
        .await?,
        contract_analyses: fetch_owned(
            pool,
            "SELECT * FROM contract_analyses WHERE user_id = $1 ORDER BY created_at",
            user_id,
        )
        .await?,
        consents: fetch_owned(
            pool,
            "SELECT * FROM consent_logs WHERE user_id = $1 ORDER BY created_at",
            user_id,
        )
        .await?,
        deletion_requests: fetch_owned(
            pool,
            "SELECT * FROM deletion_requests WHERE user_id = $1 ORDER BY requested_at",
            user_id,
        )
        .await?,
        usage: fetch_owned(
            pool,
            "SELECT * FROM usage_counters WHERE user_id = $1 ORDER BY period_start, feature",
            user_id,
        )
        .await?,
    })
}
