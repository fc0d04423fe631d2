//! Account deletion requests: a grace period, cancellation, and the admin sweep
//! that erases due accounts.

use aws_sdk_s3::Client as S3Client;
use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::gdpr::DeletionRequestRow;
use crate::storage::{delete_prefix, user_prefixes};
use crate::subscription::tiers::Tier;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletionStatus {
    Pending,
    Cancelled,
    Completed,
}

impl DeletionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeletionStatus::Pending => "pending",
            DeletionStatus::Cancelled => "cancelled",
            DeletionStatus::Completed => "completed",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "pending" => Some(DeletionStatus::Pending),
            "cancelled" => Some(DeletionStatus::Cancelled),
            "completed" => Some(DeletionStatus::Completed),
            _ => None,
        }
    }

    pub fn can_transition(&self, to: DeletionStatus) -> bool {
        matches!(
            (self, to),
            (DeletionStatus::Pending, DeletionStatus::Cancelled)
                | (DeletionStatus::Pending, DeletionStatus::Completed)
        )
    }
}

#[derive(Debug, Default, Serialize)]
pub struct ProcessingSummary {
    pub processed: usize,
    pub failed: usize,
}

pub fn scheduled_for(requested_at: DateTime<Utc>, grace_days: i64) -> DateTime<Utc> {
    requested_at + Duration::days(grace_days)
}

pub fn anonymized_email(user_id: Uuid) -> String {
    format!("deleted-{user_id}@signatura.invalid")
}

/// Child tables first; `cv_versions` references `job_applications`.
const USER_TABLES: &[&str] = &[
    "cv_versions",
    "interview_sessions",
    "compensation_strategies",
    "contract_analyses",
    "job_applications",
    "consent_logs",
    "usage_counters",
];

pub async fn pending_request(pool: &PgPool, user_id: Uuid) -> Result<Option<DeletionRequestRow>, AppError> {
    Ok(sqlx::query_as::<_, DeletionRequestRow>(
        "SELECT * FROM deletion_requests WHERE user_id = $1 AND status = 'pending'",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?)
}

pub async fn create_request(
    pool: &PgPool,
    user_id: Uuid,
    reason: Option<&str>,
    now: DateTime<Utc>,
    grace_days: i64,
) -> Result<DeletionRequestRow, AppError> {
    if pending_request(pool, user_id).await?.is_some() {
        return Err(AppError::Conflict(
            "A deletion request is already pending".to_string(),
        ));
    }

    let result = sqlx::query_as::<_, DeletionRequestRow>(
        r#"
        INSERT INTO deletion_requests (id, user_id, reason, status, requested_at, scheduled_for)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(reason)
    .bind(DeletionStatus::Pending.as_str())
    .bind(now)
    .bind(scheduled_for(now, grace_days))
    .fetch_one(pool)
    .await;

    match result {
        Ok(row) => Ok(row),
        // Lost a race against a concurrent request; the partial unique index caught it.
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(AppError::Conflict(
            "A deletion request is already pending".to_string(),
        )),
        Err(e) => Err(e.into()),
    }
}

pub async fn latest_request(pool: &PgPool, user_id: Uuid) -> Result<DeletionRequestRow, AppError> {
    sqlx::query_as::<_, DeletionRequestRow>(
        "SELECT * FROM deletion_requests WHERE user_id = $1 ORDER BY requested_at DESC LIMIT 1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound("No deletion request found".to_string()))
}

pub async fn cancel_request(
    pool: &PgPool,
    user_id: Uuid,
    now: DateTime<Utc>,
) -> Result<DeletionRequestRow, AppError> {
    sqlx::query_as::<_, DeletionRequestRow>(
        r#"
        UPDATE deletion_requests SET status = $2, cancelled_at = $3
        WHERE user_id = $1 AND status = 'pending'
        RETURNING *
        "#,
    )
    .bind(user_id)
    .bind(DeletionStatus::Cancelled.as_str())
    .bind(now)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound("No pending deletion request".to_string()))
}

/// Erases one account's rows and anonymises its profile in a single transaction.
async fn erase_account(pool: &PgPool, request: &DeletionRequestRow, now: DateTime<Utc>) -> Result<(), AppError> {
    let status = DeletionStatus::parse(&request.status);
    if !status.is_some_and(|s| s.can_transition(DeletionStatus::Completed)) {
        return Err(AppError::Conflict(format!(
            "Deletion request {} is {}",
            request.id, request.status
        )));
    }

    let mut tx = pool.begin().await?;

    for table in USER_TABLES {
        sqlx::query(&format!("DELETE FROM {table} WHERE user_id = $1"))
            .bind(request.user_id)
            .execute(&mut *tx)
            .await?;
    }

    sqlx::query("UPDATE profiles SET email = $2, tier = $3 WHERE id = $1")
        .bind(request.user_id)
        .bind(anonymized_email(request.user_id))
        .bind(Tier::Free.as_str())
        .execute(&mut *tx)
        .await?;

    let marked = sqlx::query(
        "UPDATE deletion_requests SET status = $2, processed_at = $3 WHERE id = $1 AND status = 'pending'",
    )
    .bind(request.id)
    .bind(DeletionStatus::Completed.as_str())
    .bind(now)
    .execute(&mut *tx)
    .await?;
    if marked.rows_affected() == 0 {
        return Err(AppError::Conflict(format!(
            "Deletion request {} is no longer pending",
            request.id
        )));
    }

    tx.commit().await?;
    Ok(())
}

/// Processes every pending request whose grace period has elapsed.
pub async fn process_due_requests(
    pool: &PgPool,
    s3: &S3Client,
    bucket: &str,
    now: DateTime<Utc>,
) -> Result<ProcessingSummary, AppError> {
    let due = sqlx::query_as::<_, DeletionRequestRow>(
        r#"
        SELECT * FROM deletion_requests
        WHERE status = 'pending' AND scheduled_for <= $1
        ORDER BY scheduled_for
        "#,
    )
    .bind(now)
    .fetch_all(pool)
    .await?;

    let mut summary = ProcessingSummary::default();
    for request in &due {
        if let Err(e) = erase_account(pool, request, now).await {
            warn!("Deletion of user {} failed: {e}", request.user_id);
            summary.failed += 1;
            continue;
        }

        for prefix in user_prefixes(request.user_id) {
            match delete_prefix(s3, bucket, &prefix).await {
                Ok(removed) => info!("Removed {removed} objects under {prefix}"),
                Err(e) => warn!("Object cleanup for user {} skipped: {e}", request.user_id),
            }
        }
        summary.processed += 1;
    }

    info!(
        "Deletion sweep: {} processed, {} failed",
        summary.processed, summary.failed
    );
    Ok(summary)
}
