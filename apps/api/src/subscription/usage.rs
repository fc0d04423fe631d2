//! Usage counters and the split pattern.
//!
//! Handlers call `require_within_limit` before doing metered work and
//! `record_usage` after the work succeeded. The two halves are separate
//! statements; a failed increment is logged and never fails the request.

use chrono::Utc;
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::subscription::tiers::{evaluate_limit, period_start, Feature, UsageCheck};

/// Reads this month's counter and evaluates it against the caller's tier.
/// The kill switch short-circuits before touching the database.
pub async fn check_limit(
    pool: &PgPool,
    user: &AuthUser,
    feature: Feature,
    enforcement_enabled: bool,
) -> Result<UsageCheck, AppError> {
    if !enforcement_enabled {
        return Ok(evaluate_limit(user.tier, feature, 0, false));
    }

    let used = current_usage(pool, user.id, feature).await?;
    Ok(evaluate_limit(user.tier, feature, used, true))
}

/// `check_limit`, failing with `LimitReached` when the quota is spent.
pub async fn require_within_limit(
    pool: &PgPool,
    user: &AuthUser,
    feature: Feature,
    enforcement_enabled: bool,
) -> Result<UsageCheck, AppError> {
    let check = check_limit(pool, user, feature, enforcement_enabled).await?;
    if !check.allowed {
        info!(
            "User {} hit {} limit ({}/{:?})",
            user.id,
            feature.as_str(),
            check.used,
            check.limit
        );
        return Err(AppError::LimitReached {
            feature: feature.as_str().to_string(),
            tier: user.tier.as_str().to_string(),
            used: check.used,
            limit: check.limit.unwrap_or_default(),
        });
    }
    Ok(check)
}

pub async fn current_usage(pool: &PgPool, user_id: Uuid, feature: Feature) -> Result<i64, AppError> {
    let count: Option<i32> = sqlx::query_scalar(
        "SELECT count FROM usage_counters WHERE user_id = $1 AND feature = $2 AND period_start = $3",
    )
    .bind(user_id)
    .bind(feature.as_str())
    .bind(period_start(Utc::now()))
    .fetch_optional(pool)
    .await?;
    Ok(count.map(i64::from).unwrap_or(0))
}

/// Adds one to this month's counter and returns the new value.
pub async fn increment_usage(pool: &PgPool, user_id: Uuid, feature: Feature) -> Result<i64, AppError> {
    let count: i32 = sqlx::query_scalar(
        r#"
        INSERT INTO usage_counters (user_id, feature, period_start, count)
        VALUES ($1, $2, $3, 1)
        ON CONFLICT (user_id, feature, period_start)
        DO UPDATE SET count = usage_counters.count + 1
        RETURNING count
        "#,
    )
    .bind(user_id)
    .bind(feature.as_str())
    .bind(period_start(Utc::now()))
    .fetch_one(pool)
    .await?;
    Ok(i64::from(count))
}

/// Post-success half of the split pattern: log and continue on failure.
pub async fn record_usage(pool: &PgPool, user_id: Uuid, feature: Feature) {
    match increment_usage(pool, user_id, feature).await {
        Ok(count) => info!("Usage {} for user {user_id} is now {count}", feature.as_str()),
        Err(e) => warn!(
            "Failed to increment {} usage for user {user_id}: {e}",
            feature.as_str()
        ),
    }
}
