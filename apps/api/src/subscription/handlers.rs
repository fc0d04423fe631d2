use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::auth::AuthUser;
use crate::errors::{AppError, AppJson};
use crate::state::AppState;
use crate::subscription::tiers::{Feature, Tier, UsageCheck};
use crate::subscription::usage::{check_limit, increment_usage};

#[derive(Debug, Deserialize)]
pub struct FeatureRequest {
    pub feature: String,
}

#[derive(Debug, Serialize)]
pub struct SubscriptionStatusResponse {
    pub tier: Tier,
    pub enforcement_enabled: bool,
    pub usage: Vec<UsageCheck>,
}

#[derive(Debug, Serialize)]
pub struct IncrementResponse {
    pub feature: Feature,
    pub count: i64,
}

fn parse_feature(raw: &str) -> Result<Feature, AppError> {
    Feature::parse(raw).ok_or_else(|| AppError::Validation(format!("Unknown feature '{raw}'")))
}

/// GET /api/subscription/status
pub async fn handle_status(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<SubscriptionStatusResponse>, AppError> {
    let enforcement = state.config.subscription_enforcement;
    let mut usage = Vec::with_capacity(Feature::ALL.len());
    for feature in Feature::ALL {
        usage.push(check_limit(&state.db, &user, feature, enforcement).await?);
    }
    Ok(Json(SubscriptionStatusResponse {
        tier: user.tier,
        enforcement_enabled: enforcement,
        usage,
    }))
}

/// POST /api/subscription/check-limit
///
/// Always 200; the client reads `allowed`.
pub async fn handle_check_limit(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(request): AppJson<FeatureRequest>,
) -> Result<Json<UsageCheck>, AppError> {
    let feature = parse_feature(&request.feature)?;
    let check = check_limit(
        &state.db,
        &user,
        feature,
        state.config.subscription_enforcement,
    )
    .await?;
    Ok(Json(check))
}

/// POST /api/subscription/increment-usage
pub async fn handle_increment_usage(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(request): AppJson<FeatureRequest>,
) -> Result<Json<IncrementResponse>, AppError> {
    let feature = parse_feature(&request.feature)?;
    let count = increment_usage(&state.db, user.id, feature).await?;
    Ok(Json(IncrementResponse { feature, count }))
}
