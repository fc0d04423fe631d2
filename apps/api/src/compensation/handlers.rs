//! Axum route handlers for compensation strategies.

use anyhow::Context;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::info;
use uuid::Uuid;

use crate::applications::repository::get_application;
use crate::auth::AuthUser;
use crate::compensation::strategy::{
    anchors_for, validate_request, write_strategy, Strategy, StrategyRequest,
};
use crate::errors::{AppError, AppJson};
use crate::models::compensation::CompensationStrategyRow;
use crate::rate_limit::enforce_rate_limit;
use crate::state::AppState;
use crate::subscription::tiers::Feature;
use crate::subscription::usage::{record_usage, require_within_limit};

/// POST /api/compensation/generate-strategy
///
/// Split pattern on `compensation_strategy`.
pub async fn handle_generate(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(request): AppJson<StrategyRequest>,
) -> Result<(StatusCode, Json<CompensationStrategyRow>), AppError> {
    let request = validate_request(request)?;
    let anchors = anchors_for(&request);

    enforce_rate_limit(&state, user.id).await?;
    require_within_limit(
        &state.db,
        &user,
        Feature::CompensationStrategy,
        state.config.subscription_enforcement,
    )
    .await?;

    if let Some(application_id) = request.application_id {
        get_application(&state.db, user.id, application_id).await?;
    }

    let narrative = write_strategy(&state.llm, &request, &anchors).await?;
    let strategy = Strategy { anchors, narrative };

    let row = sqlx::query_as::<_, CompensationStrategyRow>(
        r#"
        INSERT INTO compensation_strategies
            (id, user_id, application_id, role, currency, request, strategy)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user.id)
    .bind(request.application_id)
    .bind(&request.role)
    .bind(&request.currency)
    .bind(serde_json::to_value(&request).context("Serialize strategy request")?)
    .bind(serde_json::to_value(&strategy).context("Serialize strategy")?)
    .fetch_one(&state.db)
    .await?;

    info!(
        "Compensation strategy {} for user {}: anchor {} / walk-away {} {}",
        row.id, user.id, strategy.anchors.anchor, strategy.anchors.walk_away, row.currency
    );

    record_usage(&state.db, user.id, Feature::CompensationStrategy).await;
    Ok((StatusCode::CREATED, Json(row)))
}

/// GET /api/compensation/strategies
pub async fn handle_list(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<CompensationStrategyRow>>, AppError> {
    let rows = sqlx::query_as::<_, CompensationStrategyRow>(
        "SELECT * FROM compensation_strategies WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(user.id)
    .fetch_all(&state.db)
    .await?;
    Ok(Json(rows))
}

/// GET /api/compensation/strategies/:id
pub async fn handle_get(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<CompensationStrategyRow>, AppError> {
    sqlx::query_as::<_, CompensationStrategyRow>(
        "SELECT * FROM compensation_strategies WHERE id = $1 AND user_id = $2",
    )
    .bind(id)
    .bind(user.id)
    .fetch_optional(&state.db)
    .await?
    .map(Json)
    .ok_or_else(|| AppError::NotFound(format!("Compensation strategy {id} not found")))
}
