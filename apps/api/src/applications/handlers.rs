//! Axum route handlers for job-application tracking.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::applications::indicators::IndicatorReport;
use crate::applications::job_parser::parse_job_keywords;
use crate::applications::repository::{
    delete_application, get_application, insert_application, list_applications,
    set_indicator_score, status_counts, update_application,
};
use crate::applications::tracking::{
    compute_stats, parse_status, plan_create, plan_update, ApplicationStats,
    CreateApplicationRequest, UpdateApplicationRequest,
};
use crate::auth::AuthUser;
use crate::cv::versioning::latest_version;
use crate::errors::{AppError, AppJson};
use crate::models::application::JobApplicationRow;
use crate::rate_limit::enforce_rate_limit;
use crate::state::AppState;
use crate::subscription::tiers::Feature;
use crate::subscription::usage::{record_usage, require_within_limit};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct IndicatorResponse {
    pub application_id: Uuid,
    pub cv_version_id: Uuid,
    pub report: IndicatorReport,
}

/// GET /api/applications
pub async fn handle_list(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<JobApplicationRow>>, AppError> {
    let status = query.status.as_deref().map(parse_status).transpose()?;
    Ok(Json(list_applications(&state.db, user.id, status).await?))
}

/// POST /api/applications
///
/// Split pattern on `application_tracking`: check → insert → record.
pub async fn handle_create(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(request): AppJson<CreateApplicationRequest>,
) -> Result<(StatusCode, Json<JobApplicationRow>), AppError> {
    let planned = plan_create(request, Utc::now())?;

    require_within_limit(
        &state.db,
        &user,
        Feature::ApplicationTracking,
        state.config.subscription_enforcement,
    )
    .await?;

    let row = insert_application(&state.db, user.id, &planned).await?;
    info!("Created application {} for user {}", row.id, user.id);

    record_usage(&state.db, user.id, Feature::ApplicationTracking).await;
    Ok((StatusCode::CREATED, Json(row)))
}

/// GET /api/applications/:id
pub async fn handle_get(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<JobApplicationRow>, AppError> {
    Ok(Json(get_application(&state.db, user.id, id).await?))
}

/// PATCH /api/applications/:id
pub async fn handle_update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    AppJson(patch): AppJson<UpdateApplicationRequest>,
) -> Result<Json<JobApplicationRow>, AppError> {
    let existing = get_application(&state.db, user.id, id).await?;
    let planned = plan_update(&existing, patch, Utc::now())?;
    let row = update_application(&state.db, user.id, id, &planned).await?;
    if existing.status != row.status {
        info!(
            "Application {id} moved {} -> {} for user {}",
            existing.status, row.status, user.id
        );
    }
    Ok(Json(row))
}

/// DELETE /api/applications/:id
pub async fn handle_delete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    delete_application(&state.db, user.id, id).await?;
    info!("Deleted application {id} for user {}", user.id);
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/applications/stats
pub async fn handle_stats(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<ApplicationStats>, AppError> {
    let counts = status_counts(&state.db, user.id).await?;
    Ok(Json(compute_stats(&counts)))
}

/// POST /api/applications/:id/indicators
///
/// Scores the caller's latest CV against this application's job description.
/// Rate-limited; not metered.
pub async fn handle_indicators(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<IndicatorResponse>, AppError> {
    let application = get_application(&state.db, user.id, id).await?;
    let job_description = application
        .job_description
        .as_deref()
        .filter(|d| !d.trim().is_empty())
        .ok_or_else(|| {
            AppError::Validation("Add a job description to this application first".to_string())
        })?;

    let cv = latest_version(&state.db, user.id).await?.ok_or_else(|| {
        AppError::UnprocessableEntity("Upload or write a CV before scoring indicators".to_string())
    })?;

    enforce_rate_limit(&state, user.id).await?;

    let inventory = parse_job_keywords(job_description, &state.llm).await?;
    let report = state.indicator_scorer.score(&cv.content, &inventory).await?;

    set_indicator_score(&state.db, user.id, id, report.overall_score as i32).await?;
    info!(
        "Indicator score {}/100 for application {id} (user {})",
        report.overall_score, user.id
    );

    Ok(Json(IndicatorResponse {
        application_id: id,
        cv_version_id: cv.id,
        report,
    }))
}
