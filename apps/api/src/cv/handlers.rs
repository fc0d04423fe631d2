//! Axum route handlers for CV versions and tailoring.

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::applications::repository::get_application;
use crate::auth::AuthUser;
use crate::cv::tailor::{resolve_job_source, tailor_cv, CvChange, JobSource};
use crate::cv::versioning::{
    commit_cv_version, get_version, latest_version, list_versions, validate_cv_content,
    CvSource, NewCvVersion,
};
use crate::documents::{extract_pdf_text, read_upload};
use crate::errors::{AppError, AppJson};
use crate::models::cv::{CvVersionRow, CvVersionSummary};
use crate::rate_limit::enforce_rate_limit;
use crate::state::AppState;
use crate::storage::delete_object;
use crate::subscription::tiers::Feature;
use crate::subscription::usage::{record_usage, require_within_limit};

#[derive(Debug, Deserialize)]
pub struct ManualCvRequest {
    pub content: String,
    pub label: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TailorRequest {
    pub base_version_id: Option<Uuid>,
    pub application_id: Option<Uuid>,
    pub job_description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TailorResponse {
    pub version: CvVersionRow,
    pub changes: Vec<CvChange>,
    pub keywords_added: Vec<String>,
}

/// POST /api/cv/upload (multipart: `file` PDF, optional `label`)
pub async fn handle_upload(
    State(state): State<AppState>,
    user: AuthUser,
    multipart: Multipart,
) -> Result<(StatusCode, Json<CvVersionRow>), AppError> {
    let form = read_upload(multipart).await?;
    let file = form
        .file
        .clone()
        .ok_or_else(|| AppError::Validation("file is required".to_string()))?;

    let text = extract_pdf_text(file).await?;
    validate_cv_content(&text)?;

    let row = commit_cv_version(
        &state.db,
        &state.s3,
        &state.config.s3_bucket,
        NewCvVersion {
            user_id: user.id,
            label: form.field("label"),
            content: &text,
            source: CvSource::Upload,
            application_id: None,
        },
    )
    .await?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// POST /api/cv
pub async fn handle_create_manual(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(request): AppJson<ManualCvRequest>,
) -> Result<(StatusCode, Json<CvVersionRow>), AppError> {
    validate_cv_content(&request.content)?;

    let row = commit_cv_version(
        &state.db,
        &state.s3,
        &state.config.s3_bucket,
        NewCvVersion {
            user_id: user.id,
            label: request.label.as_deref().map(str::trim).filter(|l| !l.is_empty()),
            content: request.content.trim(),
            source: CvSource::Manual,
            application_id: None,
        },
    )
    .await?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// GET /api/cv/versions
pub async fn handle_list_versions(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<CvVersionSummary>>, AppError> {
    Ok(Json(list_versions(&state.db, user.id).await?))
}

/// GET /api/cv/versions/:id
pub async fn handle_get_version(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<CvVersionRow>, AppError> {
    Ok(Json(get_version(&state.db, user.id, id).await?))
}

/// DELETE /api/cv/versions/:id
pub async fn handle_delete_version(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let version = get_version(&state.db, user.id, id).await?;

    sqlx::query("DELETE FROM cv_versions WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user.id)
        .execute(&state.db)
        .await?;

    if let Err(e) = delete_object(&state.s3, &state.config.s3_bucket, &version.storage_key).await {
        warn!("CV version {id} deleted but its snapshot was not: {e}");
    }
    info!("Deleted CV version {} for user {}", version.version, user.id);
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/cv/tailor
///
/// Split pattern on `cv_tailoring`. Produces a new `tailored` version.
pub async fn handle_tailor(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(request): AppJson<TailorRequest>,
) -> Result<(StatusCode, Json<TailorResponse>), AppError> {
    let source = resolve_job_source(request.job_description.as_deref(), request.application_id)?;

    enforce_rate_limit(&state, user.id).await?;
    require_within_limit(
        &state.db,
        &user,
        Feature::CvTailoring,
        state.config.subscription_enforcement,
    )
    .await?;

    let (job_description, application, label) = match source {
        JobSource::Inline(text) => (text, None, "Tailored CV".to_string()),
        JobSource::Application(id) => {
            let application = get_application(&state.db, user.id, id).await?;
            let text = application
                .job_description
                .clone()
                .filter(|d| !d.trim().is_empty())
                .ok_or_else(|| {
                    AppError::Validation(
                        "The selected application has no job description".to_string(),
                    )
                })?;
            let label = format!("{} – {}", application.company, application.position);
            (text, Some(application.id), label)
        }
    };

    let base = match request.base_version_id {
        Some(id) => get_version(&state.db, user.id, id).await?,
        None => latest_version(&state.db, user.id).await?.ok_or_else(|| {
            AppError::UnprocessableEntity("Upload or write a CV before tailoring".to_string())
        })?,
    };

    let tailored = tailor_cv(&state.llm, &base.content, &job_description).await?;

    let version = commit_cv_version(
        &state.db,
        &state.s3,
        &state.config.s3_bucket,
        NewCvVersion {
            user_id: user.id,
            label: Some(&label),
            content: tailored.tailored_cv.trim(),
            source: CvSource::Tailored,
            application_id: application,
        },
    )
    .await?;

    record_usage(&state.db, user.id, Feature::CvTailoring).await;

    Ok((
        StatusCode::CREATED,
        Json(TailorResponse {
            version,
            changes: tailored.changes,
            keywords_added: tailored.keywords_added,
        }),
    ))
}
