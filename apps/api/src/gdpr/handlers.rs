//! Axum route handlers for consent, export and account deletion.

use anyhow::Context;
use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use tracing::{info, warn};

use crate::auth::{AdminUser, AuthUser};
use crate::errors::{AppError, AppJson};
use crate::gdpr::consent::{current_consents, record_consent, ConsentType};
use crate::gdpr::deletion::{
    cancel_request, create_request, latest_request, process_due_requests, ProcessingSummary,
};
use crate::gdpr::export::{collect_user_data, export_filename};
use crate::models::gdpr::{ConsentLogRow, DeletionRequestRow};
use crate::state::AppState;
use crate::storage::{export_key, put_object};

const MAX_REASON_LEN: usize = 1_000;

#[derive(Debug, Deserialize)]
pub struct ConsentRequest {
    pub consent_type: ConsentType,
    pub granted: bool,
}

#[derive(Debug, Deserialize)]
pub struct DeletionRequestBody {
    pub reason: Option<String>,
    #[serde(default)]
    pub confirm: bool,
}

/// POST /api/gdpr/consent
pub async fn handle_record_consent(
    State(state): State<AppState>,
    user: AuthUser,
    headers: HeaderMap,
    AppJson(request): AppJson<ConsentRequest>,
) -> Result<(StatusCode, Json<ConsentLogRow>), AppError> {
    let row = record_consent(&state.db, user.id, request.consent_type, request.granted, &headers)
        .await?;
    info!(
        "User {} {} consent '{}'",
        user.id,
        if request.granted { "granted" } else { "withdrew" },
        request.consent_type.as_str()
    );
    Ok((StatusCode::CREATED, Json(row)))
}

/// GET /api/gdpr/consent
pub async fn handle_list_consents(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<ConsentLogRow>>, AppError> {
    Ok(Json(current_consents(&state.db, user.id).await?))
}

/// GET /api/gdpr/export-data
///
/// Returns the export as a download and keeps a copy in object storage.
pub async fn handle_export(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let now = Utc::now();
    let export = collect_user_data(&state.db, user.id, now).await?;
    let body = serde_json::to_vec_pretty(&export).context("Serialize export")?;

    let key = export_key(user.id, now.timestamp());
    if let Err(e) = put_object(&state.s3, &state.config.s3_bucket, &key, body.clone(), "application/json").await {
        warn!("Export for user {} not archived: {e}", user.id);
    }
    info!("Exported data for user {} ({} bytes)", user.id, body.len());

    let disposition = format!("attachment; filename=\"{}\"", export_filename(now));
    Ok((
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    ))
}

/// POST /api/gdpr/delete-request
pub async fn handle_create_deletion(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(request): AppJson<DeletionRequestBody>,
) -> Result<(StatusCode, Json<DeletionRequestRow>), AppError> {
    if !request.confirm {
        return Err(AppError::Validation(
            "confirm must be true to request account deletion".to_string(),
        ));
    }
    let reason = request.reason.as_deref().map(str::trim).filter(|r| !r.is_empty());
    if reason.is_some_and(|r| r.chars().count() > MAX_REASON_LEN) {
        return Err(AppError::Validation(format!(
            "reason must be at most {MAX_REASON_LEN} characters"
        )));
    }

    let row = create_request(
        &state.db,
        user.id,
        reason,
        Utc::now(),
        state.config.deletion_grace_days,
    )
    .await?;
    info!(
        "User {} requested account deletion, scheduled for {}",
        user.id, row.scheduled_for
    );
    Ok((StatusCode::CREATED, Json(row)))
}

/// GET /api/gdpr/delete-request
pub async fn handle_get_deletion(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<DeletionRequestRow>, AppError> {
    Ok(Json(latest_request(&state.db, user.id).await?))
}

/// DELETE /api/gdpr/delete-request
pub async fn handle_cancel_deletion(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<DeletionRequestRow>, AppError> {
    let row = cancel_request(&state.db, user.id, Utc::now()).await?;
    info!("User {} cancelled deletion request {}", user.id, row.id);
    Ok(Json(row))
}

/// POST /api/admin/gdpr/process-deletions
pub async fn handle_process_deletions(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
) -> Result<Json<ProcessingSummary>, AppError> {
    info!("Admin {} started the deletion sweep", admin.id);
    let summary =
        process_due_requests(&state.db, &state.s3, &state.config.s3_bucket, Utc::now()).await?;
    Ok(Json(summary))
}
