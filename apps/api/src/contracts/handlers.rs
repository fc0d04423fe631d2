//! Axum route handlers for contract review.

use anyhow::Context;
use axum::{
    extract::{FromRequest, Multipart, Path, Request, State},
    http::{header, StatusCode},
    Json,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::contracts::analysis::{analyze_contract, validate_contract_text};
use crate::documents::{extract_pdf_text, read_upload};
use crate::errors::{AppError, AppJson};
use crate::models::contract::{ContractAnalysisRow, ContractAnalysisSummary};
use crate::rate_limit::enforce_rate_limit;
use crate::state::AppState;
use crate::subscription::tiers::Feature;
use crate::subscription::usage::{record_usage, require_within_limit};

#[derive(Debug, Deserialize)]
pub struct AnalyzeContractRequest {
    pub contract_text: String,
    pub title: Option<String>,
}

struct ContractInput {
    text: String,
    title: Option<String>,
}

fn is_multipart(request: &Request) -> bool {
    request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("multipart/form-data"))
}

/// Accepts either a JSON body or a multipart PDF upload.
async fn read_contract_input(state: &AppState, request: Request) -> Result<ContractInput, AppError> {
    if is_multipart(&request) {
        let multipart = Multipart::from_request(request, state)
            .await
            .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?;
        let form = read_upload(multipart).await?;
        let file = form
            .file
            .clone()
            .ok_or_else(|| AppError::Validation("file is required".to_string()))?;
        let text = extract_pdf_text(file).await?;
        return Ok(ContractInput {
            text,
            title: form.field("title").map(str::to_string),
        });
    }

    let AppJson(body) = AppJson::<AnalyzeContractRequest>::from_request(request, state).await?;
    Ok(ContractInput {
        text: body.contract_text,
        title: body.title.map(|t| t.trim().to_string()).filter(|t| !t.is_empty()),
    })
}

/// POST /api/contracts/analyze
///
/// Split pattern on `contract_review`.
pub async fn handle_analyze(
    State(state): State<AppState>,
    user: AuthUser,
    request: Request,
) -> Result<(StatusCode, Json<ContractAnalysisRow>), AppError> {
    let input = read_contract_input(&state, request).await?;
    let contract_text = validate_contract_text(&input.text)?;

    enforce_rate_limit(&state, user.id).await?;
    require_within_limit(
        &state.db,
        &user,
        Feature::ContractReview,
        state.config.subscription_enforcement,
    )
    .await?;

    let analysis = analyze_contract(&state.llm, contract_text).await?;

    let row = sqlx::query_as::<_, ContractAnalysisRow>(
        r#"
        INSERT INTO contract_analyses
            (id, user_id, title, contract_text, summary, risk_score, overall_risk, clauses, red_flags)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user.id)
    .bind(&input.title)
    .bind(contract_text)
    .bind(&analysis.summary)
    .bind(analysis.risk_score)
    .bind(analysis.overall_risk.as_str())
    .bind(serde_json::to_value(&analysis.clauses).context("Serialize clauses")?)
    .bind(serde_json::to_value(&analysis.red_flags).context("Serialize red flags")?)
    .fetch_one(&state.db)
    .await?;

    info!(
        "Contract analysis {} for user {}: risk {} ({}), {} clauses, {} red flags",
        row.id,
        user.id,
        row.risk_score,
        row.overall_risk,
        analysis.clauses.len(),
        analysis.red_flags.len()
    );

    record_usage(&state.db, user.id, Feature::ContractReview).await;
    Ok((StatusCode::CREATED, Json(row)))
}

/// GET /api/contracts/analyses
pub async fn handle_list(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<ContractAnalysisSummary>>, AppError> {
    let rows = sqlx::query_as::<_, ContractAnalysisSummary>(
        r#"
        SELECT id, title, risk_score, overall_risk, created_at
        FROM contract_analyses WHERE user_id = $1
        ORDER BY created_at DESC
        "#,
    )
    .bind(user.id)
    .fetch_all(&state.db)
    .await?;
    Ok(Json(rows))
}

/// GET /api/contracts/analyses/:id
pub async fn handle_get(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ContractAnalysisRow>, AppError> {
    sqlx::query_as::<_, ContractAnalysisRow>(
        "SELECT * FROM contract_analyses WHERE id = $1 AND user_id = $2",
    )
    .bind(id)
    .bind(user.id)
    .fetch_optional(&state.db)
    .await?
    .map(Json)
    .ok_or_else(|| AppError::NotFound(format!("Contract analysis {id} not found")))
}
