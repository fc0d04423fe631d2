//! Axum route handlers for interview coaching sessions.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::applications::repository::get_application;
use crate::applications::validation::MAX_NAME_LEN;
use crate::auth::AuthUser;
use crate::errors::{AppError, AppJson};
use crate::interview::coach::{
    evaluate_answer, find_question, generate_questions, overall_score, upsert_answer,
    validate_answer_text, validate_question_count, Answer, InterviewType,
};
use crate::interview::sessions::{
    complete_session, decode_answers, decode_questions, decode_type, get_session,
    insert_session, list_sessions, require_in_progress, save_answers, NewSession,
};
use crate::models::interview::InterviewSessionRow;
use crate::rate_limit::enforce_rate_limit;
use crate::state::AppState;
use crate::subscription::tiers::Feature;
use crate::subscription::usage::{record_usage, require_within_limit};

#[derive(Debug, Deserialize)]
pub struct StartSessionRequest {
    pub role: Option<String>,
    pub company: Option<String>,
    pub interview_type: InterviewType,
    pub question_count: Option<u32>,
    pub application_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    pub question_id: String,
    pub answer: String,
}

#[derive(Debug, Serialize)]
pub struct AnswerResponse {
    pub answer: Answer,
    pub answered: usize,
    pub total_questions: usize,
}

fn clean(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// POST /api/interview/sessions
///
/// Split pattern on `interview_coaching`; one session counts once.
pub async fn handle_start(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(request): AppJson<StartSessionRequest>,
) -> Result<(StatusCode, Json<InterviewSessionRow>), AppError> {
    let count = validate_question_count(request.question_count)?;
    let role = clean(request.role.as_deref())
        .ok_or_else(|| AppError::Validation("role is required".to_string()))?
        .to_string();
    if role.chars().count() > MAX_NAME_LEN {
        return Err(AppError::Validation(format!(
            "role must be at most {MAX_NAME_LEN} characters"
        )));
    }

    enforce_rate_limit(&state, user.id).await?;
    require_within_limit(
        &state.db,
        &user,
        Feature::InterviewCoaching,
        state.config.subscription_enforcement,
    )
    .await?;

    let application = match request.application_id {
        Some(id) => Some(get_application(&state.db, user.id, id).await?),
        None => None,
    };

    let company = clean(request.company.as_deref())
        .map(str::to_string)
        .or_else(|| application.as_ref().map(|a| a.company.clone()));
    let job_description = application.as_ref().and_then(|a| a.job_description.as_deref());

    let questions = generate_questions(
        &state.llm,
        request.interview_type,
        &role,
        company.as_deref(),
        job_description,
        count,
    )
    .await?;

    let row = insert_session(
        &state.db,
        NewSession {
            user_id: user.id,
            application_id: application.as_ref().map(|a| a.id),
            role: &role,
            company: company.as_deref(),
            interview_type: request.interview_type,
            questions: &questions,
        },
    )
    .await?;
    info!(
        "Started {} interview session {} ({} questions) for user {}",
        request.interview_type.as_str(),
        row.id,
        questions.len(),
        user.id
    );

    record_usage(&state.db, user.id, Feature::InterviewCoaching).await;
    Ok((StatusCode::CREATED, Json(row)))
}

/// POST /api/interview/sessions/:id/answers
pub async fn handle_answer(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    AppJson(request): AppJson<AnswerRequest>,
) -> Result<Json<AnswerResponse>, AppError> {
    let answer_text = validate_answer_text(&request.answer)?;

    let session = get_session(&state.db, user.id, id).await?;
    require_in_progress(&session)?;
    let questions = decode_questions(&session)?;
    let question = find_question(&questions, &request.question_id)?;

    enforce_rate_limit(&state, user.id).await?;

    let interview_type = decode_type(&session)?;
    let answer = evaluate_answer(&state.llm, interview_type, &session.role, question, answer_text)
        .await?;

    let answers = upsert_answer(decode_answers(&session)?, answer.clone());
    let answered = answers.len();
    save_answers(&state.db, user.id, id, &answers).await?;

    Ok(Json(AnswerResponse {
        answer,
        answered,
        total_questions: questions.len(),
    }))
}

/// POST /api/interview/sessions/:id/complete
pub async fn handle_complete(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<InterviewSessionRow>, AppError> {
    let session = get_session(&state.db, user.id, id).await?;
    require_in_progress(&session)?;

    let answers = decode_answers(&session)?;
    let score = overall_score(&answers).ok_or_else(|| {
        AppError::Validation("Answer at least one question before completing".to_string())
    })?;

    let row = complete_session(&state.db, user.id, id, score, Utc::now()).await?;
    info!("Completed interview session {id} with score {score} for user {}", user.id);
    Ok(Json(row))
}

/// GET /api/interview/sessions
pub async fn handle_list(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<InterviewSessionRow>>, AppError> {
    Ok(Json(list_sessions(&state.db, user.id).await?))
}

/// GET /api/interview/sessions/:id
pub async fn handle_get(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<InterviewSessionRow>, AppError> {
    Ok(Json(get_session(&state.db, user.id, id).await?))
}
