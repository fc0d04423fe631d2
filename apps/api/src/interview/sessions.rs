use anyhow::Context;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::interview::coach::{Answer, InterviewType, Question, SessionStatus};
use crate::models::interview::InterviewSessionRow;

pub struct NewSession<'a> {
    pub user_id: Uuid,
    pub application_id: Option<Uuid>,
    pub role: &'a str,
    pub company: Option<&'a str>,
    pub interview_type: InterviewType,
    pub questions: &'a [Question],
}

pub fn decode_questions(row: &InterviewSessionRow) -> Result<Vec<Question>, AppError> {
    Ok(serde_json::from_value(row.questions.clone())
        .with_context(|| format!("Corrupt questions on interview session {}", row.id))?)
}

pub fn decode_answers(row: &InterviewSessionRow) -> Result<Vec<Answer>, AppError> {
    Ok(serde_json::from_value(row.answers.clone())
        .with_context(|| format!("Corrupt answers on interview session {}", row.id))?)
}

pub fn decode_type(row: &InterviewSessionRow) -> Result<InterviewType, AppError> {
    Ok(serde_json::from_value(Value::String(row.interview_type.clone()))
        .with_context(|| format!("Unknown interview type on session {}", row.id))?)
}

/// Answering and completing are only allowed while the session is open.
pub fn require_in_progress(row: &InterviewSessionRow) -> Result<(), AppError> {
    if row.status != SessionStatus::InProgress.as_str() {
        return Err(AppError::Conflict(format!(
            "Interview session {} is already {}",
            row.id, row.status
        )));
    }
    Ok(())
}

pub async fn insert_session(
    pool: &PgPool,
    session: NewSession<'_>,
) -> Result<InterviewSessionRow, AppError> {
    let questions = serde_json::to_value(session.questions).context("Serialize questions")?;
    Ok(sqlx::query_as::<_, InterviewSessionRow>(
        r#"
        INSERT INTO interview_sessions
            (id, user_id, application_id, role, company, interview_type, questions, answers, status)
        VALUES ($1, $2, $3, $4, $5, $6, $7, '[]'::jsonb, $8)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(session.user_id)
    .bind(session.application_id)
    .bind(session.role)
    .bind(session.company)
    .bind(session.interview_type.as_str())
    .bind(questions)
    .bind(SessionStatus::InProgress.as_str())
    .fetch_one(pool)
    .await?)
}

pub async fn get_session(
    pool: &PgPool,
    user_id: Uuid,
    id: Uuid,
) -> Result<InterviewSessionRow, AppError> {
    sqlx::query_as::<_, InterviewSessionRow>(
        "SELECT * FROM interview_sessions WHERE id = $1 AND user_id = $2",
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Interview session {id} not found")))
}

pub async fn list_sessions(pool: &PgPool, user_id: Uuid) -> Result<Vec<InterviewSessionRow>, AppError> {
    Ok(sqlx::query_as::<_, InterviewSessionRow>(
        "SELECT * FROM interview_sessions WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?)
}

/// The status guard in the WHERE clause keeps a concurrent completion from being overwritten.
pub async fn save_answers(
    pool: &PgPool,
    user_id: Uuid,
    id: Uuid,
    answers: &[Answer],
) -> Result<InterviewSessionRow, AppError> {
    let answers = serde_json::to_value(answers).context("Serialize answers")?;
    sqlx::query_as::<_, InterviewSessionRow>(
        r#"
        UPDATE interview_sessions SET answers = $3
        WHERE id = $1 AND user_id = $2 AND status = 'in_progress'
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(answers)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::Conflict(format!("Interview session {id} is no longer in progress")))
}

pub async fn complete_session(
    pool: &PgPool,
    user_id: Uuid,
    id: Uuid,
    overall_score: i32,
    completed_at: DateTime<Utc>,
) -> Result<InterviewSessionRow, AppError> {
    sqlx::query_as::<_, InterviewSessionRow>(
        r#"
        UPDATE interview_sessions
        SET status = $3, overall_score = $4, completed_at = $5
        WHERE id = $1 AND user_id = $2 AND status = 'in_progress'
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(SessionStatus::Completed.as_str())
    .bind(overall_score)
    .bind(completed_at)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::Conflict(format!("Interview session {id} is already completed")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(status: &str, interview_type: &str) -> InterviewSessionRow {
        InterviewSessionRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            application_id: None,
            role: "Backend Engineer".into(),
            company: None,
            interview_type: interview_type.into(),
            questions: json!([{"id": "q1", "question": "Why Rust?", "focus": "motivation"}]),
            answers: json!([]),
            status: status.into(),
            overall_score: None,
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    #[test]
    fn test_decode_stored_session() {
        let r = row("in_progress", "technical");
        assert_eq!(decode_questions(&r).unwrap()[0].id, "q1");
        assert!(decode_answers(&r).unwrap().is_empty());
        assert_eq!(decode_type(&r).unwrap(), InterviewType::Technical);
    }

    #[test]
    fn test_unknown_type_is_internal_error() {
        let r = row("in_progress", "astrology");
        assert!(matches!(decode_type(&r), Err(AppError::Internal(_))));
    }

    #[test]
    fn test_completed_session_rejects_changes() {
        assert!(require_in_progress(&row("in_progress", "general")).is_ok());
        assert!(matches!(
            require_in_progress(&row("completed", "general")),
            Err(AppError::Conflict(_))
        ));
    }
}
