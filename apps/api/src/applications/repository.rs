use sqlx::PgPool;
use uuid::Uuid;

use crate::applications::status::ApplicationStatus;
use crate::applications::tracking::PlannedApplication;
use crate::errors::AppError;
use crate::models::application::JobApplicationRow;

/// Scoped to the owner: another user's id reads as not found.
pub async fn get_application(
    pool: &PgPool,
    user_id: Uuid,
    id: Uuid,
) -> Result<JobApplicationRow, AppError> {
    sqlx::query_as::<_, JobApplicationRow>(
        "SELECT * FROM job_applications WHERE id = $1 AND user_id = $2",
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Application {id} not found")))
}

pub async fn list_applications(
    pool: &PgPool,
    user_id: Uuid,
    status: Option<ApplicationStatus>,
) -> Result<Vec<JobApplicationRow>, AppError> {
    Ok(sqlx::query_as::<_, JobApplicationRow>(
        r#"
        SELECT * FROM job_applications
        WHERE user_id = $1 AND ($2::text IS NULL OR status = $2)
        ORDER BY updated_at DESC
        "#,
    )
    .bind(user_id)
    .bind(status.map(|s| s.as_str()))
    .fetch_all(pool)
    .await?)
}

pub async fn insert_application(
    pool: &PgPool,
    user_id: Uuid,
    planned: &PlannedApplication,
) -> Result<JobApplicationRow, AppError> {
    let f = &planned.fields;
    Ok(sqlx::query_as::<_, JobApplicationRow>(
        r#"
        INSERT INTO job_applications
            (id, user_id, company, position, status, job_url, job_description,
             location, salary_min, salary_max, applied_at, notes)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(&f.company)
    .bind(&f.position)
    .bind(planned.status.as_str())
    .bind(&f.job_url)
    .bind(&f.job_description)
    .bind(&f.location)
    .bind(f.salary_min)
    .bind(f.salary_max)
    .bind(planned.applied_at)
    .bind(&f.notes)
    .fetch_one(pool)
    .await?)
}

pub async fn update_application(
    pool: &PgPool,
    user_id: Uuid,
    id: Uuid,
    planned: &PlannedApplication,
) -> Result<JobApplicationRow, AppError> {
    let f = &planned.fields;
    sqlx::query_as::<_, JobApplicationRow>(
        r#"
        UPDATE job_applications
        SET company = $3, position = $4, status = $5, job_url = $6, job_description = $7,
            location = $8, salary_min = $9, salary_max = $10, applied_at = $11, notes = $12,
            updated_at = now()
        WHERE id = $1 AND user_id = $2
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(&f.company)
    .bind(&f.position)
    .bind(planned.status.as_str())
    .bind(&f.job_url)
    .bind(&f.job_description)
    .bind(&f.location)
    .bind(f.salary_min)
    .bind(f.salary_max)
    .bind(planned.applied_at)
    .bind(&f.notes)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound(format!("Application {id} not found")))
}

pub async fn delete_application(pool: &PgPool, user_id: Uuid, id: Uuid) -> Result<(), AppError> {
    let result = sqlx::query("DELETE FROM job_applications WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Application {id} not found")));
    }
    Ok(())
}

pub async fn status_counts(pool: &PgPool, user_id: Uuid) -> Result<Vec<(String, i64)>, AppError> {
    Ok(sqlx::query_as::<_, (String, i64)>(
        "SELECT status, COUNT(*) FROM job_applications WHERE user_id = $1 GROUP BY status",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?)
}

pub async fn set_indicator_score(
    pool: &PgPool,
    user_id: Uuid,
    id: Uuid,
    score: i32,
) -> Result<(), AppError> {
    sqlx::query(
        "UPDATE job_applications SET indicator_score = $3, updated_at = now() WHERE id = $1 AND user_id = $2",
    )
    .bind(id)
    .bind(user_id)
    .bind(score)
    .execute(pool)
    .await?;
    Ok(())
}
