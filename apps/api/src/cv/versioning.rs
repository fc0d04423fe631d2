use aws_sdk_s3::Client as S3Client;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::cv::{CvVersionRow, CvVersionSummary};
use crate::storage::{cv_key, put_object};

pub const MAX_CV_LEN: usize = 50_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CvSource {
    Upload,
    Manual,
    Tailored,
}

impl CvSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            CvSource::Upload => "upload",
            CvSource::Manual => "manual",
            CvSource::Tailored => "tailored",
        }
    }
}

/// Parameters for committing a new CV version.
pub struct NewCvVersion<'a> {
    pub user_id: Uuid,
    pub label: Option<&'a str>,
    pub content: &'a str,
    pub source: CvSource,
    pub application_id: Option<Uuid>,
}

pub fn validate_cv_content(content: &str) -> Result<(), AppError> {
    if content.trim().is_empty() {
        return Err(AppError::Validation("content cannot be empty".to_string()));
    }
    if content.chars().count() > MAX_CV_LEN {
        return Err(AppError::Validation(format!(
            "content must be at most {MAX_CV_LEN} characters"
        )));
    }
    Ok(())
}

/// Appends a CV version: snapshot to object storage first, then the row.
/// Versions are never rewritten; tailoring always produces a new one.
pub async fn commit_cv_version(
    pool: &PgPool,
    s3: &S3Client,
    s3_bucket: &str,
    new: NewCvVersion<'_>,
) -> Result<CvVersionRow, AppError> {
    let current_max: Option<i32> =
        sqlx::query_scalar("SELECT MAX(version) FROM cv_versions WHERE user_id = $1")
            .bind(new.user_id)
            .fetch_one(pool)
            .await?;
    let version = current_max.unwrap_or(0) + 1;

    let storage_key = cv_key(new.user_id, version);
    let markdown = render_cv_markdown(version, new.source, new.label, new.content);
    put_object(s3, s3_bucket, &storage_key, markdown.into_bytes(), "text/markdown").await?;

    let row = sqlx::query_as::<_, CvVersionRow>(
        r#"
        INSERT INTO cv_versions
            (id, user_id, version, label, content, source, application_id, storage_key)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(new.user_id)
    .bind(version)
    .bind(new.label)
    .bind(new.content)
    .bind(new.source.as_str())
    .bind(new.application_id)
    .bind(&storage_key)
    .fetch_one(pool)
    .await?;

    info!(
        "Committed CV version {version} ({}) for user {}",
        new.source.as_str(),
        new.user_id
    );
    Ok(row)
}

pub async fn latest_version(pool: &PgPool, user_id: Uuid) -> Result<Option<CvVersionRow>, AppError> {
    Ok(sqlx::query_as::<_, CvVersionRow>(
        "SELECT * FROM cv_versions WHERE user_id = $1 ORDER BY version DESC LIMIT 1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?)
}

pub async fn get_version(pool: &PgPool, user_id: Uuid, id: Uuid) -> Result<CvVersionRow, AppError> {
    sqlx::query_as::<_, CvVersionRow>("SELECT * FROM cv_versions WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("CV version {id} not found")))
}

pub async fn list_versions(pool: &PgPool, user_id: Uuid) -> Result<Vec<CvVersionSummary>, AppError> {
    Ok(sqlx::query_as::<_, CvVersionSummary>(
        r#"
        SELECT id, version, label, source, application_id, created_at
        FROM cv_versions
        WHERE user_id = $1
        ORDER BY version DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?)
}

/// Renders a stored CV snapshot with a small metadata header.
pub fn render_cv_markdown(version: i32, source: CvSource, label: Option<&str>, content: &str) -> String {
    let mut md = format!("# {}\n\n", label.unwrap_or("Curriculum Vitae"));
    md.push_str(&format!("- **Version:** {version}\n"));
    md.push_str(&format!("- **Source:** {}\n\n", source.as_str()));
    md.push_str("---\n\n");
    md.push_str(content.trim());
    md.push('\n');
    md
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_rejects_blank_and_oversized() {
        assert!(validate_cv_content("   \n").is_err());
        assert!(validate_cv_content(&"a".repeat(MAX_CV_LEN + 1)).is_err());
        assert!(validate_cv_content("Jane Doe — Engineer").is_ok());
    }

    #[test]
    fn test_render_markdown_includes_metadata() {
        let md = render_cv_markdown(4, CvSource::Tailored, Some("Acme – Backend"), "  body text \n");
        assert!(md.starts_with("# Acme – Backend\n"));
        assert!(md.contains("- **Version:** 4"));
        assert!(md.contains("- **Source:** tailored"));
        assert!(md.ends_with("body text\n"));
    }

    #[test]
    fn test_render_markdown_default_title() {
        let md = render_cv_markdown(1, CvSource::Upload, None, "x");
        assert!(md.starts_with("# Curriculum Vitae"));
    }
}
