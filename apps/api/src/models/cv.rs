use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CvVersionRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub version: i32,
    pub label: Option<String>,
    pub content: String,
    pub source: String,
    pub application_id: Option<Uuid>,
    pub storage_key: String,
    pub created_at: DateTime<Utc>,
}

/// Listing projection without the CV body.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CvVersionSummary {
    pub id: Uuid,
    pub version: i32,
    pub label: Option<String>,
    pub source: String,
    pub application_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}
