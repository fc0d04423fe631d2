use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One row per user; `id` is the user id issued by the hosted auth service.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProfileRow {
    pub id: Uuid,
    pub email: String,
    pub tier: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}
