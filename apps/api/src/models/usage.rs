use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UsageCounterRow {
    pub user_id: Uuid,
    pub feature: String,
    pub period_start: NaiveDate,
    pub count: i32,
}
