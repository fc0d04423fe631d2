use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ContractAnalysisRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: Option<String>,
    pub contract_text: String,
    pub summary: String,
    pub risk_score: i32,
    pub overall_risk: String,
    pub clauses: Value,
    pub red_flags: Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ContractAnalysisSummary {
    pub id: Uuid,
    pub title: Option<String>,
    pub risk_score: i32,
    pub overall_risk: String,
    pub created_at: DateTime<Utc>,
}
