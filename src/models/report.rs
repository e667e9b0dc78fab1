use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A persisted AI-generated report. Write-once after generation.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AiReport {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Free-form tag, stored uppercase (e.g. "WEEKLY_SUMMARY")
    pub report_type: String,
    pub content: String,
    /// Opaque JSON string with generation parameters
    pub metadata: Option<String>,
    /// Truncated copy of the prompt sent to the model
    pub prompt_used: Option<String>,
    pub model_used: Option<String>,
    pub tokens_used: i32,
    pub created_at: DateTime<Utc>,
}
