use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A single mood log. Immutable once created — there is no update endpoint,
/// only create and delete.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MoodEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    /// 1 (worst) to 10 (best)
    pub mood_score: i32,
    pub notes: Option<String>,
    /// Comma-separated activity tags
    pub activities: Option<String>,
    pub energy_level: Option<i32>,
    pub stress_level: Option<i32>,
    /// When the mood was felt — user-supplied, defaults to entry creation time
    pub timestamp: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
