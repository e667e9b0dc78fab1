//! # Wellspring — Request/Response DTOs
//!
//! All API contract types in one module.
//!
//! Conventions:
//! - `*Request`  → deserialized from client JSON body or query params
//! - `*Response` → serialized to client JSON
//! - Validation is expressed via `validator` derive macros where possible;
//!   cross-field rules get an `impl` helper next to the type

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::goal::{Goal, GoalPeriod, GoalStatus, GoalType};
use crate::models::user::User;

// ============================================================================
// Common
// ============================================================================

/// Standard delete confirmation
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub deleted: bool,
    pub id: Uuid,
}

// ============================================================================
// Auth
// ============================================================================

/// POST /api/auth/register
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub full_name: String,

    #[validate(email(message = "Invalid email format"))]
    #[validate(length(max = 254, message = "Email too long"))]
    pub email: String,

    #[validate(length(min = 8, max = 128, message = "Password must be 8-128 characters"))]
    pub password: String,

    /// IANA timezone identifier (e.g., "America/New_York"). Default: "UTC"
    pub timezone: Option<String>,
}

/// POST /api/auth/login
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,

    #[validate(length(min = 1))]
    pub password: String,
}

/// POST /api/auth/refresh
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Response for register and login
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    pub user: UserSummary,
}

/// Minimal user info returned in auth responses and GET /api/me
#[derive(Debug, Serialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub timezone: String,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserSummary {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            full_name: u.full_name,
            email: u.email,
            timezone: u.timezone,
            created_at: u.created_at,
        }
    }
}

// ============================================================================
// Goals
// ============================================================================

/// POST /api/goals
#[derive(Debug, Deserialize, Validate)]
pub struct CreateGoalRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    #[validate(length(max = 1000, message = "Description must be under 1000 characters"))]
    pub description: Option<String>,

    pub goal_type: GoalType,

    /// Completions per period before the progress counter resets. Min: 1
    #[validate(range(min = 1, message = "Target count must be at least 1"))]
    pub target_count: i32,

    pub period: GoalPeriod,
}

/// PATCH /api/goals/{id}/status
#[derive(Debug, Deserialize)]
pub struct UpdateGoalStatusRequest {
    pub status: GoalStatus,
}

/// Full goal response with derived presentation fields
#[derive(Debug, Serialize)]
pub struct GoalResponse {
    pub id: Uuid,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub goal_type: GoalType,
    pub target_count: i32,
    pub period: GoalPeriod,
    pub current_progress: i32,
    pub current_streak: i32,
    pub longest_streak: i32,
    pub start_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_completion_date: Option<NaiveDate>,
    pub status: GoalStatus,
    pub completion_dates: Vec<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    // Derived fields, computed on read
    pub is_completed_today: bool,
    pub progress_percentage: f64,
    pub days_until_reset: i64,
}

impl GoalResponse {
    pub fn from_goal(goal: Goal, completion_dates: Vec<NaiveDate>, today: NaiveDate) -> Self {
        let is_completed_today = goal.last_completion_date == Some(today);
        let progress_percentage = if goal.target_count == 0 {
            0.0
        } else {
            f64::from(goal.current_progress) / f64::from(goal.target_count) * 100.0
        };
        let days_until_reset = days_until_reset(&goal.period, today);

        Self {
            id: goal.id,
            title: goal.title,
            description: goal.description,
            goal_type: goal.goal_type,
            target_count: goal.target_count,
            period: goal.period,
            current_progress: goal.current_progress,
            current_streak: goal.current_streak,
            longest_streak: goal.longest_streak,
            start_date: goal.start_date,
            last_completion_date: goal.last_completion_date,
            status: goal.status,
            completion_dates,
            created_at: goal.created_at,
            updated_at: goal.updated_at,
            is_completed_today,
            progress_percentage,
            days_until_reset,
        }
    }
}

/// Days from `today` until the goal's progress counter next resets:
/// daily → tomorrow, weekly → the Monday of next week, monthly → the first
/// of next month.
pub fn days_until_reset(period: &GoalPeriod, today: NaiveDate) -> i64 {
    use chrono::{Datelike, Duration};

    let reset_date = match period {
        GoalPeriod::Daily => today + Duration::days(1),
        GoalPeriod::Weekly => {
            let next_week = today + Duration::days(7);
            next_week - Duration::days(i64::from(next_week.weekday().num_days_from_monday()))
        }
        GoalPeriod::Monthly => {
            let (year, month) = if today.month() == 12 {
                (today.year() + 1, 1)
            } else {
                (today.year(), today.month() + 1)
            };
            NaiveDate::from_ymd_opt(year, month, 1).expect("first of month is a valid date")
        }
    };

    (reset_date - today).num_days()
}

/// GET /api/goals/count
#[derive(Debug, Serialize)]
pub struct GoalCountResponse {
    pub active_goals: i64,
}

// ============================================================================
// Moods
// ============================================================================

/// POST /api/moods
#[derive(Debug, Deserialize, Validate)]
pub struct CreateMoodRequest {
    #[validate(range(min = 1, max = 10, message = "Mood score must be 1-10"))]
    pub mood_score: i32,

    #[validate(length(max = 5000, message = "Notes must be under 5000 characters"))]
    pub notes: Option<String>,

    /// Comma-separated activity tags
    #[validate(length(max = 500, message = "Activities must be under 500 characters"))]
    pub activities: Option<String>,

    #[validate(range(min = 1, max = 10, message = "Energy level must be 1-10"))]
    pub energy_level: Option<i32>,

    #[validate(range(min = 1, max = 10, message = "Stress level must be 1-10"))]
    pub stress_level: Option<i32>,

    /// When the mood was felt. Default: now
    pub timestamp: Option<DateTime<Utc>>,
}

/// Date-range query params shared by /api/moods/range, /average and /trends
#[derive(Debug, Deserialize)]
pub struct MoodRangeQuery {
    /// Default: 30 days before end_date
    pub start_date: Option<NaiveDate>,
    /// Default: today
    pub end_date: Option<NaiveDate>,
}

impl MoodRangeQuery {
    /// Resolve the inclusive calendar-date range with defaults applied.
    pub fn resolve(&self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        let end = self.end_date.unwrap_or(today);
        let start = self
            .start_date
            .unwrap_or_else(|| end - chrono::Duration::days(30));
        (start, end)
    }
}

/// GET /api/moods/trends — chart-ready parallel arrays plus summary
#[derive(Debug, Serialize)]
pub struct MoodTrendsResponse {
    /// Date labels formatted "MMM dd" (e.g., "Oct 01")
    pub dates: Vec<String>,
    pub mood_scores: Vec<i32>,
    /// Missing energy values are rendered as 0 so the arrays stay parallel
    pub energy_levels: Vec<i32>,
    pub stress_levels: Vec<i32>,
    pub summary: TrendsSummary,
}

#[derive(Debug, Serialize)]
pub struct TrendsSummary {
    pub average_mood: f64,
    pub average_energy: f64,
    pub average_stress: f64,
    pub total_entries: usize,
    pub highest_mood: i32,
    pub lowest_mood: i32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// GET /api/moods/average
#[derive(Debug, Serialize)]
pub struct AverageMoodResponse {
    pub average_mood: f64,
}

// ============================================================================
// Journals
// ============================================================================

/// POST /api/journals
#[derive(Debug, Deserialize, Validate)]
pub struct CreateJournalRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    #[validate(length(min = 1, message = "Content is required"))]
    pub content: String,

    #[validate(length(max = 500, message = "Tags must be under 500 characters"))]
    pub tags: Option<String>,

    /// Default: false
    pub is_favorite: Option<bool>,

    /// Default: true
    pub is_private: Option<bool>,
}

/// PUT /api/journals/{id} — partial update, all fields optional
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateJournalRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,

    #[validate(length(min = 1))]
    pub content: Option<String>,

    #[validate(length(max = 500))]
    pub tags: Option<String>,

    pub is_favorite: Option<bool>,
    pub is_private: Option<bool>,
}

// ============================================================================
// AI chat & reports
// ============================================================================

/// POST /api/ai/chat
#[derive(Debug, Deserialize, Validate)]
pub struct ChatRequest {
    #[validate(length(min = 1, max = 4000, message = "Message must be 1-4000 characters"))]
    pub message: String,

    /// How many recent mood entries feed the context block. Default: 5
    #[validate(range(min = 1, max = 20, message = "Context size must be 1-20"))]
    pub context_size: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub reply: String,
    pub summary: String,
    pub suggestions: Vec<String>,
    pub metadata: ChatMetadata,
}

#[derive(Debug, Serialize)]
pub struct ChatMetadata {
    pub model: String,
    pub tokens_used: i32,
    pub is_mock_response: bool,
    pub response_time_ms: u128,
}

/// POST /api/ai/reports
#[derive(Debug, Deserialize, Validate)]
pub struct GenerateReportRequest {
    #[validate(length(min = 1, max = 100, message = "Report type must be 1-100 characters"))]
    pub report_type: String,

    /// Window of user data the report covers. Default: 7
    #[validate(range(min = 1, max = 90, message = "Days to include must be 1-90"))]
    pub days_to_include: Option<i64>,
}

/// AI report, returned by generation and by the /api/reports endpoints
#[derive(Debug, Serialize)]
pub struct ReportResponse {
    pub id: Uuid,
    pub report_type: String,
    pub content: String,
    /// First paragraph of the content, capped at 200 characters
    pub summary: String,
    pub tokens_used: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_used: Option<String>,
    pub is_mock_response: bool,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_days_until_reset_daily() {
        assert_eq!(days_until_reset(&GoalPeriod::Daily, date(2026, 3, 14)), 1);
    }

    #[test]
    fn test_days_until_reset_weekly_is_next_monday() {
        // Wed Mar 11 2026 → Monday of next week is Mar 16 → 5 days
        assert_eq!(days_until_reset(&GoalPeriod::Weekly, date(2026, 3, 11)), 5);
        // Monday → exactly one week out
        assert_eq!(days_until_reset(&GoalPeriod::Weekly, date(2026, 3, 9)), 7);
        // Sunday → tomorrow
        assert_eq!(days_until_reset(&GoalPeriod::Weekly, date(2026, 3, 15)), 1);
    }

    #[test]
    fn test_days_until_reset_monthly_first_of_next_month() {
        assert_eq!(days_until_reset(&GoalPeriod::Monthly, date(2026, 3, 14)), 18);
        // December rolls over the year
        assert_eq!(days_until_reset(&GoalPeriod::Monthly, date(2026, 12, 31)), 1);
    }

    #[test]
    fn test_mood_range_defaults() {
        let q = MoodRangeQuery {
            start_date: None,
            end_date: None,
        };
        let today = date(2026, 5, 20);
        let (start, end) = q.resolve(today);
        assert_eq!(end, today);
        assert_eq!(start, date(2026, 4, 20));
    }
}
