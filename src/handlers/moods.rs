use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;
use validator::Validate;

use crate::auth::middleware::AuthUser;
use crate::dto::{
    AverageMoodResponse, CreateMoodRequest, DeleteResponse, MoodRangeQuery, MoodTrendsResponse,
    TrendsSummary,
};
use crate::error::{AppError, AppResult};
use crate::models::mood::MoodEntry;
use crate::AppState;

pub async fn create_mood_entry(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<CreateMoodRequest>,
) -> AppResult<Json<MoodEntry>> {
    body.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let timestamp = body.timestamp.unwrap_or_else(Utc::now);

    let entry = sqlx::query_as::<_, MoodEntry>(
        r#"
        INSERT INTO mood_entries (id, user_id, mood_score, notes, activities, energy_level, stress_level, timestamp)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(auth_user.id)
    .bind(body.mood_score)
    .bind(&body.notes)
    .bind(&body.activities)
    .bind(body.energy_level)
    .bind(body.stress_level)
    .bind(timestamp)
    .fetch_one(&state.db)
    .await?;

    tracing::info!(entry_id = %entry.id, user_id = %auth_user.id, "Created mood entry");

    Ok(Json(entry))
}

pub async fn list_mood_entries(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<Vec<MoodEntry>>> {
    let entries = sqlx::query_as::<_, MoodEntry>(
        "SELECT * FROM mood_entries WHERE user_id = $1 ORDER BY timestamp DESC",
    )
    .bind(auth_user.id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(entries))
}

pub async fn list_mood_entries_by_range(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<MoodRangeQuery>,
) -> AppResult<Json<Vec<MoodEntry>>> {
    let (start, end) = query.resolve(Utc::now().date_naive());

    let entries = fetch_range(&state, auth_user.id, start, end).await?;
    Ok(Json(entries))
}

pub async fn get_average_mood(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<MoodRangeQuery>,
) -> AppResult<Json<AverageMoodResponse>> {
    let (start, end) = query.resolve(Utc::now().date_naive());

    // NULL average (no entries) reads as 0.0, not an error
    let average_mood = sqlx::query_scalar::<_, Option<f64>>(
        r#"
        SELECT AVG(mood_score)::float8 FROM mood_entries
        WHERE user_id = $1 AND timestamp BETWEEN $2 AND $3
        "#,
    )
    .bind(auth_user.id)
    .bind(range_start(start))
    .bind(range_end(end))
    .fetch_one(&state.db)
    .await?
    .unwrap_or(0.0);

    Ok(Json(AverageMoodResponse { average_mood }))
}

pub async fn get_mood_trends(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<MoodRangeQuery>,
) -> AppResult<Json<MoodTrendsResponse>> {
    let (start, end) = query.resolve(Utc::now().date_naive());

    let entries = fetch_range(&state, auth_user.id, start, end).await?;
    Ok(Json(build_trends(entries, start, end)))
}

pub async fn delete_mood_entry(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(entry_id): Path<Uuid>,
) -> AppResult<Json<DeleteResponse>> {
    let result = sqlx::query("DELETE FROM mood_entries WHERE id = $1 AND user_id = $2")
        .bind(entry_id)
        .bind(auth_user.id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Mood entry not found".into()));
    }

    tracing::info!(entry_id = %entry_id, user_id = %auth_user.id, "Deleted mood entry");

    Ok(Json(DeleteResponse {
        deleted: true,
        id: entry_id,
    }))
}

async fn fetch_range(
    state: &AppState,
    user_id: Uuid,
    start: NaiveDate,
    end: NaiveDate,
) -> AppResult<Vec<MoodEntry>> {
    let entries = sqlx::query_as::<_, MoodEntry>(
        r#"
        SELECT * FROM mood_entries
        WHERE user_id = $1 AND timestamp BETWEEN $2 AND $3
        ORDER BY timestamp DESC
        "#,
    )
    .bind(user_id)
    .bind(range_start(start))
    .bind(range_end(end))
    .fetch_all(&state.db)
    .await?;
    Ok(entries)
}

/// Inclusive calendar range expressed as timestamps.
fn range_start(date: NaiveDate) -> DateTime<Utc> {
    date.and_hms_opt(0, 0, 0)
        .expect("midnight is a valid time")
        .and_utc()
}

fn range_end(date: NaiveDate) -> DateTime<Utc> {
    date.and_hms_opt(23, 59, 59)
        .expect("end of day is a valid time")
        .and_utc()
}

/// Transform mood entries into chart-ready parallel arrays plus summary
/// statistics. Entries are re-sorted chronologically regardless of storage
/// order. Missing energy/stress values render as 0 in the series but are
/// excluded from the corresponding averages entirely.
fn build_trends(
    mut entries: Vec<MoodEntry>,
    start_date: NaiveDate,
    end_date: NaiveDate,
) -> MoodTrendsResponse {
    entries.sort_by_key(|e| e.timestamp);

    let mut dates = Vec::with_capacity(entries.len());
    let mut mood_scores = Vec::with_capacity(entries.len());
    let mut energy_levels = Vec::with_capacity(entries.len());
    let mut stress_levels = Vec::with_capacity(entries.len());

    for entry in &entries {
        dates.push(entry.timestamp.format("%b %d").to_string());
        mood_scores.push(entry.mood_score);
        energy_levels.push(entry.energy_level.unwrap_or(0));
        stress_levels.push(entry.stress_level.unwrap_or(0));
    }

    let summary = summarize(&entries, start_date, end_date);

    MoodTrendsResponse {
        dates,
        mood_scores,
        energy_levels,
        stress_levels,
        summary,
    }
}

fn summarize(entries: &[MoodEntry], start_date: NaiveDate, end_date: NaiveDate) -> TrendsSummary {
    if entries.is_empty() {
        return TrendsSummary {
            average_mood: 0.0,
            average_energy: 0.0,
            average_stress: 0.0,
            total_entries: 0,
            highest_mood: 0,
            lowest_mood: 0,
            start_date,
            end_date,
        };
    }

    let average_mood = mean(entries.iter().map(|e| e.mood_score));
    let average_energy = mean(entries.iter().filter_map(|e| e.energy_level));
    let average_stress = mean(entries.iter().filter_map(|e| e.stress_level));

    let highest_mood = entries.iter().map(|e| e.mood_score).max().unwrap_or(0);
    let lowest_mood = entries.iter().map(|e| e.mood_score).min().unwrap_or(0);

    TrendsSummary {
        average_mood: round2(average_mood),
        average_energy: round2(average_energy),
        average_stress: round2(average_stress),
        total_entries: entries.len(),
        highest_mood,
        lowest_mood,
        start_date,
        end_date,
    }
}

/// Mean of the yielded values; 0.0 for an empty iterator.
fn mean(values: impl Iterator<Item = i32>) -> f64 {
    let (sum, count) = values.fold((0i64, 0i64), |(s, c), v| (s + i64::from(v), c + 1));
    if count == 0 {
        0.0
    } else {
        sum as f64 / count as f64
    }
}

/// Round half-up to 2 decimal places.
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn entry(
        day: u32,
        mood: i32,
        energy: Option<i32>,
        stress: Option<i32>,
    ) -> MoodEntry {
        MoodEntry {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            mood_score: mood,
            notes: None,
            activities: None,
            energy_level: energy,
            stress_level: stress,
            timestamp: Utc.with_ymd_and_hms(2026, 10, day, 12, 0, 0).unwrap(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_trends_with_data() {
        let entries = vec![
            entry(1, 7, Some(8), Some(3)),
            entry(5, 8, Some(9), Some(2)),
            entry(10, 6, Some(7), Some(4)),
            entry(15, 9, Some(9), Some(1)),
            entry(20, 7, Some(8), Some(3)),
        ];

        let trends = build_trends(entries, date(2026, 10, 1), date(2026, 10, 31));

        assert_eq!(trends.dates.len(), 5);
        assert_eq!(trends.dates[0], "Oct 01");
        assert_eq!(trends.dates[1], "Oct 05");
        assert_eq!(trends.mood_scores, vec![7, 8, 6, 9, 7]);

        let s = &trends.summary;
        assert_eq!(s.total_entries, 5);
        assert_eq!(s.average_mood, 7.4);
        assert_eq!(s.average_energy, 8.2);
        assert_eq!(s.average_stress, 2.6);
        assert_eq!(s.highest_mood, 9);
        assert_eq!(s.lowest_mood, 6);
        assert_eq!(s.start_date, date(2026, 10, 1));
        assert_eq!(s.end_date, date(2026, 10, 31));
    }

    #[test]
    fn test_trends_empty_range() {
        let trends = build_trends(Vec::new(), date(2026, 10, 1), date(2026, 10, 31));

        assert!(trends.dates.is_empty());
        assert!(trends.mood_scores.is_empty());
        assert!(trends.energy_levels.is_empty());
        assert!(trends.stress_levels.is_empty());

        let s = &trends.summary;
        assert_eq!(s.total_entries, 0);
        assert_eq!(s.average_mood, 0.0);
        assert_eq!(s.average_energy, 0.0);
        assert_eq!(s.average_stress, 0.0);
        assert_eq!(s.highest_mood, 0);
        assert_eq!(s.lowest_mood, 0);
    }

    #[test]
    fn test_trends_sorts_chronologically_regardless_of_input_order() {
        let entries = vec![
            entry(20, 5, None, None),
            entry(3, 8, None, None),
            entry(11, 6, None, None),
        ];

        let trends = build_trends(entries, date(2026, 10, 1), date(2026, 10, 31));

        assert_eq!(trends.dates, vec!["Oct 03", "Oct 11", "Oct 20"]);
        assert_eq!(trends.mood_scores, vec![8, 6, 5]);
    }

    #[test]
    fn test_null_levels_render_as_zero_but_skip_averages() {
        let entries = vec![entry(1, 5, None, None), entry(2, 7, Some(9), Some(4))];

        let trends = build_trends(entries, date(2026, 10, 1), date(2026, 10, 2));

        assert_eq!(trends.energy_levels, vec![0, 9]);
        assert_eq!(trends.stress_levels, vec![0, 4]);
        // null entries are excluded from the denominator, not treated as 0
        assert_eq!(trends.summary.average_energy, 9.0);
        assert_eq!(trends.summary.average_stress, 4.0);
    }

    #[test]
    fn test_all_null_levels_average_to_zero() {
        let entries = vec![entry(1, 5, None, None), entry(2, 7, None, None)];
        let trends = build_trends(entries, date(2026, 10, 1), date(2026, 10, 2));
        assert_eq!(trends.summary.average_energy, 0.0);
        assert_eq!(trends.summary.average_stress, 0.0);
    }

    #[test]
    fn test_average_rounds_half_up_to_two_decimals() {
        // (7 + 8 + 8) / 3 = 7.666... → 7.67
        let entries = vec![
            entry(1, 7, None, None),
            entry(2, 8, None, None),
            entry(3, 8, None, None),
        ];
        let trends = build_trends(entries, date(2026, 10, 1), date(2026, 10, 3));
        assert_eq!(trends.summary.average_mood, 7.67);

        // (1 + 2) / 2 = 1.5 stays exact
        let entries = vec![entry(4, 1, None, None), entry(5, 2, None, None)];
        let trends = build_trends(entries, date(2026, 10, 4), date(2026, 10, 5));
        assert_eq!(trends.summary.average_mood, 1.5);
    }
}
