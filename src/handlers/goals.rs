use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::{NaiveDate, Utc};
use uuid::Uuid;
use validator::Validate;

use crate::auth::middleware::AuthUser;
use crate::dto::{CreateGoalRequest, DeleteResponse, GoalCountResponse, GoalResponse, UpdateGoalStatusRequest};
use crate::error::{AppError, AppResult};
use crate::models::goal::Goal;
use crate::AppState;

pub async fn create_goal(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<CreateGoalRequest>,
) -> AppResult<Json<GoalResponse>> {
    body.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let today = Utc::now().date_naive();

    let goal = sqlx::query_as::<_, Goal>(
        r#"
        INSERT INTO goals (id, user_id, title, description, goal_type, target_count, period, start_date)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(auth_user.id)
    .bind(&body.title)
    .bind(&body.description)
    .bind(&body.goal_type)
    .bind(body.target_count)
    .bind(&body.period)
    .bind(today)
    .fetch_one(&state.db)
    .await?;

    tracing::info!(goal_id = %goal.id, user_id = %auth_user.id, "Created goal");

    Ok(Json(GoalResponse::from_goal(goal, Vec::new(), today)))
}

pub async fn list_goals(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<Vec<GoalResponse>>> {
    let goals = sqlx::query_as::<_, Goal>(
        "SELECT * FROM goals WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(auth_user.id)
    .fetch_all(&state.db)
    .await?;

    to_responses(&state, goals).await
}

pub async fn list_active_goals(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<Vec<GoalResponse>>> {
    let goals = sqlx::query_as::<_, Goal>(
        "SELECT * FROM goals WHERE user_id = $1 AND status = 'active' ORDER BY created_at DESC",
    )
    .bind(auth_user.id)
    .fetch_all(&state.db)
    .await?;

    to_responses(&state, goals).await
}

pub async fn count_active_goals(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<GoalCountResponse>> {
    let active_goals = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM goals WHERE user_id = $1 AND status = 'active'",
    )
    .bind(auth_user.id)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(GoalCountResponse { active_goals }))
}

/// Goals with a live streak, best streak first.
pub async fn list_goals_with_streak(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<Vec<GoalResponse>>> {
    let goals = sqlx::query_as::<_, Goal>(
        r#"
        SELECT * FROM goals
        WHERE user_id = $1 AND current_streak > 0
        ORDER BY current_streak DESC
        "#,
    )
    .bind(auth_user.id)
    .fetch_all(&state.db)
    .await?;

    to_responses(&state, goals).await
}

/// Record one completion for today. Same-day repeats are a no-op; the whole
/// read-increment-write runs inside a single transaction with a row lock so
/// concurrent calls cannot lose updates.
pub async fn record_progress(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(goal_id): Path<Uuid>,
) -> AppResult<Json<GoalResponse>> {
    let today = Utc::now().date_naive();

    let mut tx = state.db.begin().await?;

    let mut goal = sqlx::query_as::<_, Goal>("SELECT * FROM goals WHERE id = $1 FOR UPDATE")
        .bind(goal_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(AppError::NotFound("Goal not found".into()))?;

    if goal.user_id != auth_user.id {
        return Err(AppError::Forbidden);
    }

    if apply_progress(&mut goal, today) {
        sqlx::query(
            r#"
            INSERT INTO goal_completions (goal_id, completion_date)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(goal_id)
        .bind(today)
        .execute(&mut *tx)
        .await?;

        goal = sqlx::query_as::<_, Goal>(
            r#"
            UPDATE goals SET
                current_progress = $2,
                current_streak = $3,
                longest_streak = $4,
                last_completion_date = $5,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(goal_id)
        .bind(goal.current_progress)
        .bind(goal.current_streak)
        .bind(goal.longest_streak)
        .bind(goal.last_completion_date)
        .fetch_one(&mut *tx)
        .await?;

        tracing::info!(
            goal_id = %goal_id,
            progress = goal.current_progress,
            streak = goal.current_streak,
            "Recorded goal progress"
        );
    } else {
        tracing::info!(goal_id = %goal_id, "Goal already completed today");
    }

    tx.commit().await?;

    let completion_dates = fetch_completion_dates(&state, goal_id).await?;
    Ok(Json(GoalResponse::from_goal(goal, completion_dates, today)))
}

pub async fn update_goal_status(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(goal_id): Path<Uuid>,
    Json(body): Json<UpdateGoalStatusRequest>,
) -> AppResult<Json<GoalResponse>> {
    check_goal_ownership(&state, goal_id, auth_user.id).await?;

    // Any status is reachable from any status
    let goal = sqlx::query_as::<_, Goal>(
        r#"
        UPDATE goals SET status = $2, updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(goal_id)
    .bind(&body.status)
    .fetch_one(&state.db)
    .await?;

    tracing::info!(goal_id = %goal_id, status = ?goal.status, "Updated goal status");

    let completion_dates = fetch_completion_dates(&state, goal_id).await?;
    Ok(Json(GoalResponse::from_goal(
        goal,
        completion_dates,
        Utc::now().date_naive(),
    )))
}

pub async fn delete_goal(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(goal_id): Path<Uuid>,
) -> AppResult<Json<DeleteResponse>> {
    check_goal_ownership(&state, goal_id, auth_user.id).await?;

    // Completion dates cascade with the goal row
    sqlx::query("DELETE FROM goals WHERE id = $1")
        .bind(goal_id)
        .execute(&state.db)
        .await?;

    tracing::info!(goal_id = %goal_id, user_id = %auth_user.id, "Deleted goal");

    Ok(Json(DeleteResponse {
        deleted: true,
        id: goal_id,
    }))
}

/// Unknown goal → NotFound; a goal owned by someone else → Forbidden.
async fn check_goal_ownership(state: &AppState, goal_id: Uuid, user_id: Uuid) -> AppResult<()> {
    let owner = sqlx::query_scalar::<_, Uuid>("SELECT user_id FROM goals WHERE id = $1")
        .bind(goal_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or(AppError::NotFound("Goal not found".into()))?;

    if owner != user_id {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

async fn fetch_completion_dates(state: &AppState, goal_id: Uuid) -> AppResult<Vec<NaiveDate>> {
    let dates = sqlx::query_scalar::<_, NaiveDate>(
        "SELECT completion_date FROM goal_completions WHERE goal_id = $1 ORDER BY completion_date ASC",
    )
    .bind(goal_id)
    .fetch_all(&state.db)
    .await?;
    Ok(dates)
}

async fn to_responses(state: &AppState, goals: Vec<Goal>) -> AppResult<Json<Vec<GoalResponse>>> {
    let today = Utc::now().date_naive();
    let mut result = Vec::with_capacity(goals.len());
    for goal in goals {
        let completion_dates = fetch_completion_dates(state, goal.id).await?;
        result.push(GoalResponse::from_goal(goal, completion_dates, today));
    }
    Ok(Json(result))
}

/// Apply one day's completion to the goal counters.
///
/// Returns false when `today` was already recorded (idempotent repeat call).
/// The streak is evaluated against the previous completion date, captured
/// before it is overwritten: a gap of exactly one day extends the streak,
/// anything longer restarts it at 1. Streaks count consecutive calendar days
/// for every period kind; only the progress counter is period-scoped.
fn apply_progress(goal: &mut Goal, today: NaiveDate) -> bool {
    if goal.last_completion_date == Some(today) {
        return false;
    }

    let previous = goal.last_completion_date;
    goal.current_progress += 1;
    goal.last_completion_date = Some(today);

    let yesterday = today - chrono::Duration::days(1);
    goal.current_streak = match previous {
        None => 1,
        Some(d) if d == yesterday => goal.current_streak + 1,
        Some(_) => 1,
    };
    goal.longest_streak = goal.longest_streak.max(goal.current_streak);

    // Target reached: the progress counter restarts for the next period.
    // The streak is untouched by this reset.
    if goal.current_progress >= goal.target_count {
        goal.current_progress = 0;
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::goal::{GoalPeriod, GoalStatus, GoalType};
    use chrono::Duration;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn make_goal(target_count: i32) -> Goal {
        Goal {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: "Journal every day".into(),
            description: None,
            goal_type: GoalType::Journaling,
            target_count,
            period: GoalPeriod::Weekly,
            current_progress: 0,
            current_streak: 0,
            longest_streak: 0,
            start_date: date(2026, 3, 1),
            last_completion_date: None,
            status: GoalStatus::Active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_first_completion_starts_streak() {
        let mut goal = make_goal(5);
        let today = date(2026, 3, 10);

        assert!(apply_progress(&mut goal, today));
        assert_eq!(goal.current_progress, 1);
        assert_eq!(goal.current_streak, 1);
        assert_eq!(goal.longest_streak, 1);
        assert_eq!(goal.last_completion_date, Some(today));
    }

    #[test]
    fn test_same_day_repeat_is_noop() {
        let mut goal = make_goal(5);
        let today = date(2026, 3, 10);

        apply_progress(&mut goal, today);
        let before = (goal.current_progress, goal.current_streak, goal.longest_streak);

        assert!(!apply_progress(&mut goal, today));
        assert_eq!(
            (goal.current_progress, goal.current_streak, goal.longest_streak),
            before
        );
    }

    #[test]
    fn test_consecutive_day_extends_streak() {
        let mut goal = make_goal(5);
        let day1 = date(2026, 3, 10);

        apply_progress(&mut goal, day1);
        apply_progress(&mut goal, day1 + Duration::days(1));

        assert_eq!(goal.current_progress, 2);
        assert_eq!(goal.current_streak, 2);
        assert_eq!(goal.longest_streak, 2);
    }

    #[test]
    fn test_gap_of_two_days_resets_streak_to_one() {
        let mut goal = make_goal(10);
        apply_progress(&mut goal, date(2026, 3, 10));
        apply_progress(&mut goal, date(2026, 3, 11));
        apply_progress(&mut goal, date(2026, 3, 12));
        assert_eq!(goal.current_streak, 3);

        // Skip the 13th entirely
        apply_progress(&mut goal, date(2026, 3, 14));
        assert_eq!(goal.current_streak, 1);
        // Longest streak survives the break
        assert_eq!(goal.longest_streak, 3);
    }

    #[test]
    fn test_reaching_target_resets_progress_not_streak() {
        let mut goal = make_goal(3);
        apply_progress(&mut goal, date(2026, 3, 10));
        apply_progress(&mut goal, date(2026, 3, 11));
        assert_eq!(goal.current_progress, 2);

        apply_progress(&mut goal, date(2026, 3, 12));
        assert_eq!(goal.current_progress, 0);
        assert_eq!(goal.current_streak, 3);
        assert_eq!(goal.longest_streak, 3);
    }

    #[test]
    fn test_weekly_goal_three_day_scenario() {
        // create goal (target=3, weekly) → day 1, same day again, day 2, day 3
        let mut goal = make_goal(3);
        let day1 = date(2026, 6, 1);

        apply_progress(&mut goal, day1);
        assert_eq!((goal.current_progress, goal.current_streak), (1, 1));

        assert!(!apply_progress(&mut goal, day1));
        assert_eq!((goal.current_progress, goal.current_streak), (1, 1));

        apply_progress(&mut goal, day1 + Duration::days(1));
        assert_eq!((goal.current_progress, goal.current_streak), (2, 2));

        apply_progress(&mut goal, day1 + Duration::days(2));
        assert_eq!(goal.current_progress, 0); // hit target=3, counter restarts
        assert_eq!(goal.current_streak, 3);
        assert_eq!(goal.longest_streak, 3);
    }

    #[test]
    fn test_streak_never_exceeds_longest() {
        let mut goal = make_goal(100);
        let mut day = date(2026, 1, 1);

        // Mixed sequence: runs of consecutive days with gaps in between
        for gap in [1, 1, 1, 3, 1, 2, 1, 1, 1, 1, 5, 1] {
            apply_progress(&mut goal, day);
            assert!(goal.current_streak <= goal.longest_streak);
            day += Duration::days(gap);
        }
    }

    #[test]
    fn test_target_of_one_resets_every_completion() {
        let mut goal = make_goal(1);
        apply_progress(&mut goal, date(2026, 3, 10));
        assert_eq!(goal.current_progress, 0);
        apply_progress(&mut goal, date(2026, 3, 11));
        assert_eq!(goal.current_progress, 0);
        assert_eq!(goal.current_streak, 2);
    }
}
