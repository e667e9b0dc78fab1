use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    Extension, Json,
};
use uuid::Uuid;

use crate::auth::middleware::AuthUser;
use crate::dto::{DeleteResponse, ReportResponse};
use crate::error::{AppError, AppResult};
use crate::handlers::ai::extract_summary;
use crate::models::journal::JournalEntry;
use crate::models::mood::MoodEntry;
use crate::models::report::AiReport;
use crate::pdf;
use crate::AppState;

pub async fn list_reports(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<Vec<ReportResponse>>> {
    let reports = sqlx::query_as::<_, AiReport>(
        "SELECT * FROM ai_reports WHERE user_id = $1 ORDER BY created_at DESC",
    )
    .bind(auth_user.id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(reports.into_iter().map(to_response).collect()))
}

pub async fn list_reports_by_type(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(report_type): Path<String>,
) -> AppResult<Json<Vec<ReportResponse>>> {
    let reports = sqlx::query_as::<_, AiReport>(
        r#"
        SELECT * FROM ai_reports
        WHERE user_id = $1 AND report_type = $2
        ORDER BY created_at DESC
        "#,
    )
    .bind(auth_user.id)
    .bind(report_type.to_uppercase())
    .fetch_all(&state.db)
    .await?;

    Ok(Json(reports.into_iter().map(to_response).collect()))
}

pub async fn get_report(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(report_id): Path<Uuid>,
) -> AppResult<Json<ReportResponse>> {
    let report = fetch_owned_report(&state, auth_user.id, report_id).await?;
    Ok(Json(to_response(report)))
}

/// Render the report as a PDF attachment, with up to 3 of the user's most
/// recent mood/journal entries as context tables.
pub async fn download_report_pdf(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(report_id): Path<Uuid>,
) -> AppResult<Response> {
    let report = fetch_owned_report(&state, auth_user.id, report_id).await?;

    let recent_moods = sqlx::query_as::<_, MoodEntry>(
        "SELECT * FROM mood_entries WHERE user_id = $1 ORDER BY timestamp DESC LIMIT 3",
    )
    .bind(auth_user.id)
    .fetch_all(&state.db)
    .await?;

    let recent_journals = sqlx::query_as::<_, JournalEntry>(
        "SELECT * FROM journal_entries WHERE user_id = $1 ORDER BY created_at DESC LIMIT 3",
    )
    .bind(auth_user.id)
    .fetch_all(&state.db)
    .await?;

    let bytes = pdf::render_report(&report, &recent_moods, &recent_journals).map_err(|e| {
        tracing::error!(report_id = %report_id, error = %e, "PDF generation failed");
        AppError::ServiceUnavailable("Report PDF generation failed".into())
    })?;

    tracing::info!(report_id = %report_id, bytes = bytes.len(), "Report PDF rendered");

    let filename = pdf_filename(&report);
    let headers = [
        (header::CONTENT_TYPE, "application/pdf".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", filename),
        ),
    ];

    Ok((headers, bytes).into_response())
}

pub async fn delete_report(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(report_id): Path<Uuid>,
) -> AppResult<Json<DeleteResponse>> {
    let result = sqlx::query("DELETE FROM ai_reports WHERE id = $1 AND user_id = $2")
        .bind(report_id)
        .bind(auth_user.id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Report not found".into()));
    }

    tracing::info!(report_id = %report_id, user_id = %auth_user.id, "Deleted report");

    Ok(Json(DeleteResponse {
        deleted: true,
        id: report_id,
    }))
}

async fn fetch_owned_report(
    state: &AppState,
    user_id: Uuid,
    report_id: Uuid,
) -> AppResult<AiReport> {
    sqlx::query_as::<_, AiReport>("SELECT * FROM ai_reports WHERE id = $1 AND user_id = $2")
        .bind(report_id)
        .bind(user_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or(AppError::NotFound("Report not found".into()))
}

fn to_response(report: AiReport) -> ReportResponse {
    let summary = extract_summary(&report.content);
    let is_mock_response = report
        .model_used
        .as_deref()
        .map(|m| m.contains("mock"))
        .unwrap_or(false);

    ReportResponse {
        id: report.id,
        report_type: report.report_type,
        content: report.content,
        summary,
        tokens_used: report.tokens_used,
        model_used: report.model_used,
        is_mock_response,
        created_at: report.created_at,
    }
}

/// e.g. "wellspring-weekly-summary-2026-08-07-report-<id>.pdf"
fn pdf_filename(report: &AiReport) -> String {
    format!(
        "wellspring-{}-{}-report-{}.pdf",
        report.report_type.to_lowercase().replace('_', "-"),
        report.created_at.format("%Y-%m-%d"),
        report.id
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono::Utc;

    #[test]
    fn test_pdf_filename_format() {
        let report = AiReport {
            id: Uuid::nil(),
            user_id: Uuid::new_v4(),
            report_type: "WEEKLY_SUMMARY".into(),
            content: "content".into(),
            metadata: None,
            prompt_used: None,
            model_used: Some("mock-model".into()),
            tokens_used: 0,
            created_at: Utc.with_ymd_and_hms(2026, 8, 7, 10, 0, 0).unwrap(),
        };

        assert_eq!(
            pdf_filename(&report),
            format!("wellspring-weekly-summary-2026-08-07-report-{}.pdf", Uuid::nil())
        );
    }

    #[test]
    fn test_to_response_flags_mock_models() {
        let report = AiReport {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            report_type: "MOOD_ANALYSIS".into(),
            content: "First paragraph.\n\nSecond paragraph.".into(),
            metadata: None,
            prompt_used: None,
            model_used: Some("mock-model".into()),
            tokens_used: 250,
            created_at: Utc::now(),
        };

        let resp = to_response(report);
        assert!(resp.is_mock_response);
        assert_eq!(resp.summary, "First paragraph.");
    }
}
