//! AI orchestration: builds prompt context from the user's recent mood and
//! journal data, delegates to the chat-completion client, and parses the
//! structured reply.

use axum::{extract::State, Extension, Json};
use chrono::{Duration, Utc};
use uuid::Uuid;
use validator::Validate;

use crate::ai::client::ChatMessage;
use crate::auth::middleware::AuthUser;
use crate::dto::{ChatMetadata, ChatRequest, ChatResponse, GenerateReportRequest, ReportResponse};
use crate::error::{AppError, AppResult};
use crate::models::journal::JournalEntry;
use crate::models::mood::MoodEntry;
use crate::models::report::AiReport;
use crate::AppState;

const CHAT_SYSTEM_PROMPT: &str = "You are a supportive mental wellness assistant. \
You can discuss any topic the user brings up, and for mental health questions you are \
empathetic and encouraging. Always respond in valid JSON with these fields: \
{ \"reply\": \"your helpful response\", \
\"summary\": \"brief summary (optional, can be empty)\", \
\"suggestions\": [\"helpful tip 1\", \"tip 2\"] }.";

const REPORT_SYSTEM_PROMPT: &str = "You are a compassionate mental wellness assistant. \
Generate detailed, actionable reports based on user data.";

/// How far back the chat context looks.
const CONTEXT_WINDOW_DAYS: i64 = 7;

pub async fn chat(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<ChatRequest>,
) -> AppResult<Json<ChatResponse>> {
    body.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let started = std::time::Instant::now();
    let context_size = body.context_size.unwrap_or(5);

    let now = Utc::now();
    let window_start = now - Duration::days(CONTEXT_WINDOW_DAYS);

    let moods = sqlx::query_as::<_, MoodEntry>(
        r#"
        SELECT * FROM mood_entries
        WHERE user_id = $1 AND timestamp BETWEEN $2 AND $3
        ORDER BY timestamp DESC
        LIMIT $4
        "#,
    )
    .bind(auth_user.id)
    .bind(window_start)
    .bind(now)
    .bind(context_size)
    .fetch_all(&state.db)
    .await?;

    let journals = sqlx::query_as::<_, JournalEntry>(
        r#"
        SELECT * FROM journal_entries
        WHERE user_id = $1 AND created_at > $2
        ORDER BY created_at DESC
        LIMIT $3
        "#,
    )
    .bind(auth_user.id)
    .bind(window_start)
    .bind(context_size.min(3))
    .fetch_all(&state.db)
    .await?;

    let context = build_context(&moods, &journals);
    let user_prompt = format!(
        "{}\n## User's Message:\n{}\n\nPlease provide a supportive response in JSON format.",
        context, body.message
    );

    let messages = [
        ChatMessage::system(CHAT_SYSTEM_PROMPT),
        ChatMessage::user(user_prompt),
    ];

    let completion = state
        .ai
        .complete(&messages, state.ai.max_tokens)
        .await
        .map_err(|e| AppError::ServiceUnavailable(e.to_string()))?;

    let (reply, summary, suggestions) = parse_chat_content(completion.text());

    let response_time_ms = started.elapsed().as_millis();
    tracing::info!(
        user_id = %auth_user.id,
        tokens = completion.total_tokens(),
        response_time_ms = response_time_ms as u64,
        "Chat reply generated"
    );

    Ok(Json(ChatResponse {
        reply,
        summary,
        suggestions,
        metadata: ChatMetadata {
            model: completion.model.clone(),
            tokens_used: completion.total_tokens(),
            is_mock_response: state.ai.mock_mode,
            response_time_ms,
        },
    }))
}

pub async fn generate_report(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<GenerateReportRequest>,
) -> AppResult<Json<ReportResponse>> {
    body.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let days = body.days_to_include.unwrap_or(7);
    let report_type = body.report_type.to_uppercase();

    let now = Utc::now();
    let window_start = now - Duration::days(days);

    let moods = sqlx::query_as::<_, MoodEntry>(
        r#"
        SELECT * FROM mood_entries
        WHERE user_id = $1 AND timestamp BETWEEN $2 AND $3
        ORDER BY timestamp DESC
        "#,
    )
    .bind(auth_user.id)
    .bind(window_start)
    .bind(now)
    .fetch_all(&state.db)
    .await?;

    let journals = sqlx::query_as::<_, JournalEntry>(
        r#"
        SELECT * FROM journal_entries
        WHERE user_id = $1 AND created_at > $2
        ORDER BY created_at DESC
        LIMIT 10
        "#,
    )
    .bind(auth_user.id)
    .bind(window_start)
    .fetch_all(&state.db)
    .await?;

    let prompt = build_report_prompt(&report_type, &moods, &journals, days);

    let messages = [
        ChatMessage::system(REPORT_SYSTEM_PROMPT),
        ChatMessage::user(prompt.clone()),
    ];

    // Reports get double the usual token budget
    let completion = state
        .ai
        .complete(&messages, state.ai.max_tokens * 2)
        .await
        .map_err(|e| AppError::ServiceUnavailable(e.to_string()))?;

    let content = completion.text().to_string();

    let report = sqlx::query_as::<_, AiReport>(
        r#"
        INSERT INTO ai_reports (id, user_id, report_type, content, metadata, prompt_used, model_used, tokens_used)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(auth_user.id)
    .bind(&report_type)
    .bind(&content)
    .bind(format!(r#"{{"days": {}}}"#, days))
    .bind(truncate_chars(&prompt, 500))
    .bind(&completion.model)
    .bind(completion.total_tokens())
    .fetch_one(&state.db)
    .await?;

    tracing::info!(
        report_id = %report.id,
        report_type = %report.report_type,
        user_id = %auth_user.id,
        "AI report generated"
    );

    let summary = extract_summary(&report.content);
    Ok(Json(ReportResponse {
        id: report.id,
        report_type: report.report_type,
        content: report.content,
        summary,
        tokens_used: report.tokens_used,
        model_used: report.model_used,
        is_mock_response: state.ai.mock_mode,
        created_at: report.created_at,
    }))
}

/// Format the user's recent activity as a markdown block for the prompt.
fn build_context(moods: &[MoodEntry], journals: &[JournalEntry]) -> String {
    let mut context = String::from("## User's Recent Activity\n\n");

    if moods.is_empty() {
        context.push_str("### Recent Mood Entries:\nNo recent mood entries.\n\n");
    } else {
        context.push_str("### Recent Mood Entries:\n");
        for mood in moods {
            let notes = mood
                .notes
                .as_deref()
                .map(|n| format!("\"{}\"", n))
                .unwrap_or_default();
            context.push_str(&format!(
                "- {}: Mood {}/10, Energy {}/10, Stress {}/10. {}\n",
                mood.timestamp.format("%b %d"),
                mood.mood_score,
                mood.energy_level.unwrap_or(0),
                mood.stress_level.unwrap_or(0),
                notes
            ));
        }
        context.push('\n');
    }

    if journals.is_empty() {
        context.push_str("### Recent Journal Entries:\nNo recent journal entries.\n\n");
    } else {
        context.push_str("### Recent Journal Entries:\n");
        for journal in journals {
            context.push_str(&format!(
                "- {}: \"{}\" - {}\n",
                journal.created_at.format("%b %d"),
                journal.title,
                truncate_chars(&journal.content, 150)
            ));
        }
        context.push('\n');
    }

    context
}

/// Build the descriptive report prompt, embedding computed mood statistics
/// and entry excerpts.
fn build_report_prompt(
    report_type: &str,
    moods: &[MoodEntry],
    journals: &[JournalEntry],
    days: i64,
) -> String {
    let mut prompt = format!("Generate a {} report for the past {} days.\n\n", report_type, days);

    if !moods.is_empty() {
        let avg: f64 =
            moods.iter().map(|m| f64::from(m.mood_score)).sum::<f64>() / moods.len() as f64;
        let highest = moods.iter().map(|m| m.mood_score).max().unwrap_or(0);
        let lowest = moods.iter().map(|m| m.mood_score).min().unwrap_or(0);

        prompt.push_str(&format!(
            "## Mood Statistics:\n- Average mood: {:.1}/10\n- Highest: {}/10\n- Lowest: {}/10\n- Total entries: {}\n\n",
            avg,
            highest,
            lowest,
            moods.len()
        ));

        prompt.push_str("## Mood Entries:\n");
        for mood in moods {
            prompt.push_str(&format!(
                "- {}: {}/10 - {}\n",
                mood.timestamp.format("%b %d"),
                mood.mood_score,
                mood.notes.as_deref().unwrap_or("")
            ));
        }
        prompt.push('\n');
    }

    if !journals.is_empty() {
        prompt.push_str("## Journal Entries:\n");
        for journal in journals {
            prompt.push_str(&format!(
                "- {}: \"{}\" - {}\n",
                journal.created_at.format("%b %d"),
                journal.title,
                truncate_chars(&journal.content, 200)
            ));
        }
        prompt.push('\n');
    }

    prompt.push_str(
        "Please provide:\n\
         1. Overall summary of the user's mental wellness trend\n\
         2. Key patterns identified\n\
         3. Positive highlights to celebrate\n\
         4. Areas for improvement\n\
         5. Specific, actionable recommendations",
    );

    prompt
}

/// Parse the model's structured JSON reply into (reply, summary, suggestions).
/// Code fences are stripped first; anything that still fails to parse falls
/// back to the raw text as the reply with empty summary and suggestions.
fn parse_chat_content(content: &str) -> (String, String, Vec<String>) {
    let stripped = strip_json_fences(content);

    match serde_json::from_str::<serde_json::Value>(stripped) {
        Ok(value) => {
            let reply = value["reply"]
                .as_str()
                .map(|s| s.to_string())
                .unwrap_or_else(|| content.to_string());
            let summary = value["summary"].as_str().unwrap_or("").to_string();
            let suggestions = value["suggestions"]
                .as_array()
                .map(|arr| {
                    arr.iter()
                        .filter_map(|s| s.as_str().map(|s| s.to_string()))
                        .collect()
                })
                .unwrap_or_default();
            (reply, summary, suggestions)
        }
        Err(e) => {
            tracing::warn!(error = %e, "AI reply was not valid JSON, using raw content");
            (content.to_string(), String::new(), Vec::new())
        }
    }
}

/// Strip ```json ... ``` or ``` ... ``` code fences from model output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or_else(|| stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or_else(|| stripped.trim_start())
    } else {
        text
    }
}

/// Derive the one-paragraph summary shown alongside a report: the first
/// paragraph with markdown headers removed, capped at 200 characters.
pub fn extract_summary(content: &str) -> String {
    if content.is_empty() {
        return String::new();
    }

    let first_para = content.split("\n\n").next().unwrap_or(content).trim();
    let first_para = first_para.trim_start_matches('#').trim_start();

    truncate_chars(first_para, 200)
}

fn truncate_chars(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        let head: String = s.chars().take(max_chars).collect();
        format!("{}...", head)
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn mood(day: u32, score: i32, notes: Option<&str>) -> MoodEntry {
        MoodEntry {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            mood_score: score,
            notes: notes.map(|n| n.to_string()),
            activities: None,
            energy_level: Some(6),
            stress_level: None,
            timestamp: Utc.with_ymd_and_hms(2026, 4, day, 9, 0, 0).unwrap(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn journal(title: &str, content: &str) -> JournalEntry {
        JournalEntry {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: title.into(),
            content: content.into(),
            tags: None,
            is_favorite: false,
            is_private: true,
            created_at: Utc.with_ymd_and_hms(2026, 4, 2, 21, 0, 0).unwrap(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_parse_chat_content_structured() {
        let content = r#"{"reply": "Take a breath.", "summary": "calming", "suggestions": ["walk", "journal"]}"#;
        let (reply, summary, suggestions) = parse_chat_content(content);
        assert_eq!(reply, "Take a breath.");
        assert_eq!(summary, "calming");
        assert_eq!(suggestions, vec!["walk", "journal"]);
    }

    #[test]
    fn test_parse_chat_content_with_code_fence() {
        let content = "```json\n{\"reply\": \"Hi\", \"summary\": \"\", \"suggestions\": []}\n```";
        let (reply, summary, suggestions) = parse_chat_content(content);
        assert_eq!(reply, "Hi");
        assert_eq!(summary, "");
        assert!(suggestions.is_empty());
    }

    #[test]
    fn test_parse_chat_content_raw_text_fallback() {
        let content = "Just plain prose, no JSON here.";
        let (reply, summary, suggestions) = parse_chat_content(content);
        assert_eq!(reply, content);
        assert!(summary.is_empty());
        assert!(suggestions.is_empty());
    }

    #[test]
    fn test_parse_chat_content_json_missing_reply_falls_back_to_raw() {
        let content = r#"{"summary": "only a summary"}"#;
        let (reply, summary, _) = parse_chat_content(content);
        assert_eq!(reply, content);
        assert_eq!(summary, "only a summary");
    }

    #[test]
    fn test_build_context_includes_entries() {
        let moods = vec![mood(1, 7, Some("slept well"))];
        let journals = vec![journal("Morning pages", "Wrote about the week ahead")];

        let context = build_context(&moods, &journals);
        assert!(context.contains("### Recent Mood Entries:"));
        assert!(context.contains("Mood 7/10"));
        assert!(context.contains("\"slept well\""));
        assert!(context.contains("\"Morning pages\""));
    }

    #[test]
    fn test_build_context_empty_sections() {
        let context = build_context(&[], &[]);
        assert!(context.contains("No recent mood entries."));
        assert!(context.contains("No recent journal entries."));
    }

    #[test]
    fn test_report_prompt_embeds_statistics() {
        let moods = vec![mood(1, 4, None), mood(2, 8, None)];
        let prompt = build_report_prompt("WEEKLY_SUMMARY", &moods, &[], 7);

        assert!(prompt.starts_with("Generate a WEEKLY_SUMMARY report for the past 7 days."));
        assert!(prompt.contains("- Average mood: 6.0/10"));
        assert!(prompt.contains("- Highest: 8/10"));
        assert!(prompt.contains("- Lowest: 4/10"));
        assert!(prompt.contains("- Total entries: 2"));
    }

    #[test]
    fn test_report_prompt_without_data_still_asks_for_sections() {
        let prompt = build_report_prompt("MOOD_ANALYSIS", &[], &[], 30);
        assert!(!prompt.contains("## Mood Statistics:"));
        assert!(prompt.contains("Please provide:"));
    }

    #[test]
    fn test_extract_summary_first_paragraph() {
        let content = "## Weekly Overview\n\nThe rest of the report.";
        assert_eq!(extract_summary(content), "Weekly Overview");
    }

    #[test]
    fn test_extract_summary_caps_at_200_chars() {
        let content = "a".repeat(300);
        let summary = extract_summary(&content);
        assert_eq!(summary.chars().count(), 203);
        assert!(summary.ends_with("..."));
    }

    #[test]
    fn test_extract_summary_empty() {
        assert_eq!(extract_summary(""), "");
    }
}
