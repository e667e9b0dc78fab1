//! Renders a persisted [`AiReport`] into a downloadable PDF document.
//!
//! Layout: title header, report-type subtitle, generation metadata, a table
//! of the user's most recent mood entries, recent journal excerpts, the AI
//! report content, and a disclaimer footer. Uses PDF builtin fonts only, so
//! no font files ship with the binary.

use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference};

use crate::models::journal::JournalEntry;
use crate::models::mood::MoodEntry;
use crate::models::report::AiReport;

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 20.0;

/// Characters per line at body size before wrapping kicks in.
const WRAP_COLS: usize = 95;

#[derive(Debug, thiserror::Error)]
pub enum PdfError {
    #[error("Report PDF generation failed")]
    Render(#[from] printpdf::Error),
}

/// Render a report plus up to 3 recent mood/journal entries for context.
/// The returned buffer starts with the `%PDF` signature.
pub fn render_report(
    report: &AiReport,
    recent_moods: &[MoodEntry],
    recent_journals: &[JournalEntry],
) -> Result<Vec<u8>, PdfError> {
    let (doc, page, layer) = PdfDocument::new(
        "Wellspring Wellness Report",
        Mm(PAGE_WIDTH),
        Mm(PAGE_HEIGHT),
        "content",
    );
    let regular = doc.add_builtin_font(BuiltinFont::Helvetica)?;
    let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold)?;

    {
        let mut w = PageWriter {
            doc: &doc,
            layer: doc.get_page(page).get_layer(layer),
            regular,
            bold,
            y: PAGE_HEIGHT - MARGIN,
        };

        // Header
        w.line("Wellspring Wellness Report", 20.0, true);
        w.line(&format!("{} REPORT", report.report_type.to_uppercase()), 11.0, false);
        w.gap(4.0);
        w.line(
            &format!(
                "Generated on: {}",
                report.created_at.format("%d %b %Y, %H:%M UTC")
            ),
            9.0,
            false,
        );
        w.line(&format!("User ID: {}", report.user_id), 9.0, false);
        w.gap(6.0);

        if !recent_moods.is_empty() {
            w.mood_table(recent_moods);
            w.gap(6.0);
        }

        if !recent_journals.is_empty() {
            w.journal_section(recent_journals);
            w.gap(6.0);
        }

        w.line("AI Insights & Analysis", 13.0, true);
        w.gap(2.0);
        w.paragraph(&report.content, 10.0);
        w.gap(8.0);

        w.paragraph(
            "This report was generated automatically and is for informational purposes only. \
             It does not constitute medical advice. Please consult a healthcare professional \
             for medical concerns.",
            8.0,
        );
    }

    Ok(doc.save_to_bytes()?)
}

/// Mood score to a short label for the context table.
fn mood_label(score: i32) -> &'static str {
    match score {
        8.. => "Very Happy",
        6..=7 => "Happy",
        4..=5 => "Okay",
        2..=3 => "Sad",
        _ => "Very Sad",
    }
}

struct PageWriter<'a> {
    doc: &'a PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    y: f32,
}

impl PageWriter<'_> {
    /// Move to a fresh page when fewer than `needed` mm remain.
    fn ensure_space(&mut self, needed: f32) {
        if self.y - needed < MARGIN {
            let (page, layer) = self
                .doc
                .add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "content");
            self.layer = self.doc.get_page(page).get_layer(layer);
            self.y = PAGE_HEIGHT - MARGIN;
        }
    }

    fn line(&mut self, text: &str, size: f32, bold: bool) {
        let leading = size * 0.5;
        self.ensure_space(leading);
        let font = if bold { &self.bold } else { &self.regular };
        self.layer
            .use_text(text, size, Mm(MARGIN), Mm(self.y), font);
        self.y -= leading;
    }

    /// One table row: (x offset, text) cells sharing a baseline.
    fn row(&mut self, cells: &[(f32, &str)], size: f32, bold: bool) {
        let leading = size * 0.6;
        self.ensure_space(leading);
        let font = if bold { &self.bold } else { &self.regular };
        for (x, text) in cells {
            self.layer
                .use_text(*text, size, Mm(MARGIN + x), Mm(self.y), font);
        }
        self.y -= leading;
    }

    fn gap(&mut self, mm: f32) {
        self.y -= mm;
    }

    /// Word-wrapped multi-line text; respects embedded newlines.
    fn paragraph(&mut self, text: &str, size: f32) {
        for raw_line in text.lines() {
            if raw_line.trim().is_empty() {
                self.gap(size * 0.5);
                continue;
            }
            for line in wrap(raw_line, WRAP_COLS) {
                self.line(&line, size, false);
            }
        }
    }

    fn mood_table(&mut self, moods: &[MoodEntry]) {
        self.line("Recent Mood Entries", 13.0, true);
        self.gap(2.0);
        self.row(
            &[
                (0.0, "Date"),
                (40.0, "Mood"),
                (80.0, "Score"),
                (110.0, "Energy"),
                (140.0, "Stress"),
            ],
            9.0,
            true,
        );

        for mood in moods {
            let date = mood.timestamp.format("%b %d, %Y").to_string();
            let score = format!("{}/10", mood.mood_score);
            let energy = level_cell(mood.energy_level);
            let stress = level_cell(mood.stress_level);
            self.row(
                &[
                    (0.0, date.as_str()),
                    (40.0, mood_label(mood.mood_score)),
                    (80.0, score.as_str()),
                    (110.0, energy.as_str()),
                    (140.0, stress.as_str()),
                ],
                9.0,
                false,
            );
        }
    }

    fn journal_section(&mut self, journals: &[JournalEntry]) {
        self.line("Recent Journal Entries", 13.0, true);
        self.gap(2.0);

        for (i, journal) in journals.iter().enumerate() {
            self.line(&format!("{}. {}", i + 1, journal.title), 10.0, true);
            self.line(
                &journal.created_at.format("%b %d, %Y").to_string(),
                8.0,
                false,
            );
            self.paragraph(&excerpt(&journal.content, 200), 9.0);
            if journal.is_favorite {
                self.line("Favorite entry", 8.0, true);
            }
            self.gap(3.0);
        }
    }
}

fn level_cell(level: Option<i32>) -> String {
    match level {
        Some(v) => format!("{}/10", v),
        None => "-".into(),
    }
}

fn excerpt(content: &str, max_chars: usize) -> String {
    if content.chars().count() > max_chars {
        let head: String = content.chars().take(max_chars).collect();
        format!("{}...", head)
    } else {
        content.to_string()
    }
}

fn wrap(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if !current.is_empty() && current.chars().count() + 1 + word.chars().count() > max_chars {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn sample_report() -> AiReport {
        AiReport {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            report_type: "WEEKLY_SUMMARY".into(),
            content: "Your week showed steady improvement.\n\nKeep up the journaling habit."
                .into(),
            metadata: Some(r#"{"days": 7}"#.into()),
            prompt_used: Some("Generate a WEEKLY_SUMMARY report...".into()),
            model_used: Some("mock-model".into()),
            tokens_used: 250,
            created_at: Utc::now(),
        }
    }

    fn sample_mood(score: i32, energy: Option<i32>) -> MoodEntry {
        MoodEntry {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            mood_score: score,
            notes: Some("fine".into()),
            activities: None,
            energy_level: energy,
            stress_level: Some(3),
            timestamp: Utc::now(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_rendered_pdf_has_signature() {
        let report = sample_report();
        let moods = vec![sample_mood(8, Some(7)), sample_mood(4, None)];
        let bytes = render_report(&report, &moods, &[]).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_render_with_no_context_entries() {
        let bytes = render_report(&sample_report(), &[], &[]).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_mood_labels() {
        assert_eq!(mood_label(10), "Very Happy");
        assert_eq!(mood_label(8), "Very Happy");
        assert_eq!(mood_label(7), "Happy");
        assert_eq!(mood_label(5), "Okay");
        assert_eq!(mood_label(2), "Sad");
        assert_eq!(mood_label(1), "Very Sad");
    }

    #[test]
    fn test_wrap_respects_max_width() {
        let text = "word ".repeat(100);
        for line in wrap(&text, 40) {
            assert!(line.chars().count() <= 40);
        }
    }

    #[test]
    fn test_excerpt_truncates_long_content() {
        let long = "x".repeat(500);
        let e = excerpt(&long, 200);
        assert_eq!(e.chars().count(), 203); // 200 chars + "..."
        assert_eq!(excerpt("short", 200), "short");
    }
}
