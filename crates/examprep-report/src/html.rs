//! HTML results page generator.
//!
//! Produces a self-contained HTML file with all CSS inlined.

use anyhow::{Context, Result};
use std::path::Path;

use examprep_core::model::option_label;
use examprep_core::report::{QuestionReview, TestReport};
use examprep_core::scoring::{Grade, QuestionOutcome};
use examprep_core::session::format_clock;

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

fn grade_class(grade: Grade) -> &'static str {
    match grade {
        Grade::Excellent => "excellent",
        Grade::VeryGood => "very-good",
        Grade::Average => "average",
        Grade::NeedsImprovement => "needs-improvement",
    }
}

fn outcome_class(outcome: QuestionOutcome) -> &'static str {
    match outcome {
        QuestionOutcome::Correct => "correct",
        QuestionOutcome::Wrong => "wrong",
        QuestionOutcome::Skipped => "skipped",
    }
}

/// Generate the results page for a scored test.
pub fn generate_html(report: &TestReport) -> String {
    let config = &report.paper.config;
    let score = &report.score;
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!(
        "<title>examprep results: {}</title>\n",
        html_escape(&config.headline())
    ));
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    // Header
    html.push_str("<header>\n");
    html.push_str(&format!("<h1>{} Practice Test Results</h1>\n", config.exam_type));
    html.push_str(&format!(
        "<p class=\"meta\"><strong>{}</strong> | {} questions | {} | {}</p>\n",
        html_escape(&config.headline()),
        score.total,
        html_escape(&report.paper.model),
        report.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    html.push_str("</header>\n");

    // Score dashboard
    html.push_str("<section class=\"dashboard\">\n");
    html.push_str(&generate_score_ring(score.percentage, score.grade));
    html.push_str(&format!(
        "<p class=\"grade {}\">{}</p>\n",
        grade_class(score.grade),
        score.grade
    ));
    html.push_str("<table class=\"summary\">\n<tbody>\n");
    for (label, value) in [
        ("Correct", score.correct.to_string()),
        ("Wrong", score.wrong.to_string()),
        ("Skipped", score.skipped.to_string()),
        ("Attempted", format!("{} / {}", score.attempted, score.total)),
        ("Time taken", format_clock(report.time_taken_secs)),
        ("Ended", report.submission.reason.to_string()),
    ] {
        html.push_str(&format!("<tr><th>{label}</th><td>{value}</td></tr>\n"));
    }
    html.push_str("</tbody></table>\n");
    html.push_str("</section>\n");

    // Answer key
    html.push_str("<section class=\"answer-key\">\n");
    html.push_str("<h2>Answer Key &amp; Explanations</h2>\n");
    for row in report.review() {
        html.push_str(&render_question(&row));
    }
    html.push_str("</section>\n");

    // Raw JSON
    html.push_str("<section class=\"raw-data\">\n");
    html.push_str("<details>\n<summary>Raw JSON Data</summary>\n");
    html.push_str("<pre><code>");
    html.push_str(
        &serde_json::to_string_pretty(report)
            .unwrap_or_default()
            .replace('<', "&lt;")
            .replace('>', "&gt;"),
    );
    html.push_str("</code></pre>\n");
    html.push_str("</details>\n</section>\n");

    html.push_str("</body>\n</html>");
    html
}

fn render_question(row: &QuestionReview<'_>) -> String {
    let q = row.question;
    let mut html = format!(
        "<article class=\"question {}\">\n<h3><span class=\"number\">{}.</span> {}</h3>\n<ol class=\"options\">\n",
        outcome_class(row.outcome),
        row.position + 1,
        html_escape(&q.text)
    );

    for (index, option) in q.options.iter().enumerate() {
        let mut classes = Vec::new();
        if index == q.correct_answer_index {
            classes.push("answer");
        }
        if row.selected == Some(index) {
            classes.push("selected");
        }
        html.push_str(&format!(
            "<li class=\"{}\"><span class=\"label\">{}</span> {}</li>\n",
            classes.join(" "),
            option_label(index),
            html_escape(option)
        ));
    }
    html.push_str("</ol>\n");

    if row.outcome == QuestionOutcome::Skipped {
        html.push_str("<p class=\"note\">Not answered</p>\n");
    }
    html.push_str(&format!(
        "<details>\n<summary>Explanation</summary>\n<p>{}</p>\n</details>\n",
        html_escape(&q.explanation)
    ));
    html.push_str("</article>\n");
    html
}

/// Circular progress ring showing the percentage.
fn generate_score_ring(percentage: u32, grade: Grade) -> String {
    let radius = 54.0_f64;
    let circumference = 2.0 * std::f64::consts::PI * radius;
    let filled = circumference * f64::from(percentage.min(100)) / 100.0;

    let color = match grade {
        Grade::Excellent => "#22c55e",
        Grade::VeryGood => "#3b82f6",
        Grade::Average => "#eab308",
        Grade::NeedsImprovement => "#ef4444",
    };

    format!(
        "<svg class=\"ring\" width=\"140\" height=\"140\" viewBox=\"0 0 140 140\" xmlns=\"http://www.w3.org/2000/svg\">\n\
         \x20 <circle cx=\"70\" cy=\"70\" r=\"{radius}\" fill=\"none\" stroke=\"currentColor\" stroke-opacity=\"0.15\" stroke-width=\"12\"/>\n\
         \x20 <circle cx=\"70\" cy=\"70\" r=\"{radius}\" fill=\"none\" stroke=\"{color}\" stroke-width=\"12\" \
         stroke-dasharray=\"{filled:.2} {circumference:.2}\" stroke-linecap=\"round\" transform=\"rotate(-90 70 70)\"/>\n\
         \x20 <text x=\"70\" y=\"70\" font-size=\"28\" font-weight=\"bold\" fill=\"currentColor\" text-anchor=\"middle\" dominant-baseline=\"middle\">{percentage}%</text>\n\
         </svg>\n"
    )
}

/// Write the results page to a file.
pub fn write_html_report(report: &TestReport, path: &Path) -> Result<()> {
    let html = generate_html(report);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)
        .with_context(|| format!("failed to write HTML report to {}", path.display()))?;
    Ok(())
}

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --border: #e5e7eb; --correct: #dcfce7; --wrong: #fde2e2; --muted: #6b7280; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #111827; --fg: #f9fafb; --border: #374151; --correct: #064e3b; --wrong: #7f1d1d; --muted: #9ca3af; }
}
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0 auto; max-width: 900px; padding: 2rem; background: var(--bg); color: var(--fg); }
h1, h2 { margin-top: 2rem; }
.meta, .note { color: var(--muted); }
.dashboard { text-align: center; }
.grade { font-size: 1.5rem; font-weight: bold; }
.grade.excellent { color: #22c55e; }
.grade.very-good { color: #3b82f6; }
.grade.average { color: #eab308; }
.grade.needs-improvement { color: #ef4444; }
table { border-collapse: collapse; margin: 1rem auto; }
th, td { border: 1px solid var(--border); padding: 0.5rem 1rem; text-align: left; }
th { background: var(--border); }
.question { border: 1px solid var(--border); border-left-width: 6px; border-radius: 8px; padding: 0.5rem 1rem; margin: 1rem 0; }
.question.correct { border-left-color: #22c55e; }
.question.wrong { border-left-color: #ef4444; }
.question.skipped { border-left-color: var(--muted); }
.options { list-style: none; padding: 0; }
.options li { padding: 0.4rem 0.6rem; border-radius: 6px; margin: 0.25rem 0; }
.options li.answer { background: var(--correct); }
.options li.selected:not(.answer) { background: var(--wrong); }
.label { font-weight: bold; margin-right: 0.5rem; }
pre { overflow-x: auto; padding: 1rem; background: var(--border); border-radius: 8px; }
code { font-family: 'JetBrains Mono', 'Fira Code', monospace; font-size: 0.85rem; }
details { margin: 1rem 0; }
summary { cursor: pointer; font-weight: bold; }
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use examprep_core::model::*;
    use examprep_core::session::{SubmitReason, SubmittedTest};

    fn make_test_report(answers: &[(usize, usize)]) -> TestReport {
        let paper = TestPaper {
            id: uuid::Uuid::nil(),
            created_at: chrono::Utc::now(),
            config: TestConfig {
                exam_type: ExamType::Neet,
                subject: Subject::Physics,
                class_level: ClassLevel::Eleven,
                chapter: "Laws of Motion".into(),
                topic: Some("Friction".into()),
                difficulty: Difficulty::Hard,
                question_count: 3,
            },
            model: "gemini-2.5-flash".into(),
            questions: vec![
                Question {
                    id: "q-1-0".into(),
                    text: "Static friction is <= what?".into(),
                    options: vec![
                        "mu_s N".into(),
                        "mu_k N".into(),
                        "mg".into(),
                        "zero".into(),
                    ],
                    correct_answer_index: 0,
                    explanation: "Limiting friction equals mu_s N.".into(),
                },
                Question {
                    id: "q-1-1".into(),
                    text: "Unit of force?".into(),
                    options: vec!["Joule".into(), "Newton".into(), "Watt".into(), "Pascal".into()],
                    correct_answer_index: 1,
                    explanation: "F = ma, measured in newtons.".into(),
                },
                Question {
                    id: "q-1-2".into(),
                    text: "Inertia depends on?".into(),
                    options: vec!["Speed".into(), "Shape".into(), "Mass".into(), "Colour".into()],
                    correct_answer_index: 2,
                    explanation: "Mass is the measure of inertia.".into(),
                },
            ],
        };
        let submission = SubmittedTest {
            answers: answers.iter().copied().collect(),
            reason: SubmitReason::TimeUp,
            seconds_left: 0,
        };
        TestReport::new(paper, submission, 72)
    }

    #[test]
    fn html_report_contains_required_elements() {
        let report = make_test_report(&[(0, 0), (1, 3)]);
        let html = generate_html(&report);

        assert!(html.contains("<html"));
        assert!(html.contains("</html>"));
        assert!(html.contains("NEET Practice Test Results"));
        assert!(html.contains("33%"));
        assert!(html.contains("Needs Improvement"));
        assert!(html.contains("time up"));
        assert!(html.contains("Mass is the measure of inertia."));
        assert!(html.contains("Not answered"));
        assert!(html.contains("class=\"question wrong\""));
    }

    #[test]
    fn question_text_is_escaped() {
        let report = make_test_report(&[]);
        let html = generate_html(&report);
        assert!(html.contains("Static friction is &lt;= what?"));
        assert!(!html.contains("Static friction is <= what?"));
    }

    #[test]
    fn selected_and_correct_options_are_marked() {
        let report = make_test_report(&[(1, 3)]);
        let row = report.review().nth(1).unwrap();
        let html = render_question(&row);
        assert!(html.contains("<li class=\"answer\"><span class=\"label\">B</span> Newton</li>"));
        assert!(html.contains("<li class=\"selected\"><span class=\"label\">D</span> Pascal</li>"));
    }

    #[test]
    fn html_report_write_to_file() {
        let report = make_test_report(&[(0, 0), (1, 1), (2, 2)]);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results").join("report.html");

        write_html_report(&report, &path).unwrap();
        assert!(path.exists());

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("100%"));
        assert!(content.contains("Excellent"));
    }
}
