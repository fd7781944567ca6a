//! End-to-end pipeline tests with the mock provider.
//!
//! These tests verify that the whole flow (generate → sit the test → score →
//! render) works for a submitted test, an expired clock, and an unusable
//! model response.

use std::sync::Arc;

use tokio::sync::mpsc;

use examprep_core::error::{generation_failure_message, GENERATION_FAILED_MESSAGE};
use examprep_core::model::{ClassLevel, Difficulty, ExamType, Subject, TestConfig};
use examprep_core::report::TestReport;
use examprep_core::scoring::Grade;
use examprep_core::service::{QuestionService, ServiceConfig};
use examprep_core::session::{administer, NoopObserver, SubmitReason, TestSession};
use examprep_core::syllabus::Syllabus;
use examprep_providers::mock::MockProvider;
use examprep_report::generate_html;

fn test_config(count: u32) -> TestConfig {
    Syllabus::builtin()
        .unwrap()
        .resolve(&TestConfig {
            exam_type: ExamType::Neet,
            subject: Subject::Chemistry,
            class_level: ClassLevel::Eleven,
            chapter: "some basic concepts of chemistry".into(),
            topic: None,
            difficulty: Difficulty::Easy,
            question_count: count,
        })
        .unwrap()
}

fn mock_service(provider: MockProvider) -> QuestionService {
    QuestionService::new(
        Arc::new(provider),
        ServiceConfig {
            model: "mock-model".into(),
            ..ServiceConfig::default()
        },
    )
}

#[tokio::test(start_paused = true)]
async fn e2e_all_correct_submission() {
    let service = mock_service(MockProvider::new());
    let paper = service.generate_paper(&test_config(4)).await.unwrap();
    assert_eq!(paper.questions.len(), 4);
    assert_eq!(paper.model, "mock-model");

    let (tx, mut rx) = mpsc::channel(16);
    for line in ["a", "n", "b", "n", "c", "n", "d", "s"] {
        tx.send(line.to_string()).await.unwrap();
    }

    let session = TestSession::new(&paper.questions, 72);
    let submitted = administer(session, &mut rx, &NoopObserver).await;
    assert_eq!(submitted.reason, SubmitReason::Submitted);
    assert_eq!(submitted.seconds_left, 4 * 72);

    let report = TestReport::new(paper, submitted, 72);
    assert_eq!(report.score.correct, 4);
    assert_eq!(report.score.percentage, 100);
    assert_eq!(report.score.grade, Grade::Excellent);
    assert_eq!(report.time_taken_secs, 0);

    let html = generate_html(&report);
    assert!(html.contains("100%"));
    assert!(html.contains("Some Basic Concepts of Chemistry"));
}

#[tokio::test(start_paused = true)]
async fn e2e_time_up_scores_recorded_answers() {
    let service = mock_service(MockProvider::new());
    let paper = service.generate_paper(&test_config(2)).await.unwrap();

    // Keep the sender alive so only the clock can end the session.
    let (tx, mut rx) = mpsc::channel(16);
    tx.send("a".to_string()).await.unwrap();

    let session = TestSession::new(&paper.questions, 72);
    let submitted = administer(session, &mut rx, &NoopObserver).await;
    drop(tx);

    assert_eq!(submitted.reason, SubmitReason::TimeUp);
    assert_eq!(submitted.seconds_left, 0);
    assert_eq!(submitted.answers.get(0), Some(0));

    let report = TestReport::new(paper, submitted, 72);
    assert_eq!(report.score.correct, 1);
    assert_eq!(report.score.skipped, 1);
    assert_eq!(report.score.percentage, 50);
    assert_eq!(report.score.grade, Grade::Average);
    assert_eq!(report.time_taken_secs, 144);
}

#[tokio::test]
async fn e2e_empty_response_is_a_generation_failure() {
    let provider = MockProvider::with_fixed_response(r#"{"questions": []}"#);
    let service = mock_service(provider);

    let err = service.generate_paper(&test_config(10)).await.unwrap_err();
    assert_eq!(generation_failure_message(&err), GENERATION_FAILED_MESSAGE);
}

#[tokio::test]
async fn e2e_short_response_keeps_valid_questions() {
    let body = r#"```json
[
  {"text": "Mole is a unit of?", "options": ["Mass", "Amount of substance", "Volume", "Energy"], "correctAnswerIndex": 1, "explanation": "SI base unit."},
  {"text": "Broken item", "options": ["only", "three", "options"], "correctAnswerIndex": 0, "explanation": ""}
]
```"#;
    let service = mock_service(MockProvider::with_fixed_response(body));

    let paper = service.generate_paper(&test_config(10)).await.unwrap();
    assert_eq!(paper.questions.len(), 1);
    assert_eq!(paper.questions[0].correct_option(), Some("Amount of substance"));
}
