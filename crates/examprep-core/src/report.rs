//! Result report types with JSON persistence.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{Question, TestPaper};
use crate::scoring::{score, QuestionOutcome, ScoreCard};
use crate::session::SubmittedTest;

/// A scored attempt at a test paper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the attempt was scored.
    pub created_at: DateTime<Utc>,
    /// The paper that was attempted.
    pub paper: TestPaper,
    /// Frozen answers and how the session ended.
    pub submission: SubmittedTest,
    /// Scoring summary.
    pub score: ScoreCard,
    /// Seconds the attempt took.
    pub time_taken_secs: u64,
}

/// One row of the answer key.
#[derive(Debug, Clone, Copy)]
pub struct QuestionReview<'a> {
    /// Zero-based position in the paper.
    pub position: usize,
    pub question: &'a Question,
    pub selected: Option<usize>,
    pub outcome: QuestionOutcome,
}

impl TestReport {
    /// Score a submission against its paper.
    pub fn new(paper: TestPaper, submission: SubmittedTest, seconds_per_question: u64) -> Self {
        let score = score(&paper.questions, &submission.answers);
        let budget = (paper.questions.len() as u64).saturating_mul(seconds_per_question);
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            time_taken_secs: budget.saturating_sub(submission.seconds_left),
            paper,
            submission,
            score,
        }
    }

    /// Answer key rows in paper order.
    pub fn review(&self) -> impl Iterator<Item = QuestionReview<'_>> {
        self.paper
            .questions
            .iter()
            .zip(&self.score.outcomes)
            .enumerate()
            .map(|(position, (question, outcome))| QuestionReview {
                position,
                question,
                selected: self.submission.answers.get(position),
                outcome: *outcome,
            })
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: TestReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AnswerSheet, ClassLevel, Difficulty, ExamType, Subject, TestConfig};
    use crate::scoring::Grade;
    use crate::session::SubmitReason;

    fn make_paper(n: usize) -> TestPaper {
        TestPaper {
            id: Uuid::nil(),
            created_at: Utc::now(),
            config: TestConfig {
                exam_type: ExamType::Jee,
                subject: Subject::Mathematics,
                class_level: ClassLevel::Eleven,
                chapter: "Sets".into(),
                topic: Some("Venn Diagrams".into()),
                difficulty: Difficulty::Medium,
                question_count: n as u32,
            },
            model: "mock-model".into(),
            questions: (0..n)
                .map(|i| Question {
                    id: format!("q-0-{i}"),
                    text: format!("Question {i}"),
                    options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
                    correct_answer_index: i % 4,
                    explanation: format!("Because {i}."),
                })
                .collect(),
        }
    }

    fn submission(answers: &[(usize, usize)], seconds_left: u64) -> SubmittedTest {
        SubmittedTest {
            answers: answers.iter().copied().collect::<AnswerSheet>(),
            reason: SubmitReason::Submitted,
            seconds_left,
        }
    }

    #[test]
    fn report_scores_submission() {
        let report = TestReport::new(make_paper(4), submission(&[(0, 0), (1, 0), (3, 3)], 100), 72);
        assert_eq!(report.score.correct, 2);
        assert_eq!(report.score.wrong, 1);
        assert_eq!(report.score.skipped, 1);
        assert_eq!(report.score.percentage, 50);
        assert_eq!(report.score.grade, Grade::Average);
        assert_eq!(report.time_taken_secs, 4 * 72 - 100);
    }

    #[test]
    fn huge_per_question_time_does_not_overflow() {
        let report = TestReport::new(make_paper(4), submission(&[], 10), u64::MAX);
        assert_eq!(report.time_taken_secs, u64::MAX - 10);
    }

    #[test]
    fn review_rows_follow_paper_order() {
        let report = TestReport::new(make_paper(3), submission(&[(1, 1)], 0), 72);
        let rows: Vec<_> = report.review().collect();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].outcome, QuestionOutcome::Skipped);
        assert_eq!(rows[1].selected, Some(1));
        assert_eq!(rows[1].outcome, QuestionOutcome::Correct);
        assert_eq!(rows[2].question.explanation, "Because 2.");
    }

    #[test]
    fn json_roundtrip() {
        let report = TestReport::new(make_paper(2), submission(&[(0, 0)], 10), 72);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("report.json");

        report.save_json(&path).unwrap();
        let loaded = TestReport::load_json(&path).unwrap();

        assert_eq!(loaded.paper.config.chapter, "Sets");
        assert_eq!(loaded.submission.answers.get(0), Some(0));
        assert_eq!(loaded.score, report.score);
    }

    #[test]
    fn paper_json_roundtrip() {
        let paper = make_paper(3);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("paper.json");

        paper.save_json(&path).unwrap();
        let loaded = TestPaper::load_json(&path).unwrap();
        assert_eq!(loaded.questions, paper.questions);
        assert_eq!(loaded.config, paper.config);
    }
}
