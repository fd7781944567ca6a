//! Scoring and grading of a submitted test.
//!
//! Everything here is a pure function of the questions and the answer sheet.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::{AnswerSheet, Question};

/// Qualitative band derived from the percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Grade {
    NeedsImprovement,
    Average,
    VeryGood,
    Excellent,
}

impl Grade {
    /// Band for a percentage. Thresholds are inclusive.
    pub fn from_percentage(percentage: u32) -> Self {
        match percentage {
            90.. => Grade::Excellent,
            75..=89 => Grade::VeryGood,
            50..=74 => Grade::Average,
            _ => Grade::NeedsImprovement,
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Grade::Excellent => write!(f, "Excellent"),
            Grade::VeryGood => write!(f, "Very Good"),
            Grade::Average => write!(f, "Average"),
            Grade::NeedsImprovement => write!(f, "Needs Improvement"),
        }
    }
}

/// How a single question went.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionOutcome {
    Correct,
    Wrong,
    Skipped,
}

impl QuestionOutcome {
    pub fn of(question: &Question, selected: Option<usize>) -> Self {
        match selected {
            None => QuestionOutcome::Skipped,
            Some(option) if option == question.correct_answer_index => QuestionOutcome::Correct,
            Some(_) => QuestionOutcome::Wrong,
        }
    }
}

/// Result of scoring a test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreCard {
    pub total: usize,
    /// Positions with an answer.
    pub attempted: usize,
    pub correct: usize,
    /// Answered, but not the correct option.
    pub wrong: usize,
    /// No answer recorded.
    pub skipped: usize,
    /// Rounded to the nearest integer; 0 when there are no questions.
    pub percentage: u32,
    pub grade: Grade,
    /// Outcome per question position.
    pub outcomes: Vec<QuestionOutcome>,
}

impl ScoreCard {
    /// Everything that did not earn a mark.
    pub fn incorrect_or_skipped(&self) -> usize {
        self.total - self.correct
    }
}

/// Score an answer sheet against the questions it answers.
///
/// Entries for positions past the last question are ignored.
pub fn score(questions: &[Question], answers: &AnswerSheet) -> ScoreCard {
    let outcomes: Vec<QuestionOutcome> = questions
        .iter()
        .enumerate()
        .map(|(position, q)| QuestionOutcome::of(q, answers.get(position)))
        .collect();

    let total = questions.len();
    let correct = outcomes
        .iter()
        .filter(|o| **o == QuestionOutcome::Correct)
        .count();
    let skipped = outcomes
        .iter()
        .filter(|o| **o == QuestionOutcome::Skipped)
        .count();
    let attempted = total - skipped;
    let percentage = percentage(correct, total);

    ScoreCard {
        total,
        attempted,
        correct,
        wrong: attempted - correct,
        skipped,
        percentage,
        grade: Grade::from_percentage(percentage),
        outcomes,
    }
}

/// `round(correct / total * 100)` with halves rounded up.
pub fn percentage(correct: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    let correct = correct.min(total) as u64;
    let total = total as u64;
    ((correct * 200 + total) / (total * 2)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn questions(correct: &[usize]) -> Vec<Question> {
        correct
            .iter()
            .enumerate()
            .map(|(i, &c)| Question {
                id: format!("q-{i}"),
                text: format!("Question {i}"),
                options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
                correct_answer_index: c,
                explanation: String::new(),
            })
            .collect()
    }

    #[test]
    fn worked_example() {
        let qs = questions(&[0; 10]);
        let answers: AnswerSheet = [(0, 0), (1, 1), (2, 0)].into_iter().collect();
        let card = score(&qs, &answers);

        assert_eq!(card.correct, 2);
        assert_eq!(card.attempted, 3);
        assert_eq!(card.wrong, 1);
        assert_eq!(card.skipped, 7);
        assert_eq!(card.incorrect_or_skipped(), 8);
        assert_eq!(card.percentage, 20);
        assert_eq!(card.grade, Grade::NeedsImprovement);
    }

    #[test]
    fn unanswered_is_skipped_not_wrong() {
        let qs = questions(&[2, 2]);
        let answers: AnswerSheet = [(0, 2)].into_iter().collect();
        let card = score(&qs, &answers);

        assert_eq!(
            card.outcomes,
            vec![QuestionOutcome::Correct, QuestionOutcome::Skipped]
        );
        assert_eq!(card.wrong, 0);
        assert_eq!(card.skipped, 1);
    }

    #[test]
    fn grade_thresholds_are_inclusive() {
        assert_eq!(Grade::from_percentage(100), Grade::Excellent);
        assert_eq!(Grade::from_percentage(90), Grade::Excellent);
        assert_eq!(Grade::from_percentage(89), Grade::VeryGood);
        assert_eq!(Grade::from_percentage(75), Grade::VeryGood);
        assert_eq!(Grade::from_percentage(74), Grade::Average);
        assert_eq!(Grade::from_percentage(50), Grade::Average);
        assert_eq!(Grade::from_percentage(49), Grade::NeedsImprovement);
        assert_eq!(Grade::from_percentage(0), Grade::NeedsImprovement);
    }

    #[test]
    fn percentage_rounds_half_up() {
        assert_eq!(percentage(1, 8), 13); // 12.5
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(9, 10), 90);
        assert_eq!(percentage(89, 100), 89);
    }

    #[test]
    fn empty_test_scores_zero() {
        let card = score(&[], &AnswerSheet::new());
        assert_eq!(card.total, 0);
        assert_eq!(card.percentage, 0);
        assert_eq!(card.grade, Grade::NeedsImprovement);
    }

    #[test]
    fn out_of_range_positions_are_ignored() {
        let qs = questions(&[0, 0]);
        let answers: AnswerSheet = [(0, 0), (5, 0), (9, 1)].into_iter().collect();
        let card = score(&qs, &answers);
        assert_eq!(card.attempted, 1);
        assert_eq!(card.correct, 1);
    }

    #[test]
    fn counts_stay_ordered_for_every_answer_combination() {
        // Three questions, every combination of skip/A/B/C/D per position.
        let qs = questions(&[0, 1, 3]);
        let choices = [None, Some(0), Some(1), Some(2), Some(3)];
        for a in choices {
            for b in choices {
                for c in choices {
                    let answers: AnswerSheet = [a, b, c]
                        .into_iter()
                        .enumerate()
                        .filter_map(|(pos, opt)| opt.map(|o| (pos, o)))
                        .collect();
                    let card = score(&qs, &answers);
                    assert!(card.correct <= card.attempted);
                    assert!(card.attempted <= card.total);
                    assert!(card.percentage <= 100);
                    assert_eq!(card.correct + card.wrong + card.skipped, card.total);
                    assert_eq!(card.percentage, percentage(card.correct, card.total));
                }
            }
        }
    }
}
