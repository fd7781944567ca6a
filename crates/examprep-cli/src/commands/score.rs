//! The `examprep score` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use examprep_core::model::{AnswerSheet, TestPaper};
use examprep_core::report::TestReport;
use examprep_core::session::{SubmitReason, SubmittedTest};
use examprep_providers::config::load_config_from;

use crate::commands::save_report;
use crate::console::{print_answer_key, print_score_summary};

pub fn execute(
    paper_path: PathBuf,
    answers: String,
    review: bool,
    output: Option<PathBuf>,
    format: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let paper = TestPaper::load_json(&paper_path)?;
    let answers: AnswerSheet = answers
        .parse()
        .map_err(anyhow::Error::msg)
        .context("invalid --answers")?;

    let ignored = answers
        .iter()
        .filter(|(position, _)| *position >= paper.questions.len())
        .count();
    if ignored > 0 {
        eprintln!("Warning: {ignored} answer(s) refer to questions not in the paper and are ignored.");
    }

    // No clock ran, so the whole budget counts as unused.
    let budget = (paper.questions.len() as u64).saturating_mul(config.seconds_per_question);
    let submission = SubmittedTest {
        answers,
        reason: SubmitReason::Submitted,
        seconds_left: budget,
    };
    let report = TestReport::new(paper, submission, config.seconds_per_question);

    print_score_summary(&report);
    if review {
        print_answer_key(&report);
    }

    if let Some(dir) = &output {
        save_report(&report, dir, &format)?;
    }

    Ok(())
}
