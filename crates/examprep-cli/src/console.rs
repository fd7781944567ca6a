//! Terminal rendering and line input.

use std::io::{BufRead, Write};

use comfy_table::{Cell, Table};
use tokio::sync::mpsc;

use examprep_core::model::option_label;
use examprep_core::report::TestReport;
use examprep_core::scoring::QuestionOutcome;
use examprep_core::session::{
    format_clock, Countdown, SessionError, SessionObserver, SubmitReason, SubmittedTest,
    TestSession,
};

/// Lines typed by the user.
///
/// Stdin is read on a plain thread so an unfinished read never holds up
/// shutdown.
pub struct Input {
    lines: mpsc::Receiver<String>,
}

/// Result of a menu prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pick<T> {
    Value(T),
    Back,
    Quit,
}

impl Input {
    pub fn from_stdin() -> Self {
        let (tx, rx) = mpsc::channel(16);
        std::thread::spawn(move || {
            for line in std::io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                if tx.blocking_send(line).is_err() {
                    break;
                }
            }
        });
        Self { lines: rx }
    }

    /// The raw line channel, for the test session.
    pub fn lines(&mut self) -> &mut mpsc::Receiver<String> {
        &mut self.lines
    }

    /// Print a prompt and wait for one line. `None` once input is closed.
    pub async fn ask(&mut self, prompt: &str) -> Option<String> {
        print!("{prompt}");
        let _ = std::io::stdout().flush();
        let line = self.lines.recv().await;
        if line.is_none() {
            println!();
        }
        line.map(|l| l.trim().to_string())
    }

    /// Numbered menu. Blank input takes `default`; `b` goes back, `q` quits.
    pub async fn choose<T: Clone>(
        &mut self,
        title: &str,
        items: &[T],
        label: impl Fn(&T) -> String,
        default: Option<usize>,
    ) -> Pick<T> {
        println!("\n{title}");
        for (i, item) in items.iter().enumerate() {
            let marker = if default == Some(i) { " (default)" } else { "" };
            println!("  {:>2}. {}{marker}", i + 1, label(item));
        }

        loop {
            let Some(answer) = self.ask("> ").await else {
                return Pick::Quit;
            };
            match answer.to_lowercase().as_str() {
                "q" | "quit" | "exit" => return Pick::Quit,
                "b" | "back" => return Pick::Back,
                "" => {
                    if let Some(i) = default {
                        return Pick::Value(items[i].clone());
                    }
                }
                other => {
                    if let Some(item) = other
                        .parse::<usize>()
                        .ok()
                        .and_then(|n| n.checked_sub(1))
                        .and_then(|i| items.get(i))
                    {
                        return Pick::Value(item.clone());
                    }
                }
            }
            println!("Please enter a number from 1 to {} (b = back, q = quit).", items.len());
        }
    }
}

/// Key reminder shown under each question.
fn command_help(is_last: bool) -> &'static str {
    if is_last {
        "[a-d answer, s submit, p previous, g N jump, x clear]"
    } else {
        "[a-d answer, n next, p previous, g N jump, x clear, s submit]"
    }
}

/// Renders the test session as plain text.
pub struct ConsoleObserver;

impl SessionObserver for ConsoleObserver {
    fn on_question(&self, session: &TestSession<'_>) {
        let Some(question) = session.current_question() else {
            return;
        };
        let total = session.questions().len();
        let selected = session.answers().get(session.current());

        println!(
            "\nQuestion {} of {}   answered {}/{}   time left {}",
            session.current() + 1,
            total,
            session.answers().len(),
            total,
            session.countdown()
        );
        println!("{}", question.text);
        for (i, option) in question.options.iter().enumerate() {
            let marker = if selected == Some(i) { '*' } else { ' ' };
            println!("  {marker} {}) {option}", option_label(i));
        }

        println!("{}", command_help(session.is_last()));
    }

    fn on_tick(&self, countdown: Countdown) {
        let remaining = countdown.remaining();
        let announce = remaining % 60 == 0
            || (countdown.is_low() && remaining % 15 == 0)
            || remaining <= 5;
        if announce {
            let warning = if countdown.is_low() { "  (hurry up!)" } else { "" };
            println!("  time left {countdown}{warning}");
        }
    }

    fn on_rejected(&self, error: &SessionError) {
        println!("  {error}");
    }

    fn on_finish(&self, submitted: &SubmittedTest) {
        match submitted.reason {
            SubmitReason::Submitted => println!("\nTest submitted."),
            SubmitReason::TimeUp => {
                println!("\nTime's up! Your answers have been submitted automatically.")
            }
            SubmitReason::InputClosed => println!("\nInput closed, submitting your answers."),
        }
    }
}

/// Score summary table.
pub fn print_score_summary(report: &TestReport) {
    let score = &report.score;

    println!("\nTest Results: {}", report.paper.config.headline());

    let mut table = Table::new();
    table.set_header(vec!["Score", "Grade", "Correct", "Wrong", "Skipped", "Time"]);
    table.add_row(vec![
        Cell::new(format!("{}%", score.percentage)),
        Cell::new(score.grade),
        Cell::new(score.correct),
        Cell::new(score.wrong),
        Cell::new(score.skipped),
        Cell::new(format_clock(report.time_taken_secs)),
    ]);

    println!("{table}");
    println!(
        "You answered {} of {} questions; {} correct.",
        score.attempted, score.total, score.correct
    );
}

/// Every question with the correct answer, the user's answer and the
/// explanation.
pub fn print_answer_key(report: &TestReport) {
    println!("\nAnswer Key & Explanations");
    for row in report.review() {
        let status = match row.outcome {
            QuestionOutcome::Correct => "correct",
            QuestionOutcome::Wrong => "wrong",
            QuestionOutcome::Skipped => "skipped",
        };
        println!("\n{}. [{status}] {}", row.position + 1, row.question.text);
        for (i, option) in row.question.options.iter().enumerate() {
            let marker = if i == row.question.correct_answer_index {
                "+"
            } else if row.selected == Some(i) {
                "x"
            } else {
                " "
            };
            println!("  {marker} {}) {option}", option_label(i));
        }
        if row.selected.is_none() {
            println!("  Not answered");
        }
        println!("  Explanation: {}", row.question.explanation);
    }
}
