//! Timed test session.
//!
//! A session walks the user through the questions, records answers, and
//! counts down one second at a time from a budget proportional to the number
//! of questions. The session ends when the user submits, the clock runs out,
//! or the input stream closes; in every case the answers recorded so far are
//! frozen into a [`SubmittedTest`].

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::model::{option_label, AnswerSheet, Question, OPTIONS_PER_QUESTION};

/// Time budget per question.
pub const SECONDS_PER_QUESTION: u64 = 72;

/// Below this many seconds the clock is shown as running low.
pub const LOW_TIME_THRESHOLD_SECS: u64 = 60;

/// Format seconds as `m:ss`.
pub fn format_clock(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// One-second countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    remaining: u64,
}

impl Countdown {
    pub fn new(seconds: u64) -> Self {
        Self { remaining: seconds }
    }

    /// Budget for a test of `questions` questions.
    pub fn for_questions(questions: usize, seconds_per_question: u64) -> Self {
        Self::new((questions as u64).saturating_mul(seconds_per_question))
    }

    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    pub fn is_low(&self) -> bool {
        self.remaining < LOW_TIME_THRESHOLD_SECS
    }

    pub fn is_expired(&self) -> bool {
        self.remaining == 0
    }

    /// Advance one second. Returns `true` once the clock has hit zero.
    pub fn tick(&mut self) -> bool {
        self.remaining = self.remaining.saturating_sub(1);
        self.remaining == 0
    }
}

impl fmt::Display for Countdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_clock(self.remaining))
    }
}

/// Something the user can do during the test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCommand {
    /// Choose an option (zero-based) for the current question.
    Select(usize),
    /// Remove the answer for the current question.
    Clear,
    Next,
    Previous,
    /// Go to a question position (zero-based).
    Jump(usize),
    Submit,
}

impl FromStr for SessionCommand {
    type Err = SessionError;

    /// Accepts `a`-`d` or `1`-`4` to answer, `n`/`p` to move, `g <n>` to
    /// jump, `x` to clear, and `s` to submit.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let input = s.trim().to_lowercase();
        let mut parts = input.split_whitespace();
        let head = parts.next().unwrap_or("");
        let arg = parts.next();

        let command = match (head, arg) {
            ("n" | "next" | "", None) => SessionCommand::Next,
            ("p" | "prev" | "previous" | "back", None) => SessionCommand::Previous,
            ("x" | "clear", None) => SessionCommand::Clear,
            ("s" | "submit" | "finish", None) => SessionCommand::Submit,
            ("g" | "go" | "goto", Some(n)) => {
                let number = n
                    .parse::<usize>()
                    .ok()
                    .filter(|n| *n >= 1)
                    .ok_or_else(|| SessionError::UnknownCommand(s.trim().to_string()))?;
                SessionCommand::Jump(number - 1)
            }
            (letter, None) if letter.len() == 1 => {
                let c = letter.as_bytes()[0];
                match c {
                    b'a'..=b'z' => SessionCommand::Select((c - b'a') as usize),
                    b'1'..=b'9' => SessionCommand::Select((c - b'1') as usize),
                    _ => return Err(SessionError::UnknownCommand(s.trim().to_string())),
                }
            }
            _ => return Err(SessionError::UnknownCommand(s.trim().to_string())),
        };
        Ok(command)
    }
}

/// A command the session could not apply.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("unknown command '{0}'")]
    UnknownCommand(String),

    #[error("option {0} does not exist (choose A-D)")]
    NoSuchOption(char),

    #[error("question {number} does not exist (1-{total})")]
    NoSuchQuestion { number: usize, total: usize },
}

/// Whether the session keeps running after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Submit,
}

/// Why the session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmitReason {
    /// The user submitted.
    Submitted,
    /// The countdown reached zero.
    TimeUp,
    /// The input stream ended before submission.
    InputClosed,
}

impl fmt::Display for SubmitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmitReason::Submitted => write!(f, "submitted"),
            SubmitReason::TimeUp => write!(f, "time up"),
            SubmitReason::InputClosed => write!(f, "input closed"),
        }
    }
}

/// Frozen result of a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmittedTest {
    pub answers: AnswerSheet,
    pub reason: SubmitReason,
    pub seconds_left: u64,
}

/// In-progress test state.
#[derive(Debug)]
pub struct TestSession<'a> {
    questions: &'a [Question],
    current: usize,
    answers: AnswerSheet,
    countdown: Countdown,
}

impl<'a> TestSession<'a> {
    pub fn new(questions: &'a [Question], seconds_per_question: u64) -> Self {
        Self {
            questions,
            current: 0,
            answers: AnswerSheet::new(),
            countdown: Countdown::for_questions(questions.len(), seconds_per_question),
        }
    }

    pub fn questions(&self) -> &'a [Question] {
        self.questions
    }

    /// Zero-based position of the question on screen.
    pub fn current(&self) -> usize {
        self.current
    }

    pub fn current_question(&self) -> Option<&'a Question> {
        self.questions.get(self.current)
    }

    pub fn is_last(&self) -> bool {
        self.current + 1 >= self.questions.len()
    }

    pub fn answers(&self) -> &AnswerSheet {
        &self.answers
    }

    pub fn countdown(&self) -> Countdown {
        self.countdown
    }

    /// Fraction of the way through the paper, by position.
    pub fn progress(&self) -> f64 {
        if self.questions.is_empty() {
            return 0.0;
        }
        (self.current + 1) as f64 / self.questions.len() as f64
    }

    /// Apply one user command.
    pub fn apply(&mut self, command: SessionCommand) -> Result<Flow, SessionError> {
        match command {
            SessionCommand::Select(option) => {
                if option >= OPTIONS_PER_QUESTION {
                    return Err(SessionError::NoSuchOption(option_label(option)));
                }
                self.answers.select(self.current, option);
            }
            SessionCommand::Clear => {
                self.answers.clear(self.current);
            }
            SessionCommand::Next => {
                if !self.is_last() {
                    self.current += 1;
                }
            }
            SessionCommand::Previous => {
                self.current = self.current.saturating_sub(1);
            }
            SessionCommand::Jump(position) => {
                if position >= self.questions.len() {
                    return Err(SessionError::NoSuchQuestion {
                        number: position + 1,
                        total: self.questions.len(),
                    });
                }
                self.current = position;
            }
            SessionCommand::Submit => return Ok(Flow::Submit),
        }
        Ok(Flow::Continue)
    }

    /// Advance the clock one second. Returns `true` when time is up.
    pub fn tick(&mut self) -> bool {
        self.countdown.tick()
    }

    /// Freeze the answers recorded so far.
    pub fn finish(self, reason: SubmitReason) -> SubmittedTest {
        SubmittedTest {
            answers: self.answers,
            reason,
            seconds_left: self.countdown.remaining(),
        }
    }
}

/// Receives session events so a front-end can render them.
pub trait SessionObserver: Send + Sync {
    /// The question on screen changed, or its answer did.
    fn on_question(&self, session: &TestSession<'_>);
    /// One second elapsed.
    fn on_tick(&self, countdown: Countdown);
    fn on_rejected(&self, error: &SessionError);
    fn on_finish(&self, submitted: &SubmittedTest);
}

/// No-op session observer.
pub struct NoopObserver;

impl SessionObserver for NoopObserver {
    fn on_question(&self, _: &TestSession<'_>) {}
    fn on_tick(&self, _: Countdown) {}
    fn on_rejected(&self, _: &SessionError) {}
    fn on_finish(&self, _: &SubmittedTest) {}
}

/// Run a session to completion.
///
/// Lines from `input` are parsed as [`SessionCommand`]s while a one-second
/// interval drives the countdown. Returns as soon as the user submits, the
/// countdown reaches zero, or `input` is closed.
pub async fn administer(
    mut session: TestSession<'_>,
    input: &mut mpsc::Receiver<String>,
    observer: &dyn SessionObserver,
) -> SubmittedTest {
    let second = Duration::from_secs(1);
    let mut ticker = interval_at(Instant::now() + second, second);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    tracing::info!(
        questions = session.questions().len(),
        seconds = session.countdown().remaining(),
        "test session started"
    );

    if session.questions().is_empty() || session.countdown().is_expired() {
        return finish(session, SubmitReason::TimeUp, observer);
    }

    observer.on_question(&session);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if session.tick() {
                    return finish(session, SubmitReason::TimeUp, observer);
                }
                observer.on_tick(session.countdown());
            }
            line = input.recv() => {
                let Some(line) = line else {
                    return finish(session, SubmitReason::InputClosed, observer);
                };
                let result = line
                    .parse::<SessionCommand>()
                    .and_then(|command| session.apply(command));
                match result {
                    Ok(Flow::Submit) => {
                        return finish(session, SubmitReason::Submitted, observer);
                    }
                    Ok(Flow::Continue) => observer.on_question(&session),
                    Err(e) => observer.on_rejected(&e),
                }
            }
        }
    }
}

fn finish(
    session: TestSession<'_>,
    reason: SubmitReason,
    observer: &dyn SessionObserver,
) -> SubmittedTest {
    let submitted = session.finish(reason);
    tracing::info!(
        reason = %submitted.reason,
        answered = submitted.answers.len(),
        seconds_left = submitted.seconds_left,
        "test session finished"
    );
    observer.on_finish(&submitted);
    submitted
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn questions(n: usize) -> Vec<Question> {
        (0..n)
            .map(|i| Question {
                id: format!("q-{i}"),
                text: format!("Question {i}"),
                options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
                correct_answer_index: 0,
                explanation: String::new(),
            })
            .collect()
    }

    #[derive(Default)]
    struct RecordingObserver {
        ticks: Mutex<Vec<u64>>,
        rejected: Mutex<Vec<SessionError>>,
    }

    impl SessionObserver for RecordingObserver {
        fn on_question(&self, _: &TestSession<'_>) {}
        fn on_tick(&self, countdown: Countdown) {
            self.ticks.lock().unwrap().push(countdown.remaining());
        }
        fn on_rejected(&self, error: &SessionError) {
            self.rejected.lock().unwrap().push(error.clone());
        }
        fn on_finish(&self, _: &SubmittedTest) {}
    }

    #[test]
    fn clock_format() {
        assert_eq!(format_clock(720), "12:00");
        assert_eq!(format_clock(65), "1:05");
        assert_eq!(format_clock(9), "0:09");
        assert_eq!(format_clock(0), "0:00");
    }

    #[test]
    fn budget_is_72_seconds_per_question() {
        let countdown = Countdown::for_questions(10, SECONDS_PER_QUESTION);
        assert_eq!(countdown.remaining(), 720);
        assert!(!countdown.is_low());
        assert!(Countdown::new(59).is_low());
    }

    #[test]
    fn budget_saturates_for_huge_per_question_time() {
        let countdown = Countdown::for_questions(3, u64::MAX / 2);
        assert_eq!(countdown.remaining(), u64::MAX);
    }

    #[test]
    fn countdown_expires_at_zero() {
        let mut countdown = Countdown::new(2);
        assert!(!countdown.tick());
        assert!(countdown.tick());
        assert!(countdown.is_expired());
        assert!(countdown.tick());
        assert_eq!(countdown.remaining(), 0);
    }

    #[test]
    fn parse_commands() {
        assert_eq!("a".parse::<SessionCommand>().unwrap(), SessionCommand::Select(0));
        assert_eq!("D".parse::<SessionCommand>().unwrap(), SessionCommand::Select(3));
        assert_eq!("2".parse::<SessionCommand>().unwrap(), SessionCommand::Select(1));
        assert_eq!("".parse::<SessionCommand>().unwrap(), SessionCommand::Next);
        assert_eq!("prev".parse::<SessionCommand>().unwrap(), SessionCommand::Previous);
        assert_eq!("g 5".parse::<SessionCommand>().unwrap(), SessionCommand::Jump(4));
        assert_eq!("submit".parse::<SessionCommand>().unwrap(), SessionCommand::Submit);
        assert!("g 0".parse::<SessionCommand>().is_err());
        assert!("hello".parse::<SessionCommand>().is_err());
    }

    #[test]
    fn navigation_is_clamped() {
        let qs = questions(3);
        let mut session = TestSession::new(&qs, SECONDS_PER_QUESTION);

        session.apply(SessionCommand::Previous).unwrap();
        assert_eq!(session.current(), 0);

        for _ in 0..5 {
            session.apply(SessionCommand::Next).unwrap();
        }
        assert_eq!(session.current(), 2);
        assert!(session.is_last());

        session.apply(SessionCommand::Jump(1)).unwrap();
        assert_eq!(session.current(), 1);
        assert_eq!(
            session.apply(SessionCommand::Jump(3)),
            Err(SessionError::NoSuchQuestion { number: 4, total: 3 })
        );
    }

    #[test]
    fn answers_overwrite_and_clear() {
        let qs = questions(2);
        let mut session = TestSession::new(&qs, SECONDS_PER_QUESTION);

        session.apply(SessionCommand::Select(1)).unwrap();
        session.apply(SessionCommand::Select(2)).unwrap();
        assert_eq!(session.answers().get(0), Some(2));

        assert_eq!(
            session.apply(SessionCommand::Select(4)),
            Err(SessionError::NoSuchOption('E'))
        );

        session.apply(SessionCommand::Clear).unwrap();
        assert!(session.answers().is_empty());
        assert_eq!(session.apply(SessionCommand::Submit), Ok(Flow::Submit));
    }

    #[tokio::test(start_paused = true)]
    async fn submit_ends_session_with_answers() {
        let qs = questions(3);
        let (tx, mut rx) = mpsc::channel(16);
        for line in ["b", "n", "c", "s"] {
            tx.send(line.to_string()).await.unwrap();
        }

        let submitted = administer(
            TestSession::new(&qs, SECONDS_PER_QUESTION),
            &mut rx,
            &NoopObserver,
        )
        .await;

        assert_eq!(submitted.reason, SubmitReason::Submitted);
        assert_eq!(submitted.answers, [(0, 1), (1, 2)].into_iter().collect::<AnswerSheet>());
        assert_eq!(submitted.seconds_left, 3 * SECONDS_PER_QUESTION);
    }

    #[tokio::test(start_paused = true)]
    async fn time_up_submits_answers_recorded_so_far() {
        let qs = questions(2);
        let (tx, mut rx) = mpsc::channel(16);
        // Answer the first question only; the last one stays unanswered.
        tx.send("a".to_string()).await.unwrap();
        tx.send("n".to_string()).await.unwrap();

        let observer = RecordingObserver::default();
        let started = Instant::now();
        let submitted = administer(TestSession::new(&qs, 3), &mut rx, &observer).await;

        assert_eq!(submitted.reason, SubmitReason::TimeUp);
        assert_eq!(submitted.seconds_left, 0);
        assert_eq!(submitted.answers, [(0, 0)].into_iter().collect::<AnswerSheet>());
        assert_eq!(started.elapsed(), Duration::from_secs(6));
        assert_eq!(*observer.ticks.lock().unwrap(), vec![5, 4, 3, 2, 1]);

        drop(tx);
    }

    #[tokio::test(start_paused = true)]
    async fn closed_input_finishes_session() {
        let qs = questions(1);
        let (tx, mut rx) = mpsc::channel(4);
        tx.send("c".to_string()).await.unwrap();
        tx.send("d".to_string()).await.unwrap();
        drop(tx);

        let submitted = administer(
            TestSession::new(&qs, SECONDS_PER_QUESTION),
            &mut rx,
            &NoopObserver,
        )
        .await;
        assert_eq!(submitted.reason, SubmitReason::InputClosed);
        assert_eq!(submitted.answers.get(0), Some(3));
    }

    #[tokio::test(start_paused = true)]
    async fn bad_commands_are_reported_not_fatal() {
        let qs = questions(1);
        let (tx, mut rx) = mpsc::channel(4);
        tx.send("xyz".to_string()).await.unwrap();
        tx.send("g 9".to_string()).await.unwrap();
        tx.send("s".to_string()).await.unwrap();

        let observer = RecordingObserver::default();
        let submitted = administer(
            TestSession::new(&qs, SECONDS_PER_QUESTION),
            &mut rx,
            &observer,
        )
        .await;

        assert_eq!(submitted.reason, SubmitReason::Submitted);
        assert_eq!(observer.rejected.lock().unwrap().len(), 2);
    }
}
