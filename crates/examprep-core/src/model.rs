//! Core data model types for examprep.
//!
//! These are the fundamental types the whole system uses to describe a
//! practice test: what was asked for, what came back, and what the user
//! answered.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Every question carries exactly this many options.
pub const OPTIONS_PER_QUESTION: usize = 4;

/// Question counts offered by the configuration step.
pub const QUESTION_COUNT_CHOICES: [u32; 4] = [10, 25, 50, 100];

/// Upper bound accepted for a requested question count.
pub const MAX_QUESTION_COUNT: u32 = 100;

/// The target examination track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ExamType {
    Neet,
    Jee,
}

impl ExamType {
    pub const ALL: [ExamType; 2] = [ExamType::Neet, ExamType::Jee];

    /// Subjects examined in this track, in display order.
    pub fn subjects(&self) -> &'static [Subject] {
        match self {
            ExamType::Neet => &[Subject::Physics, Subject::Chemistry, Subject::Biology],
            ExamType::Jee => &[Subject::Physics, Subject::Chemistry, Subject::Mathematics],
        }
    }

    /// One-line blurb shown on the home screen.
    pub fn tagline(&self) -> &'static str {
        match self {
            ExamType::Neet => "Biology, Physics, Chemistry. Comprehensive coverage of Class 11 & 12 NCERT syllabus.",
            ExamType::Jee => "Mathematics, Physics, Chemistry. Advanced problem solving for Mains & Advanced.",
        }
    }
}

impl fmt::Display for ExamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExamType::Neet => write!(f, "NEET"),
            ExamType::Jee => write!(f, "JEE"),
        }
    }
}

impl FromStr for ExamType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "neet" => Ok(ExamType::Neet),
            "jee" => Ok(ExamType::Jee),
            other => Err(format!("unknown exam type: {other}")),
        }
    }
}

/// A syllabus subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Subject {
    Physics,
    Chemistry,
    Biology,
    Mathematics,
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subject::Physics => write!(f, "Physics"),
            Subject::Chemistry => write!(f, "Chemistry"),
            Subject::Biology => write!(f, "Biology"),
            Subject::Mathematics => write!(f, "Mathematics"),
        }
    }
}

impl FromStr for Subject {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "physics" | "phy" => Ok(Subject::Physics),
            "chemistry" | "chem" => Ok(Subject::Chemistry),
            "biology" | "bio" => Ok(Subject::Biology),
            "mathematics" | "maths" | "math" => Ok(Subject::Mathematics),
            other => Err(format!("unknown subject: {other}")),
        }
    }
}

/// School class the chapter belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClassLevel {
    #[serde(rename = "11")]
    Eleven,
    #[serde(rename = "12")]
    Twelve,
}

impl ClassLevel {
    pub const ALL: [ClassLevel; 2] = [ClassLevel::Eleven, ClassLevel::Twelve];
}

impl fmt::Display for ClassLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassLevel::Eleven => write!(f, "11"),
            ClassLevel::Twelve => write!(f, "12"),
        }
    }
}

impl FromStr for ClassLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().trim_start_matches("class").trim() {
            "11" | "xi" => Ok(ClassLevel::Eleven),
            "12" | "xii" => Ok(ClassLevel::Twelve),
            other => Err(format!("unknown class level: {other}")),
        }
    }
}

/// Requested difficulty of the generated questions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "Easy"),
            Difficulty::Medium => write!(f, "Medium"),
            Difficulty::Hard => write!(f, "Hard"),
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty: {other}")),
        }
    }
}

/// A single multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    /// Unique identifier within the paper.
    pub id: String,
    /// The question text.
    pub text: String,
    /// Exactly four answer options, in display order.
    pub options: Vec<String>,
    /// Index (0-3) of the correct option.
    pub correct_answer_index: usize,
    /// Why the correct option is correct.
    pub explanation: String,
}

impl Question {
    /// The text of the correct option, if the index is in range.
    pub fn correct_option(&self) -> Option<&str> {
        self.options
            .get(self.correct_answer_index)
            .map(String::as_str)
    }

    /// Check the shape every question must have: non-empty text, exactly
    /// four non-empty options, and a correct index among them.
    pub fn validate(&self) -> Result<(), String> {
        if self.text.trim().is_empty() {
            return Err("question text is missing".into());
        }
        if self.options.len() != OPTIONS_PER_QUESTION {
            return Err(format!(
                "expected {OPTIONS_PER_QUESTION} options, got {}",
                self.options.len()
            ));
        }
        if self.options.iter().any(|o| o.trim().is_empty()) {
            return Err("an option is empty".into());
        }
        if self.correct_answer_index >= OPTIONS_PER_QUESTION {
            return Err(format!(
                "correct answer index {} is out of range",
                self.correct_answer_index
            ));
        }
        Ok(())
    }
}

/// What the user asked for in the configuration step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestConfig {
    pub exam_type: ExamType,
    pub subject: Subject,
    pub class_level: ClassLevel,
    pub chapter: String,
    /// Empty means the whole chapter.
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub difficulty: Difficulty,
    pub question_count: u32,
}

impl TestConfig {
    /// Short description used in headers and logs.
    pub fn headline(&self) -> String {
        let scope = match &self.topic {
            Some(topic) => format!("{} / {}", self.chapter, topic),
            None => self.chapter.clone(),
        };
        format!(
            "{} {} (Class {}) - {} [{}]",
            self.exam_type, self.subject, self.class_level, scope, self.difficulty
        )
    }
}

/// A generated test: the questions plus what produced them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestPaper {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub config: TestConfig,
    /// Model that generated the questions.
    #[serde(default)]
    pub model: String,
    pub questions: Vec<Question>,
}

impl TestPaper {
    /// Save the paper as pretty JSON.
    pub fn save_json(&self, path: &std::path::Path) -> anyhow::Result<()> {
        use anyhow::Context;

        let json = serde_json::to_string_pretty(self).context("failed to serialize test paper")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write test paper to {}", path.display()))
    }

    /// Load a paper previously written with [`TestPaper::save_json`].
    ///
    /// Every question must pass [`Question::validate`].
    pub fn load_json(path: &std::path::Path) -> anyhow::Result<Self> {
        use anyhow::Context;

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read test paper from {}", path.display()))?;
        let paper: Self =
            serde_json::from_str(&content).context("failed to parse test paper JSON")?;

        for (position, question) in paper.questions.iter().enumerate() {
            question
                .validate()
                .map_err(anyhow::Error::msg)
                .with_context(|| {
                    format!(
                        "question {} ({}) in {} is invalid",
                        position + 1,
                        question.id,
                        path.display()
                    )
                })?;
        }
        Ok(paper)
    }
}

/// Answer mapping: question position to selected option index.
///
/// A position with no entry was skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerSheet(BTreeMap<usize, usize>);

impl AnswerSheet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record (or overwrite) the answer for a position.
    pub fn select(&mut self, position: usize, option: usize) {
        self.0.insert(position, option);
    }

    /// Forget the answer for a position, making it skipped again.
    pub fn clear(&mut self, position: usize) -> Option<usize> {
        self.0.remove(&position)
    }

    pub fn get(&self, position: usize) -> Option<usize> {
        self.0.get(&position).copied()
    }

    /// Number of positions with an entry.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.0.iter().map(|(&q, &o)| (q, o))
    }
}

impl FromIterator<(usize, usize)> for AnswerSheet {
    fn from_iter<I: IntoIterator<Item = (usize, usize)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl FromStr for AnswerSheet {
    type Err = String;

    /// Parse `"0:0,1:1,2:0"` (position:option, zero-based).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split(',')
            .map(str::trim)
            .filter(|pair| !pair.is_empty())
            .map(|pair| {
                let (q, o) = pair
                    .split_once(':')
                    .ok_or_else(|| format!("expected position:option, got '{pair}'"))?;
                let q = q
                    .trim()
                    .parse::<usize>()
                    .map_err(|_| format!("invalid question position: '{}'", q.trim()))?;
                let o = o
                    .trim()
                    .parse::<usize>()
                    .map_err(|_| format!("invalid option index: '{}'", o.trim()))?;
                Ok((q, o))
            })
            .collect()
    }
}

/// Letter shown for an option index (0 -> A).
pub fn option_label(index: usize) -> char {
    (b'A' + (index % 26) as u8) as char
}
