//! NCERT syllabus catalogue.
//!
//! Chapters and topics per subject and class, loaded from TOML. A default
//! catalogue is compiled into the binary; a custom one can be loaded from a
//! file with the same layout.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::model::{ClassLevel, Subject, TestConfig, MAX_QUESTION_COUNT};

const BUILTIN_SYLLABUS: &str = include_str!("syllabus.toml");

/// Intermediate TOML structure for syllabus files.
#[derive(Debug, Deserialize)]
struct TomlSyllabusFile {
    #[serde(default)]
    chapter: Vec<TomlChapter>,
}

#[derive(Debug, Deserialize)]
struct TomlChapter {
    subject: String,
    class: String,
    name: String,
    #[serde(default)]
    topics: Vec<String>,
}

/// A syllabus chapter with its ordered topics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chapter {
    pub subject: Subject,
    pub class_level: ClassLevel,
    pub name: String,
    pub topics: Vec<String>,
}

impl Chapter {
    /// Canonical spelling of a topic in this chapter, matched case-insensitively.
    pub fn topic(&self, name: &str) -> Option<&str> {
        let name = name.trim();
        self.topics
            .iter()
            .find(|t| t.eq_ignore_ascii_case(name))
            .map(String::as_str)
    }
}

/// The chapter catalogue, in file order.
#[derive(Debug, Clone)]
pub struct Syllabus {
    chapters: Vec<Chapter>,
}

impl Syllabus {
    /// The catalogue shipped with examprep.
    pub fn builtin() -> Result<Self> {
        parse_syllabus_str(BUILTIN_SYLLABUS, Path::new("<builtin syllabus>"))
    }

    /// Chapters for a subject and class, in syllabus order.
    pub fn chapters(&self, subject: Subject, class_level: ClassLevel) -> Vec<&Chapter> {
        self.chapters
            .iter()
            .filter(|c| c.subject == subject && c.class_level == class_level)
            .collect()
    }

    /// Look up a chapter by name (case-insensitive).
    pub fn chapter(&self, subject: Subject, class_level: ClassLevel, name: &str) -> Option<&Chapter> {
        let name = name.trim();
        self.chapters.iter().find(|c| {
            c.subject == subject && c.class_level == class_level && c.name.eq_ignore_ascii_case(name)
        })
    }

    /// Topics of a chapter; empty if the chapter is unknown.
    pub fn topics(&self, subject: Subject, class_level: ClassLevel, chapter: &str) -> &[String] {
        self.chapter(subject, class_level, chapter)
            .map(|c| c.topics.as_slice())
            .unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.chapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chapters.is_empty()
    }

    /// Check a configuration against the catalogue and normalize chapter and
    /// topic names to their canonical spelling.
    pub fn resolve(&self, config: &TestConfig) -> Result<TestConfig> {
        anyhow::ensure!(
            config.exam_type.subjects().contains(&config.subject),
            "{} is not examined in {} (available: {})",
            config.subject,
            config.exam_type,
            config
                .exam_type
                .subjects()
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        );
        anyhow::ensure!(
            (1..=MAX_QUESTION_COUNT).contains(&config.question_count),
            "question count must be between 1 and {MAX_QUESTION_COUNT}, got {}",
            config.question_count
        );

        let chapter = self
            .chapter(config.subject, config.class_level, &config.chapter)
            .with_context(|| {
                format!(
                    "unknown chapter '{}' for {} class {}",
                    config.chapter, config.subject, config.class_level
                )
            })?;

        let topic = match config.topic.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(wanted) => {
                let topic = chapter.topic(wanted).with_context(|| {
                    format!("unknown topic '{wanted}' in chapter '{}'", chapter.name)
                })?;
                Some(topic.to_string())
            }
        };

        Ok(TestConfig {
            chapter: chapter.name.clone(),
            topic,
            ..config.clone()
        })
    }
}

/// Parse a syllabus file.
pub fn load_syllabus(path: &Path) -> Result<Syllabus> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read syllabus file: {}", path.display()))?;

    parse_syllabus_str(&content, path)
}

/// Parse a TOML string into a `Syllabus`.
pub fn parse_syllabus_str(content: &str, source_path: &Path) -> Result<Syllabus> {
    let parsed: TomlSyllabusFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let chapters = parsed
        .chapter
        .into_iter()
        .map(|c| {
            let subject: Subject = c.subject.parse().map_err(|e: String| anyhow::anyhow!(e))?;
            let class_level: ClassLevel =
                c.class.parse().map_err(|e: String| anyhow::anyhow!(e))?;
            anyhow::ensure!(!c.name.trim().is_empty(), "chapter name is empty");

            Ok(Chapter {
                subject,
                class_level,
                name: c.name,
                topics: c.topics,
            })
        })
        .collect::<Result<Vec<_>>>()
        .with_context(|| format!("invalid chapter in {}", source_path.display()))?;

    let mut seen = std::collections::HashSet::new();
    for c in &chapters {
        if !seen.insert((c.subject, c.class_level, c.name.to_lowercase())) {
            tracing::warn!(
                "duplicate chapter '{}' for {} class {} in {}",
                c.name,
                c.subject,
                c.class_level,
                source_path.display()
            );
        }
    }

    Ok(Syllabus { chapters })
}
