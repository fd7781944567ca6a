//! The `examprep syllabus` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use examprep_core::model::{ClassLevel, ExamType, Subject};
use examprep_providers::config::load_config_from;

use crate::commands::load_configured_syllabus;

const ALL_SUBJECTS: [Subject; 4] = [
    Subject::Physics,
    Subject::Chemistry,
    Subject::Biology,
    Subject::Mathematics,
];

pub fn execute(
    exam: Option<ExamType>,
    subject: Option<Subject>,
    class: Option<ClassLevel>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let syllabus = load_configured_syllabus(&config)?;

    let subjects: Vec<Subject> = match (exam, subject) {
        (Some(exam), Some(subject)) => {
            anyhow::ensure!(
                exam.subjects().contains(&subject),
                "{subject} is not examined in {exam}"
            );
            vec![subject]
        }
        (Some(exam), None) => exam.subjects().to_vec(),
        (None, Some(subject)) => vec![subject],
        (None, None) => ALL_SUBJECTS.to_vec(),
    };
    let classes: Vec<ClassLevel> = match class {
        Some(class) => vec![class],
        None => ClassLevel::ALL.to_vec(),
    };

    let mut table = Table::new();
    table.set_header(vec!["Subject", "Class", "#", "Chapter", "Topics"]);

    let mut rows = 0;
    for subject in &subjects {
        for class in &classes {
            for (i, chapter) in syllabus.chapters(*subject, *class).iter().enumerate() {
                table.add_row(vec![
                    Cell::new(subject),
                    Cell::new(class),
                    Cell::new(i + 1),
                    Cell::new(&chapter.name),
                    Cell::new(chapter.topics.join(", ")),
                ]);
                rows += 1;
            }
        }
    }

    if rows == 0 {
        println!("No chapters found.");
    } else {
        println!("{table}");
        println!("{rows} chapters");
    }

    Ok(())
}
