//! Subcommand implementations.

pub mod generate;
pub mod init;
pub mod list_models;
pub mod score;
pub mod syllabus;
pub mod take;

use std::path::Path;

use anyhow::{Context, Result};

use examprep_core::model::{TestConfig, QUESTION_COUNT_CHOICES};
use examprep_core::report::TestReport;
use examprep_core::service::{QuestionService, ServiceConfig};
use examprep_core::syllabus::{load_syllabus, Syllabus};
use examprep_providers::{create_provider, ExamprepConfig};
use examprep_report::write_html_report;

use crate::TestArgs;

/// The configured syllabus, or the built-in one.
pub(crate) fn load_configured_syllabus(config: &ExamprepConfig) -> Result<Syllabus> {
    match &config.syllabus_path {
        Some(path) => load_syllabus(path),
        None => Syllabus::builtin(),
    }
}

/// Question service for the chosen (or default) provider and model.
pub(crate) fn build_service(
    config: &ExamprepConfig,
    provider: Option<&str>,
    model: Option<&str>,
) -> Result<QuestionService> {
    let name = provider.unwrap_or(&config.default_provider);
    let provider_config = config.provider_config(name)?;
    let generator = create_provider(&provider_config);

    anyhow::ensure!(
        (0.0..=2.0).contains(&config.temperature),
        "temperature must be between 0.0 and 2.0"
    );

    let model = model.unwrap_or(&config.default_model);
    tracing::debug!(provider = name, model, "question service ready");

    Ok(QuestionService::new(
        generator,
        ServiceConfig {
            model: model.to_string(),
            temperature: config.temperature,
            ..ServiceConfig::default()
        },
    ))
}

/// Build a test configuration from flags alone.
///
/// Exam, subject, class and chapter are required; the rest have defaults.
pub(crate) fn config_from_args(args: &TestArgs, syllabus: &Syllabus) -> Result<TestConfig> {
    let exam_type = args.exam.context("--exam is required")?;
    let subject = args.subject.context("--subject is required")?;
    let class_level = args.class.context("--class is required")?;
    let chapter = args.chapter.clone().context("--chapter is required")?;

    syllabus.resolve(&TestConfig {
        exam_type,
        subject,
        class_level,
        chapter,
        topic: args.topic.clone(),
        difficulty: args.difficulty.unwrap_or_default(),
        question_count: args.count.unwrap_or(QUESTION_COUNT_CHOICES[0]),
    })
}

/// Whether every flag needed to skip the configuration prompts was given.
pub(crate) fn args_complete(args: &TestArgs) -> bool {
    args.exam.is_some() && args.subject.is_some() && args.class.is_some() && args.chapter.is_some()
}

/// Save a report in the requested formats (`json`, `html`, or `all`).
pub(crate) fn save_report(report: &TestReport, output: &Path, format: &str) -> Result<()> {
    std::fs::create_dir_all(output)
        .with_context(|| format!("failed to create output directory {}", output.display()))?;
    let timestamp = report.created_at.format("%Y-%m-%dT%H%M%S");

    let formats: Vec<&str> = if format == "all" {
        vec!["json", "html"]
    } else {
        format.split(',').map(str::trim).collect()
    };

    for fmt in &formats {
        match *fmt {
            "json" => {
                let path = output.join(format!("results-{timestamp}.json"));
                report.save_json(&path)?;
                eprintln!("Results saved to: {}", path.display());
            }
            "html" => {
                let path = output.join(format!("results-{timestamp}.html"));
                write_html_report(report, &path)?;
                eprintln!("HTML report: {}", path.display());
            }
            _ => {
                eprintln!("Unknown format: {fmt}");
            }
        }
    }

    Ok(())
}
