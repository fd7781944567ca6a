//! The `examprep generate` command.

use std::path::PathBuf;

use anyhow::Result;

use examprep_core::error::generation_failure_message;
use examprep_providers::config::load_config_from;

use crate::commands::{build_service, config_from_args, load_configured_syllabus};
use crate::TestArgs;

pub async fn execute(
    args: TestArgs,
    provider: Option<String>,
    model: Option<String>,
    output: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let syllabus = load_configured_syllabus(&config)?;
    let test_config = config_from_args(&args, &syllabus)?;
    let service = build_service(&config, provider.as_deref(), model.as_deref())?;

    eprintln!(
        "Generating {} questions with {}/{}: {}",
        test_config.question_count,
        service.provider_name(),
        service.model(),
        test_config.headline()
    );

    let paper = match service.generate_paper(&test_config).await {
        Ok(paper) => paper,
        Err(e) => anyhow::bail!("{}\n  caused by: {e:#}", generation_failure_message(&e)),
    };

    let path = output.unwrap_or_else(|| {
        config.output_dir.join(format!(
            "paper-{}.json",
            paper.created_at.format("%Y-%m-%dT%H%M%S")
        ))
    });
    paper.save_json(&path)?;

    println!(
        "Saved {} questions to {}",
        paper.questions.len(),
        path.display()
    );
    println!("Take it with: examprep take --paper {}", path.display());

    Ok(())
}
