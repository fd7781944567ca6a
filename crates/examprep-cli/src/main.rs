//! examprep CLI — timed NEET/JEE practice tests in the terminal.

use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand};

use examprep_core::model::{ClassLevel, Difficulty, ExamType, Subject};

mod commands;
mod console;

#[derive(Parser)]
#[command(
    name = "examprep",
    version,
    about = "Timed NEET/JEE practice tests generated by an LLM"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Test configuration flags shared by `take` and `generate`.
#[derive(Args, Debug, Clone, Default)]
pub struct TestArgs {
    /// Exam type: NEET or JEE
    #[arg(long)]
    exam: Option<ExamType>,

    /// Subject (e.g. physics, chem, bio, maths)
    #[arg(long)]
    subject: Option<Subject>,

    /// Class level: 11 or 12
    #[arg(long)]
    class: Option<ClassLevel>,

    /// Chapter name from the syllabus
    #[arg(long)]
    chapter: Option<String>,

    /// Topic within the chapter (default: whole chapter)
    #[arg(long)]
    topic: Option<String>,

    /// Difficulty: easy, medium, hard
    #[arg(long)]
    difficulty: Option<Difficulty>,

    /// Number of questions (1-100)
    #[arg(long)]
    count: Option<u32>,
}

#[derive(Subcommand)]
enum Commands {
    /// Take a timed test (interactive)
    Take {
        #[command(flatten)]
        test: TestArgs,

        /// Administer a saved test paper instead of generating one
        #[arg(long)]
        paper: Option<PathBuf>,

        /// Provider name from the config (default: config default_provider)
        #[arg(long)]
        provider: Option<String>,

        /// Model to generate with (default: config default_model)
        #[arg(long)]
        model: Option<String>,

        /// Save results to this directory
        #[arg(long)]
        output: Option<PathBuf>,

        /// Result formats to save: json, html, all
        #[arg(long, default_value = "json")]
        format: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Generate a test paper and save it as JSON
    Generate {
        #[command(flatten)]
        test: TestArgs,

        /// Provider name from the config
        #[arg(long)]
        provider: Option<String>,

        /// Model to generate with
        #[arg(long)]
        model: Option<String>,

        /// Output file (default: <output_dir>/paper-<timestamp>.json)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Score answers against a saved test paper
    Score {
        /// Test paper JSON
        #[arg(long)]
        paper: PathBuf,

        /// Answers as position:option pairs, zero-based (e.g. "0:0,1:2")
        #[arg(long, default_value = "")]
        answers: String,

        /// Print the answer key with explanations
        #[arg(long)]
        review: bool,

        /// Save results to this directory
        #[arg(long)]
        output: Option<PathBuf>,

        /// Result formats to save: json, html, all
        #[arg(long, default_value = "json")]
        format: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Browse the syllabus catalogue
    Syllabus {
        /// Only subjects examined in this exam
        #[arg(long)]
        exam: Option<ExamType>,

        /// Only this subject
        #[arg(long)]
        subject: Option<Subject>,

        /// Only this class
        #[arg(long)]
        class: Option<ClassLevel>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// List available models
    ListModels {
        /// Filter to specific provider
        #[arg(long)]
        provider: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create a starter config file
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("examprep=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Take {
            test,
            paper,
            provider,
            model,
            output,
            format,
            config,
        } => commands::take::execute(test, paper, provider, model, output, format, config).await,
        Commands::Generate {
            test,
            provider,
            model,
            output,
            config,
        } => commands::generate::execute(test, provider, model, output, config).await,
        Commands::Score {
            paper,
            answers,
            review,
            output,
            format,
            config,
        } => commands::score::execute(paper, answers, review, output, format, config),
        Commands::Syllabus {
            exam,
            subject,
            class,
            config,
        } => commands::syllabus::execute(exam, subject, class, config),
        Commands::ListModels { provider, config } => {
            commands::list_models::execute(provider, config)
        }
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
