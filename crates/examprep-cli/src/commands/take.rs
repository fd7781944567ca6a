//! The `examprep take` command: home, configuration, test and results
//! screens in a loop.

use std::path::PathBuf;

use anyhow::Result;

use examprep_core::error::generation_failure_message;
use examprep_core::model::{
    ClassLevel, Difficulty, ExamType, TestConfig, TestPaper, MAX_QUESTION_COUNT,
    QUESTION_COUNT_CHOICES,
};
use examprep_core::report::TestReport;
use examprep_core::service::QuestionService;
use examprep_core::session::{administer, format_clock, SubmitReason, TestSession};
use examprep_core::syllabus::Syllabus;
use examprep_providers::config::load_config_from;

use crate::commands::{
    args_complete, build_service, config_from_args, load_configured_syllabus, save_report,
};
use crate::console::{print_answer_key, print_score_summary, ConsoleObserver, Input, Pick};
use crate::TestArgs;

enum Screen {
    Home,
    Config(ExamType),
    Generate(TestConfig),
    Test(TestPaper),
    Results(Box<TestReport>),
}

#[derive(Clone, Copy)]
enum AfterResults {
    Retake,
    NewTest,
    Home,
}

impl AfterResults {
    const ALL: [AfterResults; 3] = [AfterResults::Retake, AfterResults::NewTest, AfterResults::Home];

    fn label(&self) -> &'static str {
        match self {
            AfterResults::Retake => "Retake this test",
            AfterResults::NewTest => "New test",
            AfterResults::Home => "Back to home",
        }
    }
}

macro_rules! pick {
    ($choice:expr) => {
        match $choice {
            Pick::Value(value) => value,
            Pick::Back => return Ok(Pick::Back),
            Pick::Quit => return Ok(Pick::Quit),
        }
    };
}

pub async fn execute(
    args: TestArgs,
    paper_path: Option<PathBuf>,
    provider: Option<String>,
    model: Option<String>,
    output: Option<PathBuf>,
    format: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let syllabus = load_configured_syllabus(&config)?;
    let seconds_per_question = config.seconds_per_question;
    anyhow::ensure!(seconds_per_question >= 1, "seconds_per_question must be at least 1");

    let mut service: Option<QuestionService> = None;
    let mut input = Input::from_stdin();

    let mut screen = if let Some(path) = &paper_path {
        let paper = TestPaper::load_json(path)?;
        anyhow::ensure!(!paper.questions.is_empty(), "test paper {} has no questions", path.display());
        Screen::Test(paper)
    } else if args_complete(&args) {
        Screen::Generate(config_from_args(&args, &syllabus)?)
    } else if let Some(exam) = args.exam {
        Screen::Config(exam)
    } else {
        Screen::Home
    };
    // Flags only pre-fill the first configuration step.
    let mut prefill = Some(args);

    loop {
        screen = match screen {
            Screen::Home => {
                println!("\nexamprep: AI-generated practice tests");
                match input
                    .choose(
                        "Choose your exam (q = quit):",
                        &ExamType::ALL,
                        |exam| format!("{exam}: {}", exam.tagline()),
                        None,
                    )
                    .await
                {
                    Pick::Value(exam) => Screen::Config(exam),
                    Pick::Back => Screen::Home,
                    Pick::Quit => break,
                }
            }

            Screen::Config(exam) => {
                let args = prefill.take().unwrap_or_default();
                match configure(&mut input, &syllabus, exam, &args, seconds_per_question).await {
                    Ok(Pick::Value(test_config)) => Screen::Generate(test_config),
                    Ok(Pick::Back) => Screen::Home,
                    Ok(Pick::Quit) => break,
                    Err(e) => {
                        println!("{e:#}");
                        Screen::Config(exam)
                    }
                }
            }

            Screen::Generate(test_config) => {
                prefill = None;
                let generator = match service.take() {
                    Some(generator) => generator,
                    None => build_service(&config, provider.as_deref(), model.as_deref())?,
                };

                println!("\nGenerating test: {} ...", test_config.headline());
                let generated = generator.generate_paper(&test_config).await;
                service = Some(generator);

                match generated {
                    Ok(paper) => {
                        if paper.questions.len() < test_config.question_count as usize {
                            println!(
                                "Only {} of {} questions could be generated.",
                                paper.questions.len(),
                                test_config.question_count
                            );
                        }
                        Screen::Test(paper)
                    }
                    Err(e) => {
                        println!("{}", generation_failure_message(&e));
                        Screen::Config(test_config.exam_type)
                    }
                }
            }

            Screen::Test(paper) => {
                let session = TestSession::new(&paper.questions, seconds_per_question);
                println!(
                    "\n{}: {} questions, {} on the clock.",
                    paper.config.headline(),
                    paper.questions.len(),
                    session.countdown()
                );
                let submitted = administer(session, input.lines(), &ConsoleObserver).await;
                let report = TestReport::new(paper, submitted, seconds_per_question);

                if let Some(dir) = &output {
                    save_report(&report, dir, &format)?;
                }
                Screen::Results(Box::new(report))
            }

            Screen::Results(report) => {
                print_score_summary(&report);
                print_answer_key(&report);

                if report.submission.reason == SubmitReason::InputClosed {
                    break;
                }

                match input
                    .choose(
                        "What next? (q = quit)",
                        &AfterResults::ALL,
                        |choice| choice.label().to_string(),
                        None,
                    )
                    .await
                {
                    Pick::Value(AfterResults::Retake) => Screen::Test(report.paper),
                    Pick::Value(AfterResults::NewTest) => Screen::Config(report.paper.config.exam_type),
                    Pick::Value(AfterResults::Home) | Pick::Back => Screen::Home,
                    Pick::Quit => break,
                }
            }
        };
    }

    Ok(())
}

/// The configuration step. Flags that are already valid skip their prompt.
async fn configure(
    input: &mut Input,
    syllabus: &Syllabus,
    exam: ExamType,
    args: &TestArgs,
    seconds_per_question: u64,
) -> Result<Pick<TestConfig>> {
    println!("\n{exam} test configuration (b = back, q = quit)");

    let subject = match args.subject.filter(|s| exam.subjects().contains(s)) {
        Some(subject) => subject,
        None => pick!(
            input
                .choose("Subject:", exam.subjects(), ToString::to_string, Some(0))
                .await
        ),
    };

    let class_level = match args.class {
        Some(class_level) => class_level,
        None => pick!(
            input
                .choose(
                    "Class:",
                    &ClassLevel::ALL,
                    |c| format!("Class {c}"),
                    Some(0),
                )
                .await
        ),
    };

    let chapters = syllabus.chapters(subject, class_level);
    anyhow::ensure!(
        !chapters.is_empty(),
        "the syllabus has no {subject} chapters for class {class_level}"
    );
    let chapter = match args
        .chapter
        .as_deref()
        .and_then(|name| syllabus.chapter(subject, class_level, name))
    {
        Some(chapter) => chapter,
        None => pick!(
            input
                .choose("Chapter:", &chapters, |c| c.name.clone(), None)
                .await
        ),
    };

    let prefilled_topic = args.topic.as_deref().and_then(|name| chapter.topic(name));
    if let (Some(name), None) = (&args.topic, prefilled_topic) {
        println!("'{name}' is not a topic of {}.", chapter.name);
    }
    let topic = match prefilled_topic {
        Some(topic) => Some(topic.to_string()),
        None if chapter.topics.is_empty() => None,
        None => {
            let options: Vec<Option<&String>> = std::iter::once(None)
                .chain(chapter.topics.iter().map(Some))
                .collect();
            pick!(
                input
                    .choose(
                        "Topic:",
                        &options,
                        |t| match t {
                            Some(topic) => topic.to_string(),
                            None => "Whole chapter".to_string(),
                        },
                        Some(0),
                    )
                    .await
            )
            .cloned()
        }
    };

    let difficulty = match args.difficulty {
        Some(difficulty) => difficulty,
        None => {
            let default = Difficulty::ALL
                .iter()
                .position(|d| *d == Difficulty::default());
            pick!(
                input
                    .choose("Difficulty:", &Difficulty::ALL, ToString::to_string, default)
                    .await
            )
        }
    };

    let question_count = match args.count.filter(|n| (1..=MAX_QUESTION_COUNT).contains(n)) {
        Some(count) => count,
        None => pick!(
            input
                .choose(
                    "Number of questions:",
                    &QUESTION_COUNT_CHOICES,
                    |n| {
                        let budget = u64::from(*n).saturating_mul(seconds_per_question);
                        format!("{n} questions ({})", format_clock(budget))
                    },
                    Some(0),
                )
                .await
        ),
    };

    let resolved = syllabus.resolve(&TestConfig {
        exam_type: exam,
        subject,
        class_level,
        chapter: chapter.name.clone(),
        topic,
        difficulty,
        question_count,
    })?;
    Ok(Pick::Value(resolved))
}
