//! The `examprep init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("examprep.toml").exists() {
        println!("examprep.toml already exists, skipping.");
    } else {
        std::fs::write("examprep.toml", SAMPLE_CONFIG)?;
        println!("Created examprep.toml");
    }

    println!("\nNext steps:");
    println!("  1. Export your Gemini key: export API_KEY=...");
    println!("  2. Browse chapters: examprep syllabus --exam neet");
    println!("  3. Start a test: examprep take");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# examprep configuration

default_provider = "gemini"
default_model = "gemini-2.5-flash"
temperature = 0.7
seconds_per_question = 72
output_dir = "./examprep-results"
# syllabus_path = "my-syllabus.toml"

[providers.gemini]
type = "gemini"
api_key = "${API_KEY}"

[providers.openai]
type = "openai"
api_key = "${OPENAI_API_KEY}"

# Offline provider with synthetic questions, handy for trying the flow.
[providers.mock]
type = "mock"
"#;
