//! Core trait definitions for question-generating LLM providers.
//!
//! The async trait is implemented by the `examprep-providers` crate; the
//! prompt and response schema live here so every provider sends the same
//! request.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::model::{TestConfig, OPTIONS_PER_QUESTION};

// ---------------------------------------------------------------------------
// Question generator trait
// ---------------------------------------------------------------------------

/// Trait for LLM backends that produce multiple-choice questions.
#[async_trait]
pub trait QuestionGenerator: Send + Sync {
    /// Human-readable provider name (e.g. "gemini").
    fn name(&self) -> &str;

    /// Send the prompt and return the raw model output.
    async fn generate(&self, request: &GenerateRequest) -> anyhow::Result<GenerateResponse>;

    /// List available models for this provider.
    fn available_models(&self) -> Vec<ModelInfo>;
}

/// Request sent to a question generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    /// Model identifier (e.g. "gemini-2.5-flash").
    pub model: String,
    /// The natural-language prompt.
    pub prompt: String,
    /// JSON schema the response must follow.
    pub response_schema: serde_json::Value,
    /// Sampling temperature.
    pub temperature: f64,
    /// Maximum tokens to generate, if the provider supports a cap.
    #[serde(default)]
    pub max_tokens: Option<u32>,
}

/// Raw response from a question generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    /// The text the model returned, expected to be JSON.
    pub content: String,
    /// Model that actually generated the response.
    pub model: String,
    /// Token usage.
    pub token_usage: TokenUsage,
    /// Latency in milliseconds.
    pub latency_ms: u64,
}

/// Token usage reported by the provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Information about an available model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Model identifier.
    pub id: String,
    /// Human-readable model name.
    pub name: String,
    /// Provider name.
    pub provider: String,
    /// Maximum context window size in tokens.
    pub max_context: u32,
}

// ---------------------------------------------------------------------------
// Prompt and schema
// ---------------------------------------------------------------------------

/// Default model for question generation.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Default sampling temperature.
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

/// Build the generation prompt for a test configuration.
pub fn build_prompt(config: &TestConfig) -> String {
    let topic_instruction = match config.topic.as_deref() {
        Some(topic) if !topic.trim().is_empty() => format!(
            "Topic Focus: STRICTLY generate questions ONLY related to the subtopic: \"{topic}\". \
             Do not deviate to other parts of the chapter."
        ),
        _ => format!(
            "Topic Focus: Comprehensive coverage of the entire chapter \"{}\". \
             Include a mix of key concepts from all subtopics.",
            config.chapter
        ),
    };

    format!(
        "Generate {count} multiple-choice questions for the {exam} exam.\n\
         Subject: {subject}\n\
         Class: {class}\n\
         Chapter: {chapter}\n\
         Difficulty: {difficulty}\n\
         {topic_instruction}\n\
         \n\
         Strictly follow the {exam} pattern.\n\
         Use CBSE Class 11 & 12 NCERT syllabus as the primary reference.\n\
         Focus on conceptual understanding and application of principles.\n\
         Provide exactly {options} options per question.\n\
         Ensure the questions are high quality, accurate, and relevant.\n\
         Return strictly JSON.",
        count = config.question_count,
        exam = config.exam_type,
        subject = config.subject,
        class = config.class_level,
        chapter = config.chapter,
        difficulty = config.difficulty,
        options = OPTIONS_PER_QUESTION,
    )
}

/// JSON schema for the expected response: an array of questions.
///
/// Uses the OpenAPI subset understood by structured-output APIs.
pub fn question_response_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "text": {
                    "type": "STRING",
                    "description": "The question text."
                },
                "options": {
                    "type": "ARRAY",
                    "items": { "type": "STRING" },
                    "description": "A list of exactly 4 possible answers."
                },
                "correctAnswerIndex": {
                    "type": "INTEGER",
                    "description": "The index (0-3) of the correct answer in the options array."
                },
                "explanation": {
                    "type": "STRING",
                    "description": "A detailed explanation of why the answer is correct."
                }
            },
            "required": ["text", "options", "correctAnswerIndex", "explanation"]
        }
    })
}

// ---------------------------------------------------------------------------
// Markdown JSON extraction
// ---------------------------------------------------------------------------

/// Extract a JSON payload from a model response.
///
/// Handles:
/// - A ```json``` fenced block (first one wins)
/// - A generic ``` block if no json-tagged block exists
/// - Raw JSON with no fences (returned trimmed)
pub fn extract_json_from_markdown(response: &str) -> String {
    let mut json_block: Option<String> = None;
    let mut generic_block: Option<String> = None;
    let mut in_block = false;
    let mut is_json_block = false;
    let mut is_generic_block = false;
    let mut current_block = String::new();

    for line in response.lines() {
        let trimmed = line.trim();

        if !in_block && trimmed.starts_with("```") {
            in_block = true;
            let lang = trimmed.trim_start_matches('`').trim().to_lowercase();
            is_json_block = lang == "json";
            is_generic_block = lang.is_empty();
            current_block.clear();
            continue;
        }

        if in_block && trimmed == "```" {
            in_block = false;
            if is_json_block && json_block.is_none() {
                json_block = Some(current_block.clone());
            } else if is_generic_block && generic_block.is_none() {
                generic_block = Some(current_block.clone());
            }
            current_block.clear();
            continue;
        }

        if in_block {
            if !current_block.is_empty() {
                current_block.push('\n');
            }
            current_block.push_str(line);
        }
    }

    // Truncated (unclosed) block
    if in_block && !current_block.is_empty() {
        if is_json_block && json_block.is_none() {
            json_block = Some(current_block);
        } else if is_generic_block && generic_block.is_none() {
            generic_block = Some(current_block);
        }
    }

    json_block
        .or(generic_block)
        .unwrap_or_else(|| response.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ClassLevel, Difficulty, ExamType, Subject};

    fn config(topic: Option<&str>) -> TestConfig {
        TestConfig {
            exam_type: ExamType::Jee,
            subject: Subject::Physics,
            class_level: ClassLevel::Twelve,
            chapter: "Current Electricity".into(),
            topic: topic.map(Into::into),
            difficulty: Difficulty::Hard,
            question_count: 25,
        }
    }

    #[test]
    fn prompt_embeds_configuration() {
        let prompt = build_prompt(&config(None));
        assert!(prompt.contains("Generate 25 multiple-choice questions for the JEE exam."));
        assert!(prompt.contains("Subject: Physics"));
        assert!(prompt.contains("Class: 12"));
        assert!(prompt.contains("Chapter: Current Electricity"));
        assert!(prompt.contains("Difficulty: Hard"));
        assert!(prompt.contains("Strictly follow the JEE pattern."));
        assert!(prompt.contains("exactly 4 options"));
    }

    #[test]
    fn prompt_topic_instruction() {
        let whole = build_prompt(&config(None));
        assert!(whole.contains("Comprehensive coverage of the entire chapter \"Current Electricity\""));

        let focused = build_prompt(&config(Some("Kirchhoff's Rules")));
        assert!(focused.contains("ONLY related to the subtopic: \"Kirchhoff's Rules\""));
        assert!(!focused.contains("Comprehensive coverage"));
    }

    #[test]
    fn schema_requires_all_fields() {
        let schema = question_response_schema();
        assert_eq!(schema["type"], "ARRAY");
        let required = schema["items"]["required"].as_array().unwrap();
        assert_eq!(required.len(), 4);
        assert!(required.iter().any(|f| f == "correctAnswerIndex"));
    }

    #[test]
    fn extract_fenced_json() {
        let input = "Here you go:\n\n```json\n[{\"text\": \"q\"}]\n```\n\nGood luck!";
        assert_eq!(extract_json_from_markdown(input), "[{\"text\": \"q\"}]");
    }

    #[test]
    fn extract_generic_block_fallback() {
        let input = "```\n[]\n```";
        assert_eq!(extract_json_from_markdown(input), "[]");
    }

    #[test]
    fn extract_prefers_json_over_generic() {
        let input = "```\nnot this\n```\n\n```json\n{\"questions\": []}\n```\n";
        assert_eq!(extract_json_from_markdown(input), "{\"questions\": []}");
    }

    #[test]
    fn extract_raw_json_passthrough() {
        let input = "  [{\"text\": \"raw\"}]\n";
        assert_eq!(extract_json_from_markdown(input), "[{\"text\": \"raw\"}]");
    }

    #[test]
    fn extract_truncated_block() {
        let input = "```json\n[{\"text\": \"cut";
        assert_eq!(extract_json_from_markdown(input), "[{\"text\": \"cut");
    }
}
