//! Question service.
//!
//! Ties a [`QuestionGenerator`] to the prompt, the response schema and the
//! response validation, producing a ready-to-administer [`TestPaper`].

use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use chrono::Utc;
use uuid::Uuid;

use crate::model::{TestConfig, TestPaper};
use crate::parser::parse_generated_questions;
use crate::traits::{
    build_prompt, extract_json_from_markdown, question_response_schema, GenerateRequest,
    QuestionGenerator, DEFAULT_MODEL, DEFAULT_TEMPERATURE,
};

/// Configuration for the question service.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Model identifier passed to the provider.
    pub model: String,
    /// Temperature for generation.
    pub temperature: f64,
    /// Optional output cap.
    pub max_tokens: Option<u32>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: None,
        }
    }
}

/// Generates test papers from a single provider.
pub struct QuestionService {
    provider: Arc<dyn QuestionGenerator>,
    config: ServiceConfig,
}

impl QuestionService {
    pub fn new(provider: Arc<dyn QuestionGenerator>, config: ServiceConfig) -> Self {
        Self { provider, config }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Ask the provider for questions and validate what comes back.
    ///
    /// One request, no retries; the caller decides what to tell the user.
    pub async fn generate_paper(&self, config: &TestConfig) -> Result<TestPaper> {
        let start = Instant::now();
        let created_at = Utc::now();

        let request = GenerateRequest {
            model: self.config.model.clone(),
            prompt: build_prompt(config),
            response_schema: question_response_schema(),
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        tracing::info!(
            provider = self.provider.name(),
            model = %request.model,
            count = config.question_count,
            "generating questions for {}",
            config.headline()
        );

        let response = match self.provider.generate(&request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!("error generating questions: {e:#}");
                return Err(e);
            }
        };

        let payload = extract_json_from_markdown(&response.content);
        let id_prefix = format!("q-{}", created_at.timestamp_millis());
        let parsed =
            match parse_generated_questions(&payload, config.question_count as usize, &id_prefix) {
                Ok(parsed) => parsed,
                Err(e) => {
                    tracing::error!("error parsing generated questions: {e}");
                    return Err(e.into());
                }
            };

        for w in &parsed.warnings {
            match w.item {
                Some(item) => tracing::warn!("dropped generated item {item}: {}", w.message),
                None => tracing::warn!("{}", w.message),
            }
        }

        tracing::info!(
            questions = parsed.questions.len(),
            tokens = response.token_usage.total_tokens,
            latency_ms = response.latency_ms,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "questions generated"
        );

        Ok(TestPaper {
            id: Uuid::new_v4(),
            created_at,
            config: config.clone(),
            model: response.model,
            questions: parsed.questions,
        })
    }
}
