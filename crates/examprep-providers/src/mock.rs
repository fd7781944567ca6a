//! Mock provider for testing.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use examprep_core::model::OPTIONS_PER_QUESTION;
use examprep_core::traits::{
    GenerateRequest, GenerateResponse, ModelInfo, QuestionGenerator, TokenUsage,
};

/// A mock provider for exercising the test flow without real API calls.
///
/// By default it answers every request with as many well-formed questions as
/// the prompt asks for. Question `n` always has option `n % 4` correct.
pub struct MockProvider {
    /// Returned verbatim instead of synthesized questions.
    fixed_response: Option<String>,
    /// Number of calls made.
    call_count: AtomicU32,
    /// Last request received.
    last_request: Mutex<Option<GenerateRequest>>,
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockProvider {
    /// Create a mock that synthesizes questions.
    pub fn new() -> Self {
        Self {
            fixed_response: None,
            call_count: AtomicU32::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Create a mock that always returns the same response.
    pub fn with_fixed_response(response: &str) -> Self {
        Self {
            fixed_response: Some(response.to_string()),
            ..Self::new()
        }
    }

    /// Get the number of calls made to this provider.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Get the last request made to this provider.
    pub fn last_request(&self) -> Option<GenerateRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

/// Read the requested count from a prompt starting with "Generate N ...".
fn requested_count(prompt: &str) -> usize {
    prompt
        .split_whitespace()
        .skip_while(|word| *word != "Generate")
        .nth(1)
        .and_then(|n| n.parse().ok())
        .unwrap_or(1)
}

fn synthesize(count: usize) -> String {
    let questions: Vec<serde_json::Value> = (0..count)
        .map(|i| {
            let correct = i % OPTIONS_PER_QUESTION;
            serde_json::json!({
                "text": format!("Mock question {}?", i + 1),
                "options": (0..OPTIONS_PER_QUESTION)
                    .map(|o| format!("Option {}", o + 1))
                    .collect::<Vec<_>>(),
                "correctAnswerIndex": correct,
                "explanation": format!("Option {} is correct.", correct + 1),
            })
        })
        .collect();
    serde_json::Value::Array(questions).to_string()
}

#[async_trait]
impl QuestionGenerator for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn generate(&self, request: &GenerateRequest) -> anyhow::Result<GenerateResponse> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        *self.last_request.lock().unwrap() = Some(request.clone());

        let content = match &self.fixed_response {
            Some(response) => response.clone(),
            None => synthesize(requested_count(&request.prompt)),
        };

        let prompt_tokens = (request.prompt.len() / 4) as u32; // Rough estimate
        let completion_tokens = (content.len() / 4) as u32;

        Ok(GenerateResponse {
            content,
            model: request.model.clone(),
            token_usage: TokenUsage {
                prompt_tokens,
                completion_tokens,
                total_tokens: prompt_tokens + completion_tokens,
            },
            latency_ms: 1,
        })
    }

    fn available_models(&self) -> Vec<ModelInfo> {
        vec![ModelInfo {
            id: "mock-model".into(),
            name: "Mock Model".into(),
            provider: "mock".into(),
            max_context: 100_000,
        }]
    }
}
