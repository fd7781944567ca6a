//! examprep-providers — Question generator integrations.
//!
//! Implements the `QuestionGenerator` trait for Gemini and OpenAI-compatible
//! APIs, plus an offline mock, and loads provider configuration.

pub mod config;
pub mod gemini;
pub mod mock;
pub mod openai;

pub use config::{create_provider, load_config, load_config_from, ExamprepConfig, ProviderConfig};
pub use examprep_core::error::ProviderError;
