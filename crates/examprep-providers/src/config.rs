//! Provider configuration and factory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use examprep_core::session::SECONDS_PER_QUESTION;
use examprep_core::traits::{QuestionGenerator, DEFAULT_MODEL, DEFAULT_TEMPERATURE};

use crate::gemini::GeminiProvider;
use crate::mock::MockProvider;
use crate::openai::OpenAiProvider;

/// Configuration for a single question provider.
///
/// Note: Custom Debug impl masks API keys to prevent accidental exposure in logs.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ProviderConfig {
    Gemini {
        #[serde(default)]
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
    },
    OpenAI {
        #[serde(default)]
        api_key: String,
        #[serde(default)]
        base_url: Option<String>,
        #[serde(default)]
        org_id: Option<String>,
    },
    Mock {
        /// Fixed response body; questions are synthesized when absent.
        #[serde(default)]
        response: Option<String>,
    },
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderConfig::Gemini {
                api_key: _,
                base_url,
            } => f
                .debug_struct("Gemini")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .finish(),
            ProviderConfig::OpenAI {
                api_key: _,
                base_url,
                org_id,
            } => f
                .debug_struct("OpenAI")
                .field("api_key", &"***")
                .field("base_url", base_url)
                .field("org_id", org_id)
                .finish(),
            ProviderConfig::Mock { response } => f
                .debug_struct("Mock")
                .field("response", &response.as_ref().map(|_| "<fixed>"))
                .finish(),
        }
    }
}

/// Top-level examprep configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamprepConfig {
    /// Provider configurations keyed by name.
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
    /// Default provider to use.
    #[serde(default = "default_provider")]
    pub default_provider: String,
    /// Default model to use.
    #[serde(default = "default_model")]
    pub default_model: String,
    /// Sampling temperature for question generation.
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    /// Countdown budget per question.
    #[serde(default = "default_seconds_per_question")]
    pub seconds_per_question: u64,
    /// Output directory for saved papers and results.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Custom syllabus catalogue; the built-in one is used when unset.
    #[serde(default)]
    pub syllabus_path: Option<PathBuf>,
}

fn default_provider() -> String {
    "gemini".to_string()
}
fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}
fn default_temperature() -> f64 {
    DEFAULT_TEMPERATURE
}
fn default_seconds_per_question() -> u64 {
    SECONDS_PER_QUESTION
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("./examprep-results")
}

impl Default for ExamprepConfig {
    fn default() -> Self {
        Self {
            providers: HashMap::new(),
            default_provider: default_provider(),
            default_model: default_model(),
            temperature: default_temperature(),
            seconds_per_question: default_seconds_per_question(),
            output_dir: default_output_dir(),
            syllabus_path: None,
        }
    }
}

impl ExamprepConfig {
    /// Configuration for a named provider.
    ///
    /// `gemini` and `mock` work without an explicit entry; an unconfigured
    /// Gemini provider has an empty key and reports it when used.
    pub fn provider_config(&self, name: &str) -> Result<ProviderConfig> {
        if let Some(config) = self.providers.get(name) {
            return Ok(config.clone());
        }
        match name {
            "gemini" => Ok(ProviderConfig::Gemini {
                api_key: String::new(),
                base_url: None,
            }),
            "mock" => Ok(ProviderConfig::Mock { response: None }),
            _ => {
                let mut known: Vec<&str> = self.providers.keys().map(String::as_str).collect();
                known.sort_unstable();
                anyhow::bail!(
                    "provider '{name}' is not configured (configured: {})",
                    if known.is_empty() {
                        "none".to_string()
                    } else {
                        known.join(", ")
                    }
                )
            }
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

/// Resolve env vars in a provider config.
fn resolve_provider_config(config: &ProviderConfig) -> ProviderConfig {
    match config {
        ProviderConfig::Gemini { api_key, base_url } => ProviderConfig::Gemini {
            api_key: resolve_env_vars(api_key),
            base_url: base_url.as_ref().map(|u| resolve_env_vars(u)),
        },
        ProviderConfig::OpenAI {
            api_key,
            base_url,
            org_id,
        } => ProviderConfig::OpenAI {
            api_key: resolve_env_vars(api_key),
            base_url: base_url.as_ref().map(|u| resolve_env_vars(u)),
            org_id: org_id.as_ref().map(|o| resolve_env_vars(o)),
        },
        ProviderConfig::Mock { response } => ProviderConfig::Mock {
            response: response.clone(),
        },
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `examprep.toml` in the current directory
/// 2. `~/.config/examprep/config.toml`
///
/// Environment variable overrides: `EXAMPREP_GEMINI_KEY` (or `API_KEY`),
/// `EXAMPREP_OPENAI_KEY`.
pub fn load_config() -> Result<ExamprepConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<ExamprepConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("examprep.toml");
        if local.exists() {
            Some(local)
        } else if let Some(home) = dirs_path() {
            let global = home.join("config.toml");
            if global.exists() {
                Some(global)
            } else {
                None
            }
        } else {
            None
        }
    };

    let mut config = match config_path {
        Some(path) => {
            tracing::debug!("loading config from {}", path.display());
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<ExamprepConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => ExamprepConfig::default(),
    };

    // Apply env var overrides
    let gemini_key = std::env::var("EXAMPREP_GEMINI_KEY")
        .or_else(|_| std::env::var("API_KEY"))
        .ok()
        .filter(|k| !k.trim().is_empty());
    if let Some(key) = gemini_key {
        config
            .providers
            .entry("gemini".into())
            .or_insert(ProviderConfig::Gemini {
                api_key: String::new(),
                base_url: None,
            });
        if let Some(ProviderConfig::Gemini { api_key, .. }) = config.providers.get_mut("gemini") {
            *api_key = key;
        }
    }

    if let Ok(key) = std::env::var("EXAMPREP_OPENAI_KEY") {
        config
            .providers
            .entry("openai".into())
            .or_insert(ProviderConfig::OpenAI {
                api_key: String::new(),
                base_url: None,
                org_id: None,
            });
        if let Some(ProviderConfig::OpenAI { api_key, .. }) = config.providers.get_mut("openai") {
            *api_key = key;
        }
    }

    // Resolve env vars in all provider configs
    let resolved: HashMap<String, ProviderConfig> = config
        .providers
        .iter()
        .map(|(k, v)| (k.clone(), resolve_provider_config(v)))
        .collect();
    config.providers = resolved;

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("examprep"))
}

/// Create a provider instance from its configuration.
pub fn create_provider(config: &ProviderConfig) -> Arc<dyn QuestionGenerator> {
    match config {
        ProviderConfig::Gemini { api_key, base_url } => {
            Arc::new(GeminiProvider::new(api_key, base_url.clone()))
        }
        ProviderConfig::OpenAI {
            api_key,
            base_url,
            org_id,
        } => Arc::new(OpenAiProvider::new(
            api_key,
            base_url.clone(),
            org_id.clone(),
        )),
        ProviderConfig::Mock { response } => match response {
            Some(body) => Arc::new(MockProvider::with_fixed_response(body)),
            None => Arc::new(MockProvider::new()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_env_vars_basic() {
        std::env::set_var("_EXAMPREP_TEST_VAR", "hello");
        assert_eq!(resolve_env_vars("${_EXAMPREP_TEST_VAR}"), "hello");
        assert_eq!(
            resolve_env_vars("prefix_${_EXAMPREP_TEST_VAR}_suffix"),
            "prefix_hello_suffix"
        );
        assert_eq!(resolve_env_vars("${_EXAMPREP_UNSET_VAR}"), "");
        std::env::remove_var("_EXAMPREP_TEST_VAR");
    }

    #[test]
    fn default_config() {
        let config = ExamprepConfig::default();
        assert_eq!(config.default_provider, "gemini");
        assert_eq!(config.default_model, "gemini-2.5-flash");
        assert_eq!(config.temperature, 0.7);
        assert_eq!(config.seconds_per_question, 72);
        assert!(config.syllabus_path.is_none());
    }

    #[test]
    fn parse_provider_config() {
        let toml_str = r#"
default_provider = "openai"
default_model = "gpt-4.1-mini"
seconds_per_question = 60

[providers.gemini]
type = "gemini"
api_key = "g-test"

[providers.openai]
type = "openai"
api_key = "sk-openai"
org_id = "org-1"

[providers.offline]
type = "mock"
"#;
        let config: ExamprepConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.providers.len(), 3);
        assert_eq!(config.seconds_per_question, 60);
        assert_eq!(config.temperature, 0.7);
        assert!(matches!(
            config.providers.get("offline"),
            Some(ProviderConfig::Mock { response: None })
        ));
        assert!(matches!(
            config.provider_config("openai").unwrap(),
            ProviderConfig::OpenAI { .. }
        ));
    }

    #[test]
    fn debug_masks_api_keys() {
        let config = ProviderConfig::Gemini {
            api_key: "super-secret".into(),
            base_url: None,
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("***"));
    }

    #[test]
    fn builtin_provider_fallbacks() {
        let config = ExamprepConfig::default();
        assert!(matches!(
            config.provider_config("gemini").unwrap(),
            ProviderConfig::Gemini { ref api_key, .. } if api_key.is_empty()
        ));
        assert!(matches!(
            config.provider_config("mock").unwrap(),
            ProviderConfig::Mock { .. }
        ));
        let err = config.provider_config("anthropic").unwrap_err();
        assert!(err.to_string().contains("not configured"));
    }

    #[test]
    fn explicit_path_must_exist() {
        let err = load_config_from(Some(Path::new("/nonexistent/examprep.toml"))).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("examprep.toml");
        std::fs::write(
            &path,
            "default_provider = \"mock\"\noutput_dir = \"out\"\n\n[providers.mock]\ntype = \"mock\"\n",
        )
        .unwrap();

        let config = load_config_from(Some(&path)).unwrap();
        assert_eq!(config.default_provider, "mock");
        assert_eq!(config.output_dir, PathBuf::from("out"));
        assert_eq!(create_provider(&config.provider_config("mock").unwrap()).name(), "mock");
    }
}
