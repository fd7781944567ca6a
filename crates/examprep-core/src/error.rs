//! Provider error types.
//!
//! These error types represent failures when asking an LLM backend for
//! questions. Defined in `examprep-core` so the question service and the CLI
//! can downcast and classify errors without string matching.

use thiserror::Error;

/// Shown when no API credential is configured for the provider.
pub const MISSING_API_KEY_MESSAGE: &str = "Missing API Key. Please configure the environment.";

/// Shown for every other generation failure.
pub const GENERATION_FAILED_MESSAGE: &str =
    "Failed to generate questions. Please check your connection.";

/// Errors that can occur when interacting with an LLM provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// No API key was configured for the provider.
    #[error("API key is missing for provider '{0}'")]
    MissingApiKey(String),

    /// The API returned a 429 rate limit response.
    #[error("rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    /// Authentication failed (invalid API key).
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The requested model was not found.
    #[error("model not found: {0}")]
    ModelNotFound(String),

    /// The API returned an error response.
    #[error("API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    NetworkError(String),

    /// The model answered, but not with usable questions.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl ProviderError {
    /// Returns `true` if the failure is a configuration problem on our side.
    pub fn is_missing_credential(&self) -> bool {
        matches!(self, ProviderError::MissingApiKey(_))
    }
}

/// Map a generation failure to the single line shown to the user.
pub fn generation_failure_message(err: &anyhow::Error) -> &'static str {
    let missing_key = err
        .chain()
        .filter_map(|cause| cause.downcast_ref::<ProviderError>())
        .any(ProviderError::is_missing_credential);

    if missing_key {
        MISSING_API_KEY_MESSAGE
    } else {
        GENERATION_FAILED_MESSAGE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn missing_key_gets_remediation_message() {
        let err = anyhow::Error::from(ProviderError::MissingApiKey("gemini".into()));
        assert_eq!(generation_failure_message(&err), MISSING_API_KEY_MESSAGE);
    }

    #[test]
    fn missing_key_is_found_through_context() {
        let err: anyhow::Result<()> =
            Err(ProviderError::MissingApiKey("gemini".into())).context("generating paper");
        assert_eq!(
            generation_failure_message(&err.unwrap_err()),
            MISSING_API_KEY_MESSAGE
        );
    }

    #[test]
    fn other_failures_get_generic_message() {
        let network = anyhow::Error::from(ProviderError::NetworkError("refused".into()));
        assert_eq!(generation_failure_message(&network), GENERATION_FAILED_MESSAGE);

        let auth = anyhow::Error::from(ProviderError::AuthenticationFailed("bad key".into()));
        assert_eq!(generation_failure_message(&auth), GENERATION_FAILED_MESSAGE);

        let plain = anyhow::anyhow!("something went wrong");
        assert_eq!(generation_failure_message(&plain), GENERATION_FAILED_MESSAGE);
    }
}
