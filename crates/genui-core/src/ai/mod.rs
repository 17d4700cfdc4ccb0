//! Generation clients, one per provider
//!
//! Every client returns the raw response text untouched; extraction happens
//! in the session controller. Failures are always classified as a
//! [`GenerationError`].

pub mod claude;
pub mod gemini;
pub mod ollama;
pub mod openai;

pub use claude::ClaudeClient;
pub use gemini::GeminiClient;
pub use ollama::OllamaClient;
pub use openai::OpenAIClient;

use async_trait::async_trait;
use reqwest::{Client, Response};
use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::error::{ConfigError, GenerationError};
use crate::provider::Provider;
use crate::request::GenerationRequest;

/// The external text-completion service as the core sees it
#[async_trait]
pub trait GenerationClient: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError>;

    /// Human-readable "provider: model" label
    fn describe(&self) -> String;
}

/// Build the client for `provider` from config, using `model`.
pub fn build_client(
    config: &Config,
    provider: Provider,
    model: &str,
) -> Result<Arc<dyn GenerationClient>, ConfigError> {
    let timeout = config.timeout();

    let client: Arc<dyn GenerationClient> = match provider {
        Provider::Ollama => Arc::new(OllamaClient::new(config.ollama_url(), timeout)?.with_model(model)),
        Provider::Gemini => {
            let key = config
                .api_key_for(provider)
                .ok_or(ConfigError::MissingApiKey(provider.display_name()))?;
            Arc::new(GeminiClient::new(&key, timeout)?.with_model(model))
        }
        Provider::Claude => {
            let key = config
                .api_key_for(provider)
                .ok_or(ConfigError::MissingApiKey(provider.display_name()))?;
            Arc::new(ClaudeClient::new(&key, timeout)?.with_model(model))
        }
        Provider::OpenAI => {
            let key = config
                .api_key_for(provider)
                .ok_or(ConfigError::MissingApiKey(provider.display_name()))?;
            Arc::new(OpenAIClient::new(&key, timeout)?.with_model(model))
        }
    };

    Ok(client)
}

/// HTTP client with a bounded wait; a timeout surfaces as `NetworkFailure`.
pub(crate) fn http_client(timeout: Duration) -> Result<Client, ConfigError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| ConfigError::Http(e.to_string()))
}

/// Turn a non-2xx response into a `ServiceFailure` carrying the service's
/// own error message when it sent one.
pub(crate) async fn ensure_success(response: Response) -> Result<Response, GenerationError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(GenerationError::service(Some(status.as_u16()), error_message(&body)))
}

/// Pull a message out of the common error payload shapes:
/// `{"error": {"message": ..}}`, `{"error": ".."}`, or plain text.
pub(crate) fn error_message(body: &str) -> String {
    let parsed: Option<serde_json::Value> = serde_json::from_str(body).ok();
    let from_json = parsed.as_ref().and_then(|value| {
        let error = value.get("error")?;
        error
            .get("message")
            .and_then(|m| m.as_str())
            .or_else(|| error.as_str())
            .map(str::to_string)
    });

    match from_json {
        Some(message) => message,
        None if body.trim().is_empty() => "no error details".to_string(),
        None => body.trim().to_string(),
    }
}

/// Reject missing or blank completions.
pub(crate) fn non_empty(text: Option<String>) -> Result<String, GenerationError> {
    match text {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(GenerationError::EmptyResponse),
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_shapes() {
        assert_eq!(
            error_message(r#"{"error":{"code":429,"message":"Quota exceeded"}}"#),
            "Quota exceeded"
        );
        assert_eq!(error_message(r#"{"error":"model not found"}"#), "model not found");
        assert_eq!(error_message("Bad Gateway"), "Bad Gateway");
        assert_eq!(error_message(""), "no error details");
    }

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty(None), Err(GenerationError::EmptyResponse));
        assert_eq!(non_empty(Some("  \n".into())), Err(GenerationError::EmptyResponse));
        assert_eq!(non_empty(Some("ok".into())), Ok("ok".to_string()));
    }

    #[test]
    fn test_missing_key_is_reported() {
        let mut config = Config::new();
        config.claude_api_key = None;
        // Only meaningful when the environment does not provide a key either
        if config.api_key_for(Provider::Claude).is_none() {
            let result = build_client(&config, Provider::Claude, "claude-sonnet-4-20250514");
            assert!(matches!(result, Err(ConfigError::MissingApiKey(_))));
        }
    }

    #[test]
    fn test_ollama_needs_no_key() {
        let config = Config::new();
        let client = build_client(&config, Provider::Ollama, "llama3.2").unwrap();
        assert_eq!(client.describe(), "Ollama: llama3.2");
    }
}
