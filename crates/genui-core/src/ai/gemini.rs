use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{ensure_success, http_client, non_empty, GenerationClient};
use crate::error::{ConfigError, GenerationError};
use crate::provider::Provider;
use crate::request::GenerationRequest;

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Serialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
}

#[derive(Deserialize, Default)]
struct GeminiResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize, Default)]
struct GeminiResponseContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiResponseContent>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    #[serde(default)]
    prompt_feedback: Option<GeminiPromptFeedback>,
}

impl GeminiResponse {
    /// Concatenated text of the first candidate's parts
    fn text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();
        Some(text)
    }
}

#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: &str, timeout: Duration) -> Result<Self, ConfigError> {
        Ok(Self {
            client: http_client(timeout)?,
            api_key: api_key.to_string(),
            base_url: GEMINI_BASE_URL.to_string(),
            model: Provider::Gemini.default_model().to_string(),
        })
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub async fn query(&self, model: &str, prompt: &str) -> Result<String, GenerationError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, model);

        let request = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: prompt.to_string(),
                }],
            }],
        };

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;
        let response = ensure_success(response).await?;

        let gemini_response: GeminiResponse = response.json().await?;

        if let Some(reason) = gemini_response
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.clone())
        {
            return Err(GenerationError::service(None, format!("prompt blocked: {}", reason)));
        }

        non_empty(gemini_response.text())
    }

    pub fn list_models() -> Vec<String> {
        vec![
            "gemini-2.5-flash".to_string(),
            "gemini-2.5-pro".to_string(),
            "gemini-2.0-flash".to_string(),
        ]
    }
}

#[async_trait]
impl GenerationClient for GeminiClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        self.query(&self.model, &request.prompt()).await
    }

    fn describe(&self) -> String {
        format!("Gemini: {}", self.model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::test_server::respond_once;
    use crate::framework::Framework;

    fn request() -> GenerationRequest {
        GenerationRequest::new("a navbar", Framework::HtmlCss).unwrap()
    }

    fn client(base_url: &str) -> GeminiClient {
        GeminiClient::new("test-key", Duration::from_secs(5))
            .unwrap()
            .with_base_url(base_url)
    }

    #[tokio::test]
    async fn test_joins_candidate_parts() {
        let url = respond_once(
            200,
            r#"{"candidates":[{"content":{"parts":[{"text":"```html\n"},{"text":"<nav></nav>\n```"}]}}]}"#,
        )
        .await;
        let raw = client(&url).generate(&request()).await.unwrap();
        assert_eq!(raw, "```html\n<nav></nav>\n```");
    }

    #[tokio::test]
    async fn test_quota_error_payload() {
        let url = respond_once(
            429,
            r#"{"error":{"code":429,"message":"Resource has been exhausted","status":"RESOURCE_EXHAUSTED"}}"#,
        )
        .await;
        let err = client(&url).generate(&request()).await.unwrap_err();
        assert_eq!(err, GenerationError::service(Some(429), "Resource has been exhausted"));
    }

    #[tokio::test]
    async fn test_no_candidates_is_empty() {
        let url = respond_once(200, r#"{"candidates":[]}"#).await;
        let err = client(&url).generate(&request()).await.unwrap_err();
        assert_eq!(err, GenerationError::EmptyResponse);
    }

    #[tokio::test]
    async fn test_blocked_prompt_is_service_failure() {
        let url = respond_once(200, r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#).await;
        let err = client(&url).generate(&request()).await.unwrap_err();
        assert_eq!(err, GenerationError::service(None, "prompt blocked: SAFETY"));
    }
}
