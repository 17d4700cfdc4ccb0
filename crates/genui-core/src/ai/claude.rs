use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{ensure_success, http_client, non_empty, GenerationClient};
use crate::error::{ConfigError, GenerationError};
use crate::provider::Provider;
use crate::request::GenerationRequest;

const CLAUDE_BASE_URL: &str = "https://api.anthropic.com";

#[derive(Serialize)]
struct ClaudeMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct ClaudeRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<ClaudeMessage>,
}

#[derive(Deserialize)]
struct ClaudeContent {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
struct ClaudeResponse {
    #[serde(default)]
    content: Vec<ClaudeContent>,
}

#[derive(Clone)]
pub struct ClaudeClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl ClaudeClient {
    pub fn new(api_key: &str, timeout: Duration) -> Result<Self, ConfigError> {
        Ok(Self {
            client: http_client(timeout)?,
            api_key: api_key.to_string(),
            base_url: CLAUDE_BASE_URL.to_string(),
            model: Provider::Claude.default_model().to_string(),
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
        let request = ClaudeRequest {
            model: model.to_string(),
            max_tokens: 8192,
            messages: vec![ClaudeMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
        };

        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await?;
        let response = ensure_success(response).await?;

        let claude_response: ClaudeResponse = response.json().await?;
        let text = claude_response
            .content
            .into_iter()
            .find_map(|c| c.text);
        non_empty(text)
    }

    pub fn list_models() -> Vec<String> {
        vec![
            "claude-sonnet-4-20250514".to_string(),
            "claude-3-5-sonnet-20241022".to_string(),
            "claude-3-5-haiku-20241022".to_string(),
        ]
    }
}

#[async_trait]
impl GenerationClient for ClaudeClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        self.query(&self.model, &request.prompt()).await
    }

    fn describe(&self) -> String {
        format!("Claude: {}", self.model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::test_server::respond_once;
    use crate::framework::Framework;

    fn client(base_url: &str) -> ClaudeClient {
        ClaudeClient::new("test-key", Duration::from_secs(5))
            .unwrap()
            .with_base_url(base_url)
    }

    #[tokio::test]
    async fn test_first_text_block() {
        let url = respond_once(200, r#"{"content":[{"type":"text","text":"<p>Hi</p>"}]}"#).await;
        let request = GenerationRequest::new("greeting", Framework::HtmlCss).unwrap();
        assert_eq!(client(&url).generate(&request).await.unwrap(), "<p>Hi</p>");
    }

    #[tokio::test]
    async fn test_overloaded_is_service_failure() {
        let url = respond_once(
            529,
            r#"{"type":"error","error":{"type":"overloaded_error","message":"Overloaded"}}"#,
        )
        .await;
        let request = GenerationRequest::new("greeting", Framework::HtmlCss).unwrap();
        let err = client(&url).generate(&request).await.unwrap_err();
        assert_eq!(err, GenerationError::service(Some(529), "Overloaded"));
    }
}
