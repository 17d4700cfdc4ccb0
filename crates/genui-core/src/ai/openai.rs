use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{ensure_success, http_client, non_empty, GenerationClient};
use crate::error::{ConfigError, GenerationError};
use crate::provider::Provider;
use crate::request::GenerationRequest;

const OPENAI_BASE_URL: &str = "https://api.openai.com";

#[derive(Serialize)]
struct OpenAIMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
}

#[derive(Deserialize)]
struct OpenAIChoice {
    message: OpenAIResponseMessage,
}

#[derive(Deserialize)]
struct OpenAIResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    #[serde(default)]
    choices: Vec<OpenAIChoice>,
}

#[derive(Clone)]
pub struct OpenAIClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAIClient {
    pub fn new(api_key: &str, timeout: Duration) -> Result<Self, ConfigError> {
        Ok(Self {
            client: http_client(timeout)?,
            api_key: api_key.to_string(),
            base_url: OPENAI_BASE_URL.to_string(),
            model: Provider::OpenAI.default_model().to_string(),
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
        let request = OpenAIRequest {
            model: model.to_string(),
            messages: vec![OpenAIMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
        };

        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;
        let response = ensure_success(response).await?;

        let openai_response: OpenAIResponse = response.json().await?;
        let text = openai_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content);
        non_empty(text)
    }

    pub fn list_models() -> Vec<String> {
        vec![
            "gpt-4o".to_string(),
            "gpt-4o-mini".to_string(),
            "gpt-4-turbo".to_string(),
        ]
    }
}

#[async_trait]
impl GenerationClient for OpenAIClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        self.query(&self.model, &request.prompt()).await
    }

    fn describe(&self) -> String {
        format!("OpenAI: {}", self.model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::test_server::respond_once;
    use crate::framework::Framework;

    fn client(base_url: &str) -> OpenAIClient {
        OpenAIClient::new("test-key", Duration::from_secs(5))
            .unwrap()
            .with_base_url(base_url)
    }

    #[tokio::test]
    async fn test_first_choice() {
        let url = respond_once(
            200,
            r#"{"choices":[{"message":{"role":"assistant","content":"<button>Go</button>"}}]}"#,
        )
        .await;
        let request = GenerationRequest::new("a button", Framework::HtmlCssJs).unwrap();
        assert_eq!(client(&url).generate(&request).await.unwrap(), "<button>Go</button>");
    }

    #[tokio::test]
    async fn test_null_content_is_empty() {
        let url = respond_once(200, r#"{"choices":[{"message":{"role":"assistant","content":null}}]}"#).await;
        let request = GenerationRequest::new("a button", Framework::HtmlCssJs).unwrap();
        let err = client(&url).generate(&request).await.unwrap_err();
        assert_eq!(err, GenerationError::EmptyResponse);
    }

    #[tokio::test]
    async fn test_invalid_key() {
        let url = respond_once(
            401,
            r#"{"error":{"message":"Incorrect API key provided","type":"invalid_request_error"}}"#,
        )
        .await;
        let request = GenerationRequest::new("a button", Framework::HtmlCssJs).unwrap();
        let err = client(&url).generate(&request).await.unwrap_err();
        assert_eq!(err, GenerationError::service(Some(401), "Incorrect API key provided"));
    }
}
