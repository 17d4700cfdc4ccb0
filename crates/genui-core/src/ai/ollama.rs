use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{ensure_success, http_client, non_empty, GenerationClient};
use crate::error::{ConfigError, GenerationError};
use crate::provider::Provider;
use crate::request::GenerationRequest;

#[derive(Serialize)]
struct OllamaRequest {
    model: String,
    prompt: String,
    stream: bool,
}

#[derive(Deserialize)]
struct OllamaResponse {
    #[serde(default)]
    response: Option<String>,
}

#[derive(Deserialize)]
struct OllamaModel {
    name: String,
}

#[derive(Deserialize)]
struct OllamaModelsResponse {
    models: Vec<OllamaModel>,
}

#[derive(Clone)]
pub struct OllamaClient {
    client: Client,
    base_url: String,
    model: String,
}

impl OllamaClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ConfigError> {
        Ok(Self {
            client: http_client(timeout)?,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: Provider::Ollama.default_model().to_string(),
        })
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    pub async fn query(&self, model: &str, prompt: &str) -> Result<String, GenerationError> {
        let url = format!("{}/api/generate", self.base_url);

        let request = OllamaRequest {
            model: model.to_string(),
            prompt: prompt.to_string(),
            stream: false,
        };

        let response = self.client.post(&url).json(&request).send().await?;
        let response = ensure_success(response).await?;

        let ollama_response: OllamaResponse = response.json().await?;
        non_empty(ollama_response.response)
    }

    pub async fn list_models(&self) -> Result<Vec<String>, GenerationError> {
        let url = format!("{}/api/tags", self.base_url);

        let response = self.client.get(&url).send().await?;
        let response = ensure_success(response).await?;

        let models_response: OllamaModelsResponse = response.json().await?;
        let model_names: Vec<String> = models_response
            .models
            .into_iter()
            .map(|model| model.name)
            .collect();

        Ok(model_names)
    }
}

#[async_trait]
impl GenerationClient for OllamaClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        self.query(&self.model, &request.prompt()).await
    }

    fn describe(&self) -> String {
        format!("Ollama: {}", self.model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::test_server::{closed_port, never_respond, respond_once};
    use crate::framework::Framework;

    fn request() -> GenerationRequest {
        GenerationRequest::new("a pricing card", Framework::HtmlTailwind).unwrap()
    }

    fn client(base_url: &str) -> OllamaClient {
        OllamaClient::new(base_url, Duration::from_secs(5))
            .unwrap()
            .with_model("llama3.2")
    }

    #[tokio::test]
    async fn test_returns_raw_text_untouched() {
        let url = respond_once(200, r#"{"response":"```html\n<div>Card</div>\n```","done":true}"#).await;
        let raw = client(&url).generate(&request()).await.unwrap();
        assert_eq!(raw, "```html\n<div>Card</div>\n```");
    }

    #[tokio::test]
    async fn test_error_status_is_service_failure() {
        let url = respond_once(404, r#"{"error":"model 'llama3.2' not found"}"#).await;
        let err = client(&url).generate(&request()).await.unwrap_err();
        assert_eq!(
            err,
            GenerationError::service(Some(404), "model 'llama3.2' not found")
        );
    }

    #[tokio::test]
    async fn test_blank_response_is_empty() {
        let url = respond_once(200, r#"{"response":"   ","done":true}"#).await;
        let err = client(&url).generate(&request()).await.unwrap_err();
        assert_eq!(err, GenerationError::EmptyResponse);
    }

    #[tokio::test]
    async fn test_undecodable_body_is_service_failure() {
        let url = respond_once(200, "<html>proxy login</html>").await;
        let err = client(&url).generate(&request()).await.unwrap_err();
        assert_eq!(err.kind(), "ServiceFailure");
    }

    #[tokio::test]
    async fn test_refused_connection_is_network_failure() {
        let url = closed_port().await;
        let err = client(&url).generate(&request()).await.unwrap_err();
        assert_eq!(err.kind(), "NetworkFailure");
    }

    #[tokio::test]
    async fn test_timeout_is_network_failure() {
        let url = never_respond().await;
        let client = OllamaClient::new(&url, Duration::from_millis(300))
            .unwrap()
            .with_model("llama3.2");
        let err = client.generate(&request()).await.unwrap_err();
        assert_eq!(err.kind(), "NetworkFailure");
    }

    #[tokio::test]
    async fn test_list_models() {
        let url = respond_once(200, r#"{"models":[{"name":"llama3.2:latest"},{"name":"qwen2.5-coder:7b"}]}"#).await;
        let models = client(&url).list_models().await.unwrap();
        assert_eq!(models, vec!["llama3.2:latest", "qwen2.5-coder:7b"]);
    }
}
