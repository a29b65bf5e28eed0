//! Completion-service client.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from the completion service.
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("completion http error: {0}")]
    Http(String),
    #[error("completion response error: {0}")]
    Response(String),
    #[error("completion serialization error: {0}")]
    Serialization(String),
}

/// External text-generation service invoked with an instruction prompt.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Sends a single-prompt completion request and returns the model text.
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError>;
}

/// Configuration for the OpenAI-compatible HTTP client.
#[derive(Debug, Clone)]
pub struct HttpCompletionConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub timeout_secs: u64,
}

impl Default for HttpCompletionConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            api_key: None,
            model: "gpt-4o-mini".to_string(),
            temperature: 0.0,
            timeout_secs: 30,
        }
    }
}

/// HTTP client for an OpenAI-compatible chat-completions API.
pub struct HttpCompletionClient {
    client: reqwest::Client,
    config: HttpCompletionConfig,
}

impl HttpCompletionClient {
    pub fn new(config: HttpCompletionConfig) -> Result<Self, CompletionError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CompletionError::Http(e.to_string()))?;
        Ok(Self { client, config })
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Debug, Deserialize)]
struct ChatMessageResponse {
    content: String,
}

#[async_trait]
impl CompletionClient for HttpCompletionClient {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(key) = &self.config.api_key {
            let value = format!("Bearer {key}");
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&value)
                    .map_err(|e| CompletionError::Http(e.to_string()))?,
            );
        }

        let body = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            temperature: self.config.temperature,
        };

        let response = self
            .client
            .post(&self.config.endpoint)
            .headers(headers)
            .json(&body)
            .send()
            .await
            .map_err(|e| CompletionError::Http(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(CompletionError::Response(format!("HTTP {status}: {text}")));
        }

        let text = response
            .text()
            .await
            .map_err(|e| CompletionError::Http(e.to_string()))?;
        let parsed: ChatResponse = serde_json::from_str(&text)
            .map_err(|e| CompletionError::Serialization(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| CompletionError::Response("missing choices".to_string()))
    }
}

/// Canned client for tests; records the prompts it receives.
#[derive(Debug, Clone, Default)]
pub struct MockCompletionClient {
    response: Option<String>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl MockCompletionClient {
    /// Creates a client that always returns the given text.
    pub fn returning(response: impl Into<String>) -> Self {
        Self {
            response: Some(response.into()),
            prompts: Arc::default(),
        }
    }

    /// Creates a client that always fails.
    pub fn failing() -> Self {
        Self {
            response: None,
            prompts: Arc::default(),
        }
    }

    /// Prompts received so far, in order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionClient for MockCompletionClient {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match &self.response {
            Some(response) => Ok(response.clone()),
            None => Err(CompletionError::Response(
                "injected completion failure".to_string(),
            )),
        }
    }
}
