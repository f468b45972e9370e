// src/openai_client.rs
use async_trait::async_trait;
use backoff::{future::retry, ExponentialBackoff};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::OpenAiConfig;
use crate::error::ProviderError;
use crate::providers::TextGenerator;

#[derive(Clone)]
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    max_retry_elapsed: Duration,
}

#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl OpenAiClient {
    pub fn new(config: &OpenAiConfig) -> Self {
        Self {
            client: Client::new(),
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            max_retry_elapsed: Duration::from_secs(120),
        }
    }

    /// Cap the total time spent retrying transient failures
    pub fn with_max_retry_elapsed(mut self, max_retry_elapsed: Duration) -> Self {
        self.max_retry_elapsed = max_retry_elapsed;
        self
    }

    pub async fn chat_completion(
        &self,
        messages: Vec<ChatMessage>,
    ) -> Result<ChatCompletionResponse, ProviderError> {
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let backoff_config = ExponentialBackoff {
            initial_interval: Duration::from_millis(500),
            max_interval: Duration::from_secs(10),
            multiplier: 2.0,
            max_elapsed_time: Some(self.max_retry_elapsed),
            ..Default::default()
        };

        // Rate limits, 5xx and connection drops are retried; everything else fails fast
        let operation = || async {
            let response = self
                .client
                .post(format!("{}/chat/completions", self.base_url))
                .bearer_auth(&self.api_key)
                .timeout(Duration::from_secs(60))
                .json(&request)
                .send()
                .await
                .map_err(|e| classify(ProviderError::Http(e)))?;

            let status = response.status();
            let body = response
                .text()
                .await
                .map_err(|e| backoff::Error::permanent(ProviderError::Http(e)))?;

            if !status.is_success() {
                return Err(classify(ProviderError::Status {
                    status: status.as_u16(),
                    body,
                }));
            }

            serde_json::from_str::<ChatCompletionResponse>(&body)
                .map_err(|e| backoff::Error::permanent(ProviderError::Decode(e)))
        };

        let response = retry(backoff_config, operation).await?;
        if let Some(usage) = &response.usage {
            tracing::debug!(
                model = %self.model,
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "chat completion usage"
            );
        }
        Ok(response)
    }
}

fn classify(err: ProviderError) -> backoff::Error<ProviderError> {
    if err.is_transient() {
        tracing::warn!("OpenAI request failed (retrying): {}", err);
        backoff::Error::transient(err)
    } else {
        tracing::error!("OpenAI request failed: {}", err);
        backoff::Error::permanent(err)
    }
}

#[async_trait]
impl TextGenerator for OpenAiClient {
    async fn complete(&self, prompt: &str) -> Result<String, ProviderError> {
        let messages = vec![ChatMessage {
            role: "user".to_string(),
            content: prompt.to_string(),
        }];

        let response = self.chat_completion(messages).await?;
        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| ProviderError::Malformed("no message content in completion".to_string()))
    }
}
