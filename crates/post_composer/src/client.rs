use std::time::{Duration, Instant};

use pipeline_logging::{pipeline_debug, pipeline_warn};
use reqwest::header;

use crate::error::{ComposeError, Result};
use crate::types::{ChatRequest, ChatResponse, ChatResponseRaw};

/// Minimal client for an OpenAI-compatible `/chat/completions` endpoint
/// (LM Studio, llama.cpp server, the hosted API).
#[derive(Clone)]
pub struct ChatClient {
    http_client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl ChatClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ComposeError::Config(format!("cannot build http client: {e}")))?;
        Ok(Self {
            http_client,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// One non-streaming completion; returns the first choice only.
    pub async fn chat_completion(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let start = Instant::now();

        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.base_url))
            .header(header::AUTHORIZATION, format!("Bearer {}", self.api_key))
            .json(request)
            .send()
            .await
            .map_err(|e| {
                pipeline_warn!("chat completion request failed: {}", e);
                ComposeError::Network(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            pipeline_warn!("chat completion returned {}: {}", status, body);
            return Err(ComposeError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let raw: ChatResponseRaw = response
            .json()
            .await
            .map_err(|e| ComposeError::Parse(e.to_string()))?;

        let content = raw
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(ComposeError::EmptyCompletion)?;

        pipeline_debug!(
            "chat completion model={} duration_ms={}",
            request.model,
            start.elapsed().as_millis()
        );

        Ok(ChatResponse {
            content,
            usage: raw.usage,
        })
    }
}
