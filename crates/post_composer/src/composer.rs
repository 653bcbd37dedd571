use std::time::Duration;

use pipeline_logging::{pipeline_debug, pipeline_info, pipeline_warn};

use crate::budget::{truncate_chars, CharacterBudget, Post, POST_CEILING};
use crate::client::ChatClient;
use crate::error::{ComposeError, Result};
use crate::prompt::{system_prompt, user_prompt};
use crate::types::{ChatRequest, Message};

/// Key sent when none is configured; local servers ignore it.
pub const DEFAULT_API_KEY: &str = "lm-studio";

#[derive(Debug, Clone)]
pub struct ComposerSettings {
    /// Base of the chat-completions API, e.g. `http://localhost:1234/v1`.
    pub endpoint: Option<String>,
    pub model: Option<String>,
    pub api_key: String,
    pub budget: CharacterBudget,
    pub temperature: f32,
    pub max_tokens: u32,
    pub request_timeout: Duration,
    pub post_ceiling: usize,
}

impl Default for ComposerSettings {
    fn default() -> Self {
        Self {
            endpoint: None,
            model: None,
            api_key: DEFAULT_API_KEY.to_string(),
            budget: CharacterBudget::default(),
            temperature: 0.7,
            max_tokens: 160,
            request_timeout: Duration::from_secs(60),
            post_ceiling: POST_CEILING,
        }
    }
}

/// Turns article key points into a short post via one chat completion.
pub struct PostComposer {
    client: ChatClient,
    model: String,
    settings: ComposerSettings,
}

impl PostComposer {
    /// Fails with [`ComposeError::Config`] when the endpoint or model is unset,
    /// before anything touches the network.
    pub fn new(settings: ComposerSettings) -> Result<Self> {
        let endpoint = required(settings.endpoint.as_deref(), "LMSTUDIO_BASE_URL")?;
        let model = required(settings.model.as_deref(), "LMSTUDIO_MODEL")?;
        let client = ChatClient::new(endpoint, settings.api_key.clone(), settings.request_timeout)?;
        Ok(Self {
            client,
            model: model.to_string(),
            settings,
        })
    }

    /// Ask the model for a post body about the article. The result is trimmed
    /// and cut to the character budget for `source_url`.
    pub async fn generate_post(
        &self,
        title: Option<&str>,
        content: &str,
        source_url: &str,
    ) -> Result<String> {
        let char_budget = self.settings.budget.for_url(source_url);
        let request = ChatRequest::new(self.model.clone())
            .message(Message::system(system_prompt()))
            .message(Message::user(user_prompt(title, content, char_budget)))
            .temperature(self.settings.temperature)
            .max_tokens(self.settings.max_tokens);

        pipeline_info!(
            "Requesting post from {} (model {}, budget {} chars)",
            self.client.base_url(),
            self.model,
            char_budget
        );
        let response = self.client.chat_completion(&request).await?;
        if let Some(usage) = &response.usage {
            pipeline_debug!(
                "tokens prompt={} completion={}",
                usage.prompt_tokens,
                usage.completion_tokens
            );
        }

        let body = response.content.trim();
        if body.is_empty() {
            return Err(ComposeError::EmptyCompletion);
        }
        let capped = truncate_chars(body, char_budget);
        if capped.len() < body.len() {
            pipeline_warn!(
                "model ignored the {} char budget ({} chars), truncated",
                char_budget,
                body.chars().count()
            );
        }
        Ok(capped.to_string())
    }

    /// Generate a body and combine it with the source link into a [`Post`].
    pub async fn compose(
        &self,
        title: Option<&str>,
        content: &str,
        source_url: &str,
    ) -> Result<Post> {
        let body = self.generate_post(title, content, source_url).await?;
        Ok(Post::new(body, Some(source_url), self.settings.post_ceiling))
    }
}

fn required<'a>(value: Option<&'a str>, name: &str) -> Result<&'a str> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ComposeError::Config(format!("missing {name}")))
}
