use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    config::Config,
    error::{Result, YtcefrError},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    content: Option<String>,
}

/// One chat-completions exchange against the configured backend
#[derive(Clone, Default)]
pub struct ChatClient {
    http: reqwest::Client,
}

impl ChatClient {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }

    /// Send the messages and return the assistant's reply text, trimmed
    pub async fn complete(
        &self,
        config: &Config,
        messages: &[ChatMessage],
        temperature: f32,
    ) -> Result<String> {
        let provider = config.provider;
        let api_key = config.llm_api_key()?;

        debug!("Sending {} messages to {}", messages.len(), provider.name());

        let response = self
            .http
            .post(config.llm_url())
            .bearer_auth(api_key)
            .json(&ChatRequest {
                model: provider.config().model,
                messages,
                temperature,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(YtcefrError::Upstream {
                service: provider.name().to_string(),
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let reply: ChatResponse = response.json().await?;
        reply
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .ok_or_else(|| YtcefrError::Upstream {
                service: provider.name().to_string(),
                status: status.as_u16(),
                body: "reply carried no assistant message".to_string(),
            })
    }
}
