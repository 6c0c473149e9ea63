//! Groq chat completions (OpenAI-compatible API).

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{check_status, UpstreamError};
use crate::config::UpstreamConfig;

const SERVICE: &str = "Groq";
const COMPLETION_TIMEOUT: Duration = Duration::from_secs(30);
const TEMPERATURE: f64 = 0.7;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    max_tokens: u32,
    temperature: f64,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: String,
}

#[derive(Debug, Clone)]
pub struct GroqClient {
    client: Client,
    url: String,
    model: String,
    api_key: Option<String>,
}

impl GroqClient {
    pub fn new(client: Client, config: &UpstreamConfig) -> Self {
        Self {
            client,
            url: config.groq_url.clone(),
            model: config.groq_model.clone(),
            api_key: config.groq_api_key.clone(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Single-turn completion; returns the first choice's text
    pub async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String, UpstreamError> {
        let api_key = self.api_key.as_deref().ok_or(UpstreamError::MissingApiKey)?;

        let request = ChatRequest {
            model: &self.model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens,
            temperature: TEMPERATURE,
        };

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(api_key)
            .json(&request)
            .timeout(COMPLETION_TIMEOUT)
            .send()
            .await?;
        let response = check_status(SERVICE, response)?;
        let body: ChatResponse = response.json().await?;

        body.choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| UpstreamError::Decode {
                service: SERVICE,
                reason: "no choices in completion".to_string(),
            })
    }
}
