use async_trait::async_trait;
use log::debug;
use reqwest::{ Client as HttpClient, header::AUTHORIZATION };
use serde::{ Deserialize, Serialize };
use std::error::Error as StdError;
use std::time::Duration;

use super::{
    build_http_client,
    completion_from,
    send_json,
    ChatClient,
    CompletionResponse,
    ProviderError,
    MAX_TOKENS,
    TEMPERATURE,
    TOP_P,
};
use crate::llm::{ LlmConfig, LlmType };

const OPENAI_URL: &str = "https://api.openai.com/v1/chat/completions";
const OPENAI_MODEL: &str = "gpt-4o-mini";
const GROQ_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
const GROQ_MODEL: &str = "llama-3.1-8b-instant";

/// Client for any OpenAI compatible `chat/completions` endpoint (OpenAI, Groq).
pub struct OpenAIChatClient {
    http: HttpClient,
    name: String,
    api_key: Option<String>,
    model: String,
    base_url: String,
    system_prompt: String,
}

#[derive(Serialize, Deserialize)]
struct OpenAIMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
}

#[derive(Serialize)]
struct OpenAIChatRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
}

#[derive(Deserialize)]
struct OpenAIChoice {
    message: OpenAIMessage,
}

impl OpenAIChatClient {
    pub fn new(
        name: &str,
        api_key: Option<String>,
        model: String,
        base_url: String,
        system_prompt: String,
        timeout: Duration
    ) -> Result<Self, Box<dyn StdError + Send + Sync>> {
        let http = build_http_client(timeout).map_err(
            |e| Box::new(e) as Box<dyn StdError + Send + Sync>
        )?;

        Ok(Self {
            http,
            name: name.to_string(),
            api_key,
            model,
            base_url,
            system_prompt,
        })
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self, Box<dyn StdError + Send + Sync>> {
        let (default_url, default_model) = match config.llm_type {
            LlmType::Groq => (GROQ_URL, GROQ_MODEL),
            LlmType::OpenAI => (OPENAI_URL, OPENAI_MODEL),
            _ => {
                return Err("Invalid config type for OpenAIChatClient".into());
            }
        };

        Self::new(
            &config.llm_type.to_string(),
            config.api_key.clone(),
            config.model.clone().unwrap_or_else(|| default_model.to_string()),
            config.base_url.clone().unwrap_or_else(|| default_url.to_string()),
            config.system_prompt.clone(),
            config.timeout
        )
    }
}

#[async_trait]
impl ChatClient for OpenAIChatClient {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn complete(&self, prompt: &str) -> Result<CompletionResponse, ProviderError> {
        let api_key = self.api_key.as_deref().ok_or(ProviderError::MissingCredential)?;

        let req = OpenAIChatRequest {
            model: self.model.clone(),
            messages: vec![
                OpenAIMessage {
                    role: "system".to_string(),
                    content: Some(self.system_prompt.clone()),
                },
                OpenAIMessage {
                    role: "user".to_string(),
                    content: Some(prompt.to_string()),
                }
            ],
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
            top_p: TOP_P,
        };

        debug!("{} request → model={} url={}", self.name, self.model, self.base_url);
        let resp: OpenAIResponse = send_json(
            self.http
                .post(&self.base_url)
                .header(AUTHORIZATION, format!("Bearer {}", api_key))
                .json(&req)
        ).await?;

        let text = resp.choices.into_iter().next().and_then(|choice| choice.message.content);
        completion_from(text)
    }
}
