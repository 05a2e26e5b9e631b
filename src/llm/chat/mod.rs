pub mod gemini;
pub mod huggingface;
pub mod openai;

use async_trait::async_trait;
use reqwest::{ Client as HttpClient, RequestBuilder, StatusCode };
use serde::de::DeserializeOwned;
use std::error::Error as StdError;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use super::{ LlmConfig, LlmType };
use self::gemini::GeminiChatClient;
use self::huggingface::HuggingFaceChatClient;
use self::openai::OpenAIChatClient;

pub const MAX_TOKENS: u32 = 500;
pub const TEMPERATURE: f32 = 0.7;
pub const TOP_P: f32 = 0.9;

#[derive(Debug, Clone)]
pub struct CompletionResponse {
    pub response: String,
}

/// Why a provider produced no usable text. Never shown to the end user.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("no API key configured")]
    MissingCredential,
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected status {0}")]
    Status(StatusCode),
    #[error("malformed response body: {0}")]
    Malformed(String),
    #[error("provider returned no text")]
    EmptyResponse,
}

#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Name used in logs, e.g. "openai".
    fn name(&self) -> &str;

    fn is_configured(&self) -> bool;

    async fn complete(&self, prompt: &str) -> Result<CompletionResponse, ProviderError>;
}

pub fn new_client(
    config: &LlmConfig
) -> Result<Arc<dyn ChatClient>, Box<dyn StdError + Send + Sync>> {
    let client: Arc<dyn ChatClient> = match config.llm_type {
        LlmType::OpenAI | LlmType::Groq => {
            let specific_client = OpenAIChatClient::from_config(config)?;
            Arc::new(specific_client)
        }
        LlmType::Gemini => {
            let specific_client = GeminiChatClient::from_config(config)?;
            Arc::new(specific_client)
        }
        LlmType::HuggingFace => {
            let specific_client = HuggingFaceChatClient::from_config(config)?;
            Arc::new(specific_client)
        }
    };
    Ok(client)
}

pub(crate) fn build_http_client(timeout: Duration) -> Result<HttpClient, reqwest::Error> {
    HttpClient::builder().timeout(timeout).build()
}

/// Sends the request and decodes a 200 body. Anything else is a failure.
pub(crate) async fn send_json<T: DeserializeOwned>(
    request: RequestBuilder
) -> Result<T, ProviderError> {
    let resp = request.send().await?;
    let status = resp.status();
    if status != StatusCode::OK {
        return Err(ProviderError::Status(status));
    }

    let body = resp.text().await?;
    serde_json::from_str(&body).map_err(|e| ProviderError::Malformed(e.to_string()))
}

pub(crate) fn completion_from(text: Option<String>) -> Result<CompletionResponse, ProviderError> {
    match text.as_deref().map(str::trim) {
        Some(trimmed) if !trimmed.is_empty() => {
            Ok(CompletionResponse { response: trimmed.to_string() })
        }
        _ => Err(ProviderError::EmptyResponse),
    }
}
