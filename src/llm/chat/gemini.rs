use async_trait::async_trait;
use log::debug;
use reqwest::Client as HttpClient;
use serde::{ Deserialize, Serialize };
use std::error::Error as StdError;

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
use crate::llm::LlmConfig;

const GEMINI_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const GEMINI_MODEL: &str = "gemini-1.5-flash";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    system_instruction: GeminiContent,
    contents: Vec<GeminiContent>,
    generation_config: GenerationConfig,
}

#[derive(Serialize, Deserialize, Default)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
    temperature: f32,
    top_p: f32,
}

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    #[serde(default)]
    content: GeminiContent,
}

pub struct GeminiChatClient {
    http: HttpClient,
    api_key: Option<String>,
    model: String,
    base_url: String,
    system_prompt: String,
}

impl GeminiChatClient {
    pub fn from_config(config: &LlmConfig) -> Result<Self, Box<dyn StdError + Send + Sync>> {
        let http = build_http_client(config.timeout).map_err(
            |e| Box::new(e) as Box<dyn StdError + Send + Sync>
        )?;

        Ok(Self {
            http,
            api_key: config.api_key.clone(),
            model: config.model.clone().unwrap_or_else(|| GEMINI_MODEL.to_string()),
            base_url: config.base_url.clone().unwrap_or_else(|| GEMINI_URL.to_string()),
            system_prompt: config.system_prompt.clone(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url.trim_end_matches('/'), self.model)
    }
}

#[async_trait]
impl ChatClient for GeminiChatClient {
    fn name(&self) -> &str {
        "gemini"
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn complete(&self, prompt: &str) -> Result<CompletionResponse, ProviderError> {
        let api_key = self.api_key.as_deref().ok_or(ProviderError::MissingCredential)?;

        let payload = GeminiRequest {
            system_instruction: GeminiContent {
                role: None,
                parts: vec![GeminiPart { text: Some(self.system_prompt.clone()) }],
            },
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts: vec![GeminiPart { text: Some(prompt.to_string()) }],
            }],
            generation_config: GenerationConfig {
                max_output_tokens: MAX_TOKENS,
                temperature: TEMPERATURE,
                top_p: TOP_P,
            },
        };

        let url = self.endpoint();
        debug!("gemini request → model={} url={}", self.model, url);
        let resp: GeminiResponse = send_json(
            self.http.post(&url).header("x-goog-api-key", api_key).json(&payload)
        ).await?;

        let text = resp.candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().find_map(|p| p.text));
        completion_from(text)
    }
}
