use async_trait::async_trait;
use log::debug;
use reqwest::{ Client as HttpClient, header::AUTHORIZATION };
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

const HF_URL: &str = "https://api-inference.huggingface.co/models";
const HF_MODEL: &str = "mistralai/Mistral-7B-Instruct-v0.2";

#[derive(Serialize)]
struct InferenceRequest {
    inputs: String,
    parameters: InferenceParameters,
}

#[derive(Serialize)]
struct InferenceParameters {
    max_new_tokens: u32,
    temperature: f32,
    top_p: f32,
    return_full_text: bool,
}

#[derive(Deserialize)]
struct Generation {
    #[serde(default)]
    generated_text: Option<String>,
}

/// The text-generation task answers with a list, some deployments with a bare object.
#[derive(Deserialize)]
#[serde(untagged)]
enum InferenceResponse {
    Many(Vec<Generation>),
    One(Generation),
}

/// Hugging Face hosted inference (text-generation task).
pub struct HuggingFaceChatClient {
    http: HttpClient,
    api_key: Option<String>,
    model: String,
    base_url: String,
    system_prompt: String,
}

impl HuggingFaceChatClient {
    pub fn from_config(config: &LlmConfig) -> Result<Self, Box<dyn StdError + Send + Sync>> {
        let http = build_http_client(config.timeout).map_err(
            |e| Box::new(e) as Box<dyn StdError + Send + Sync>
        )?;

        Ok(Self {
            http,
            api_key: config.api_key.clone(),
            model: config.model.clone().unwrap_or_else(|| HF_MODEL.to_string()),
            base_url: config.base_url.clone().unwrap_or_else(|| HF_URL.to_string()),
            system_prompt: config.system_prompt.clone(),
        })
    }

    fn build_prompt(&self, message: &str) -> String {
        format!("{}\n\nUser: {}\nAssistant:", self.system_prompt, message)
    }
}

#[async_trait]
impl ChatClient for HuggingFaceChatClient {
    fn name(&self) -> &str {
        "huggingface"
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn complete(&self, prompt: &str) -> Result<CompletionResponse, ProviderError> {
        let api_key = self.api_key.as_deref().ok_or(ProviderError::MissingCredential)?;

        let req = InferenceRequest {
            inputs: self.build_prompt(prompt),
            parameters: InferenceParameters {
                max_new_tokens: MAX_TOKENS,
                temperature: TEMPERATURE,
                top_p: TOP_P,
                return_full_text: false,
            },
        };

        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), self.model);
        debug!("huggingface request → url={}", url);
        let resp: InferenceResponse = send_json(
            self.http
                .post(&url)
                .header(AUTHORIZATION, format!("Bearer {}", api_key))
                .json(&req)
        ).await?;

        let text = match resp {
            InferenceResponse::Many(generations) =>
                generations.into_iter().next().and_then(|g| g.generated_text),
            InferenceResponse::One(generation) => generation.generated_text,
        };
        completion_from(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::LlmType;
    use crate::test_support::spawn_mock;
    use axum::{ routing::post, Json, Router };
    use serde_json::{ json, Value };
    use std::time::Duration;

    fn config(base: String) -> LlmConfig {
        let mut config = LlmConfig::new(LlmType::HuggingFace, Some("hf-key".into()));
        config.base_url = Some(base);
        config.model = Some("tiny-model".into());
        config.system_prompt = "Be kind.".into();
        config.timeout = Duration::from_secs(5);
        config
    }

    #[tokio::test]
    async fn reads_generated_text_from_list() {
        let router = Router::new().route(
            "/tiny-model",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["inputs"], "Be kind.\n\nUser: hello\nAssistant:");
                assert_eq!(body["parameters"]["return_full_text"], false);
                Json(json!([{ "generated_text": " Hello friend." }]))
            })
        );
        let base = spawn_mock(router).await;

        let client = HuggingFaceChatClient::from_config(&config(base)).unwrap();
        assert_eq!(client.complete("hello").await.unwrap().response, "Hello friend.");
    }

    #[tokio::test]
    async fn accepts_single_object_body() {
        let router = Router::new().route(
            "/tiny-model",
            post(|| async { Json(json!({ "generated_text": "Single." })) })
        );
        let base = spawn_mock(router).await;

        let client = HuggingFaceChatClient::from_config(&config(base)).unwrap();
        assert_eq!(client.complete("hello").await.unwrap().response, "Single.");
    }

    #[tokio::test]
    async fn model_loading_error_is_a_failure() {
        let router = Router::new().route(
            "/tiny-model",
            post(|| async {
                (
                    axum::http::StatusCode::SERVICE_UNAVAILABLE,
                    Json(json!({ "error": "Model is currently loading" })),
                )
            })
        );
        let base = spawn_mock(router).await;

        let client = HuggingFaceChatClient::from_config(&config(base)).unwrap();
        assert!(matches!(client.complete("hello").await, Err(ProviderError::Status(_))));
    }
}
