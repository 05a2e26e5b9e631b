pub mod chat;
use crate::cli::Args;
use serde::{ Deserialize, Serialize };
use std::str::FromStr;
use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmType {
    OpenAI,
    Groq,
    Gemini,
    HuggingFace,
}

impl fmt::Display for LlmType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LlmType::OpenAI => "openai",
            LlmType::Groq => "groq",
            LlmType::Gemini => "gemini",
            LlmType::HuggingFace => "huggingface",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct ParseLlmTypeError {
    message: String,
}

impl fmt::Display for ParseLlmTypeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ParseLlmTypeError {}

impl FromStr for LlmType {
    type Err = ParseLlmTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(LlmType::OpenAI),
            "groq" => Ok(LlmType::Groq),
            "gemini" | "google" => Ok(LlmType::Gemini),
            "huggingface" | "hf" => Ok(LlmType::HuggingFace),
            _ =>
                Err(ParseLlmTypeError {
                    message: format!("Invalid LLM type: '{}'", s),
                }),
        }
    }
}

/// One entry of the remote provider chain.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub llm_type: LlmType,
    /// `None` means the provider is skipped.
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub timeout: Duration,
    pub system_prompt: String,
}

impl LlmConfig {
    pub fn new(llm_type: LlmType, api_key: Option<String>) -> Self {
        Self {
            llm_type,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            model: None,
            base_url: None,
            timeout: Duration::from_secs(30),
            system_prompt: String::new(),
        }
    }
}

/// Resolves the ordered provider list from `--llm-providers`.
pub fn provider_configs(args: &Args) -> Result<Vec<LlmConfig>, ParseLlmTypeError> {
    let mut configs = Vec::new();

    for name in args.llm_providers.split(',').filter(|n| !n.trim().is_empty()) {
        let llm_type: LlmType = name.parse()?;
        let (api_key, model, base_url) = match llm_type {
            LlmType::OpenAI =>
                (&args.openai_api_key, &args.openai_model, &args.openai_base_url),
            LlmType::Groq => (&args.groq_api_key, &args.groq_model, &args.groq_base_url),
            LlmType::Gemini =>
                (&args.gemini_api_key, &args.gemini_model, &args.gemini_base_url),
            LlmType::HuggingFace =>
                (
                    &args.huggingface_api_key,
                    &args.huggingface_model,
                    &args.huggingface_base_url,
                ),
        };

        let mut config = LlmConfig::new(llm_type, Some(api_key.clone()));
        config.model = model.clone();
        config.base_url = base_url.clone();
        config.timeout = Duration::from_secs(args.llm_timeout_secs);
        config.system_prompt = args.system_prompt.clone();
        configs.push(config);
    }

    Ok(configs)
}
