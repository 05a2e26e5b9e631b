mod remote;
mod rules;

pub use remote::RemoteResponder;
pub use rules::RuleBasedResponder;

use async_trait::async_trait;
use log::{ info, warn };
use std::error::Error;
use std::str::FromStr;
use std::sync::Arc;
use crate::cli::Args;
use crate::llm::chat::new_client;
use crate::llm::provider_configs;

/// Produces the bot's reply. Implementations always return some text.
#[async_trait]
pub trait ResponseGenerator: Send + Sync {
    async fn generate(&self, message: &str) -> String;

    /// Label reported by the health endpoint.
    fn mode(&self) -> &'static str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseMode {
    Rules,
    Remote,
}

impl FromStr for ResponseMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "rules" | "rule" | "local" => Ok(ResponseMode::Rules),
            "remote" | "llm" => Ok(ResponseMode::Remote),
            _ => Err(format!("Unsupported response mode: {}", s)),
        }
    }
}

pub fn create_responder(
    args: &Args
) -> Result<Arc<dyn ResponseGenerator>, Box<dyn Error + Send + Sync>> {
    let mode: ResponseMode = args.response_mode.parse()?;

    match mode {
        ResponseMode::Rules => {
            info!("Replies come from the rule-based responder");
            Ok(Arc::new(RuleBasedResponder::new()))
        }
        ResponseMode::Remote => {
            let mut providers = Vec::new();
            for config in provider_configs(args)? {
                let client = new_client(&config)?;
                info!(
                    "Provider '{}' configured: Model={:?}, BaseURL={:?}, key present={}",
                    config.llm_type,
                    config.model.as_deref().unwrap_or("adapter default"),
                    config.base_url.as_deref().unwrap_or("adapter default"),
                    client.is_configured()
                );
                providers.push(client);
            }

            if !providers.iter().any(|p| p.is_configured()) {
                warn!("No remote provider has an API key; every reply will come from the rule-based fallback");
            }

            Ok(Arc::new(RemoteResponder::new(providers)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn parses_modes() {
        assert_eq!("rules".parse::<ResponseMode>().unwrap(), ResponseMode::Rules);
        assert_eq!("Remote".parse::<ResponseMode>().unwrap(), ResponseMode::Remote);
        assert!("magic".parse::<ResponseMode>().is_err());
    }

    #[tokio::test]
    async fn remote_mode_without_keys_still_answers() {
        let args = Args::parse_from([
            "chat-relay",
            "--response-mode",
            "remote",
            "--llm-providers",
            "openai,gemini",
            "--openai-api-key",
            "",
            "--gemini-api-key",
            "",
        ]);
        let responder = create_responder(&args).unwrap();
        assert_eq!(responder.mode(), "remote");
        assert_eq!(responder.generate("hello").await, "Hello! How can I help you today?");
    }

    #[test]
    fn rules_mode_is_selected() {
        let args = Args::parse_from(["chat-relay", "--response-mode", "rules"]);
        assert_eq!(create_responder(&args).unwrap().mode(), "rules");
    }
}
