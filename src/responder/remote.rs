use async_trait::async_trait;
use log::{ debug, info, warn };
use std::sync::Arc;
use super::{ ResponseGenerator, RuleBasedResponder };
use crate::llm::chat::ChatClient;

/// Tries each provider in order and falls back to canned replies when none answers.
pub struct RemoteResponder {
    providers: Vec<Arc<dyn ChatClient>>,
    fallback: RuleBasedResponder,
}

impl RemoteResponder {
    pub fn new(providers: Vec<Arc<dyn ChatClient>>) -> Self {
        Self {
            providers,
            fallback: RuleBasedResponder::new(),
        }
    }

    async fn ask_providers(&self, message: &str) -> Option<String> {
        for provider in &self.providers {
            if !provider.is_configured() {
                debug!("Skipping provider '{}': no API key configured", provider.name());
                continue;
            }

            match provider.complete(message).await {
                Ok(resp) => {
                    info!("Reply produced by provider '{}'", provider.name());
                    return Some(resp.response);
                }
                Err(e) => {
                    warn!("Provider '{}' failed: {}", provider.name(), e);
                }
            }
        }
        None
    }
}

#[async_trait]
impl ResponseGenerator for RemoteResponder {
    async fn generate(&self, message: &str) -> String {
        match self.ask_providers(message).await {
            Some(text) => text,
            None => {
                info!("No remote provider answered, using rule-based reply");
                self.fallback.reply(message)
            }
        }
    }

    fn mode(&self) -> &'static str {
        "remote"
    }
}
