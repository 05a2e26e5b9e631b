use crate::cli::Args;
use crate::history::{ initialize_history_store, HistoryError, HistoryStore };
use crate::models::chat::{ now_timestamp, Exchange };
use crate::responder::{ create_responder, ResponseGenerator };

use log::{ error, info };
use std::error::Error;
use std::sync::Arc;

/// Reply to a chat message, with the time it was recorded.
#[derive(Debug, Clone)]
pub struct ChatReply {
    pub response: String,
    pub timestamp: String,
    pub stored: bool,
}

/// Runs the per-message pipeline: generate a reply, then log the exchange.
#[derive(Clone)]
pub struct ChatAgent {
    responder: Arc<dyn ResponseGenerator>,
    history_store: Arc<dyn HistoryStore>,
}

impl ChatAgent {
    pub fn new(responder: Arc<dyn ResponseGenerator>, history_store: Arc<dyn HistoryStore>) -> Self {
        Self { responder, history_store }
    }

    pub async fn from_args(args: &Args) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let responder = create_responder(args)?;
        let history_store = initialize_history_store(args).await?;
        Ok(Self::new(responder, history_store))
    }

    /// `message` must already be trimmed and non-empty.
    pub async fn chat(&self, message: &str) -> ChatReply {
        let response = self.responder.generate(message).await;

        match self.history_store.append(message, &response).await {
            Ok(Exchange { timestamp, .. }) => ChatReply { response, timestamp, stored: true },
            Err(e) => {
                error!("Failed to store chat exchange: {}", e);
                ChatReply { response, timestamp: now_timestamp(), stored: false }
            }
        }
    }

    pub async fn history(&self) -> Result<Vec<Exchange>, HistoryError> {
        self.history_store.list().await
    }

    pub async fn clear_history(&self) -> Result<(), HistoryError> {
        self.history_store.clear().await?;
        info!("Chat history cleared");
        Ok(())
    }

    pub async fn message_count(&self) -> Result<usize, HistoryError> {
        self.history_store.count().await
    }

    pub fn storage(&self) -> &'static str {
        self.history_store.describe()
    }

    pub fn response_mode(&self) -> &'static str {
        self.responder.mode()
    }
}
