use async_trait::async_trait;
use tokio::sync::Mutex;
use crate::history::{ HistoryError, HistoryStore };
use crate::models::chat::Exchange;

/// Process-local history. Everything is lost when the server stops.
#[derive(Default)]
pub struct MemoryHistoryStore {
    exchanges: Mutex<Vec<Exchange>>,
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HistoryStore for MemoryHistoryStore {
    async fn append(&self, user_message: &str, bot_response: &str) -> Result<Exchange, HistoryError> {
        let exchange = Exchange::new(user_message, bot_response);
        self.exchanges.lock().await.push(exchange.clone());
        Ok(exchange)
    }

    async fn list(&self) -> Result<Vec<Exchange>, HistoryError> {
        Ok(self.exchanges.lock().await.clone())
    }

    async fn clear(&self) -> Result<(), HistoryError> {
        self.exchanges.lock().await.clear();
        Ok(())
    }

    async fn count(&self) -> Result<usize, HistoryError> {
        Ok(self.exchanges.lock().await.len())
    }

    fn describe(&self) -> &'static str {
        "in-memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::future::join_all;
    use std::sync::Arc;

    #[tokio::test]
    async fn append_then_list_returns_exchange_last() {
        let store = MemoryHistoryStore::new();
        store.append("hello", "Hello! How can I help you today?").await.unwrap();
        store.append("bye", "Goodbye! Have a great day!").await.unwrap();

        let history = store.list().await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].user_message, "hello");
        let last = history.last().unwrap();
        assert_eq!(last.user_message, "bye");
        assert_eq!(last.bot_response, "Goodbye! Have a great day!");
    }

    #[tokio::test]
    async fn clear_empties_store_and_is_idempotent() {
        let store = MemoryHistoryStore::new();
        store.append("hi", "Hi there! What can I do for you?").await.unwrap();

        store.clear().await.unwrap();
        store.clear().await.unwrap();

        assert!(store.list().await.unwrap().is_empty());
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn concurrent_appends_are_all_kept() {
        let store = Arc::new(MemoryHistoryStore::new());
        let writers = (0..64).map(|i| {
            let store = Arc::clone(&store);
            tokio::spawn(async move {
                store.append(&format!("message {}", i), "reply").await.unwrap();
            })
        });
        for joined in join_all(writers).await {
            joined.unwrap();
        }

        let history = store.list().await.unwrap();
        assert_eq!(history.len(), 64);
        for i in 0..64 {
            let expected = format!("message {}", i);
            assert!(history.iter().any(|e| e.user_message == expected));
        }
    }
}
