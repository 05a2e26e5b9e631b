use async_trait::async_trait;
use crate::history::{ HistoryError, HistoryStore };
use crate::models::chat::Exchange;
use log::error;
use redis::{ Client, AsyncCommands };

/// Exchanges kept as JSON strings in one redis list, oldest at the head.
pub struct RedisHistoryStore {
    client: Client,
    key: String,
}

impl RedisHistoryStore {
    pub fn new(url: &str, key: &str) -> Result<Self, HistoryError> {
        Ok(Self {
            client: Client::open(url)?,
            key: key.to_string(),
        })
    }

    async fn get_connection(&self) -> Result<redis::aio::MultiplexedConnection, redis::RedisError> {
        self.client.get_multiplexed_async_connection().await
    }
}

#[async_trait]
impl HistoryStore for RedisHistoryStore {
    async fn append(&self, user_message: &str, bot_response: &str) -> Result<Exchange, HistoryError> {
        let mut conn = self.get_connection().await?;
        let exchange = Exchange::new(user_message, bot_response);

        let json_msg = serde_json::to_string(&exchange)?;
        let _: i64 = conn.rpush(&self.key, &json_msg).await?;
        Ok(exchange)
    }

    async fn list(&self) -> Result<Vec<Exchange>, HistoryError> {
        let mut conn = self.get_connection().await?;
        let json_entries: Vec<String> = conn.lrange(&self.key, 0, -1).await?;
        let mut exchanges = Vec::with_capacity(json_entries.len());

        for json_entry in &json_entries {
            match serde_json::from_str::<Exchange>(json_entry) {
                Ok(exchange) => exchanges.push(exchange),
                Err(e) => {
                    error!("Error parsing history entry: {}", e);
                }
            }
        }

        Ok(exchanges)
    }

    async fn clear(&self) -> Result<(), HistoryError> {
        let mut conn = self.get_connection().await?;
        let _: i64 = conn.del(&self.key).await?;
        Ok(())
    }

    fn describe(&self) -> &'static str {
        "redis"
    }
}
