mod memory;
mod postgres;
mod redis;
mod sqlite;

pub use memory::MemoryHistoryStore;
pub use postgres::PostgresHistoryStore;
pub use self::redis::RedisHistoryStore;
pub use sqlite::SqliteHistoryStore;

use async_trait::async_trait;
use log::{ info, warn };
use std::error::Error;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;
use crate::cli::Args;
use crate::models::chat::Exchange;

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("redis error: {0}")]
    Redis(#[from] ::redis::RedisError),
    #[error("history entry could not be encoded: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("history store misconfigured: {0}")]
    Config(String),
}

/// Append-only log of chat exchanges.
///
/// Every backend returns exchanges oldest first and treats `clear` as a single
/// atomic operation; clearing an empty store is not an error.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    async fn append(&self, user_message: &str, bot_response: &str) -> Result<Exchange, HistoryError>;

    async fn list(&self) -> Result<Vec<Exchange>, HistoryError>;

    async fn clear(&self) -> Result<(), HistoryError>;

    async fn count(&self) -> Result<usize, HistoryError> {
        Ok(self.list().await?.len())
    }

    /// Short label reported by the health endpoint.
    fn describe(&self) -> &'static str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryBackend {
    Auto,
    Postgres,
    Sqlite,
    Redis,
    Memory,
}

impl FromStr for HistoryBackend {
    type Err = HistoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "auto" | "" => Ok(HistoryBackend::Auto),
            "postgres" | "postgresql" => Ok(HistoryBackend::Postgres),
            "sqlite" => Ok(HistoryBackend::Sqlite),
            "redis" => Ok(HistoryBackend::Redis),
            "memory" => Ok(HistoryBackend::Memory),
            _ => Err(HistoryError::Config(format!("Unsupported history store type: {}", s))),
        }
    }
}

fn configured_database_url(args: &Args) -> Option<&str> {
    args.database_url
        .as_deref()
        .map(str::trim)
        .filter(|url| !url.is_empty())
}

pub async fn create_history_store(
    args: &Args
) -> Result<Arc<dyn HistoryStore>, Box<dyn Error + Send + Sync>> {
    let backend: HistoryBackend = args.history_type.parse()?;

    let store: Arc<dyn HistoryStore> = match backend {
        HistoryBackend::Auto => {
            if let Some(url) = configured_database_url(args) {
                Arc::new(PostgresHistoryStore::connect(url).await?)
            } else {
                match SqliteHistoryStore::open(&args.sqlite_path).await {
                    Ok(store) => Arc::new(store),
                    Err(e) => {
                        warn!(
                            "Could not open sqlite history at '{}': {}. Falling back to in-memory history.",
                            args.sqlite_path,
                            e
                        );
                        Arc::new(MemoryHistoryStore::new())
                    }
                }
            }
        }
        HistoryBackend::Postgres => {
            let url = configured_database_url(args).ok_or_else(||
                HistoryError::Config("DATABASE_URL is required for the postgres history store".into())
            )?;
            Arc::new(PostgresHistoryStore::connect(url).await?)
        }
        HistoryBackend::Sqlite => Arc::new(SqliteHistoryStore::open(&args.sqlite_path).await?),
        HistoryBackend::Redis => {
            Arc::new(RedisHistoryStore::new(&args.history_redis_url, &args.history_redis_key)?)
        }
        HistoryBackend::Memory => Arc::new(MemoryHistoryStore::new()),
    };

    Ok(store)
}

pub async fn initialize_history_store(
    args: &Args
) -> Result<Arc<dyn HistoryStore>, Box<dyn Error + Send + Sync>> {
    let store = create_history_store(args).await?;
    info!("Chat history will be stored in: {}", store.describe());
    Ok(store)
}
