use async_trait::async_trait;
use log::info;
use sqlx::sqlite::{ SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions };
use std::path::Path;
use crate::history::{ HistoryError, HistoryStore };
use crate::models::chat::Exchange;

const CREATE_TABLE: &str =
    "CREATE TABLE IF NOT EXISTS messages (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_message TEXT NOT NULL,
        bot_response TEXT NOT NULL,
        timestamp TEXT NOT NULL
    )";

/// History kept in a single sqlite file on local disk.
pub struct SqliteHistoryStore {
    pool: SqlitePool,
}

impl SqliteHistoryStore {
    /// Opens (creating if needed) the database file and makes sure the schema exists.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, HistoryError> {
        let path = path.as_ref();
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal);
        let pool = SqlitePoolOptions::new().max_connections(4).connect_with(options).await?;

        let store = Self { pool };
        store.init().await?;
        info!("SQLite history store ready at {}", path.display());
        Ok(store)
    }

    /// Safe to call any number of times.
    pub async fn init(&self) -> Result<(), HistoryError> {
        sqlx::query(CREATE_TABLE).execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl HistoryStore for SqliteHistoryStore {
    async fn append(&self, user_message: &str, bot_response: &str) -> Result<Exchange, HistoryError> {
        let exchange = Exchange::new(user_message, bot_response);
        sqlx::query("INSERT INTO messages (user_message, bot_response, timestamp) VALUES (?, ?, ?)")
            .bind(&exchange.user_message)
            .bind(&exchange.bot_response)
            .bind(&exchange.timestamp)
            .execute(&self.pool).await?;
        Ok(exchange)
    }

    async fn list(&self) -> Result<Vec<Exchange>, HistoryError> {
        let rows: Vec<(String, String, String)> = sqlx
            ::query_as("SELECT user_message, bot_response, timestamp FROM messages ORDER BY id")
            .fetch_all(&self.pool).await?;

        Ok(
            rows
                .into_iter()
                .map(|(user_message, bot_response, timestamp)| Exchange {
                    user_message,
                    bot_response,
                    timestamp,
                })
                .collect()
        )
    }

    async fn clear(&self) -> Result<(), HistoryError> {
        sqlx::query("DELETE FROM messages").execute(&self.pool).await?;
        Ok(())
    }

    async fn count(&self) -> Result<usize, HistoryError> {
        let count: i64 = sqlx
            ::query_scalar("SELECT COUNT(*) FROM messages")
            .fetch_one(&self.pool).await?;
        Ok(count as usize)
    }

    fn describe(&self) -> &'static str {
        "sqlite"
    }
}
