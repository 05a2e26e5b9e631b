use async_trait::async_trait;
use log::info;
use sqlx::postgres::{ PgPool, PgPoolOptions };
use std::time::Duration;
use crate::history::{ HistoryError, HistoryStore };
use crate::models::chat::Exchange;

const CREATE_TABLE: &str =
    "CREATE TABLE IF NOT EXISTS messages (
        id BIGSERIAL PRIMARY KEY,
        user_message TEXT NOT NULL,
        bot_response TEXT NOT NULL,
        timestamp TIMESTAMP NOT NULL DEFAULT now()
    )";

// Tables created before the ordering key existed only have the three data columns.
const ADD_ID_COLUMN: &str = "ALTER TABLE messages ADD COLUMN IF NOT EXISTS id BIGSERIAL";

pub struct PostgresHistoryStore {
    pool: PgPool,
}

impl PostgresHistoryStore {
    pub async fn connect(database_url: &str) -> Result<Self, HistoryError> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(5))
            .connect(database_url).await?;

        let store = Self { pool };
        store.init().await?;
        info!("Postgres history store connected");
        Ok(store)
    }

    pub async fn init(&self) -> Result<(), HistoryError> {
        sqlx::query(CREATE_TABLE).execute(&self.pool).await?;
        sqlx::query(ADD_ID_COLUMN).execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl HistoryStore for PostgresHistoryStore {
    async fn append(&self, user_message: &str, bot_response: &str) -> Result<Exchange, HistoryError> {
        let exchange = Exchange::new(user_message, bot_response);
        sqlx
            ::query(
                "INSERT INTO messages (user_message, bot_response, timestamp) VALUES ($1, $2, $3::timestamp)"
            )
            .bind(&exchange.user_message)
            .bind(&exchange.bot_response)
            .bind(&exchange.timestamp)
            .execute(&self.pool).await?;
        Ok(exchange)
    }

    async fn list(&self) -> Result<Vec<Exchange>, HistoryError> {
        let rows: Vec<(String, String, String)> = sqlx
            ::query_as(
                "SELECT user_message, bot_response, to_char(timestamp, 'YYYY-MM-DD HH24:MI:SS') \
                 FROM messages ORDER BY id"
            )
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
        "postgres"
    }
}
