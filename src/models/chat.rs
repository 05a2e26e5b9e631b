use chrono::Local;
use serde::{ Serialize, Deserialize };

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One recorded turn: what the user sent, what the bot answered, and when.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exchange {
    pub user_message: String,
    pub bot_response: String,
    pub timestamp: String,
}

impl Exchange {
    /// Stamps the exchange with the current local time.
    pub fn new(user_message: &str, bot_response: &str) -> Self {
        Self {
            user_message: user_message.to_string(),
            bot_response: bot_response.to_string(),
            timestamp: now_timestamp(),
        }
    }
}

pub fn now_timestamp() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}
