//! Telegram Adapter - Bot API 客户端实现

mod bot_api_client;
mod types;

pub use bot_api_client::{TelegramBotClient, TelegramBotClientConfig};
