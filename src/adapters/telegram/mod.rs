//! Telegram adapters: Bot API client, update mapping, long-poll input.

pub mod client;
pub mod mapper;
pub mod poller;

pub use client::BotApiClient;
pub use poller::TelegramPoller;
