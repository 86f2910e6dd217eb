//! Telegram Bot API client over HTTPS (reqwest). Implements MessengerPort.
//!
//! Handles 429 (Too Many Requests) by sleeping for `retry_after` and retrying.
//! The bot token is part of every request URL, so it is stripped from errors.

use crate::adapters::telegram::mapper::{self, ApiResponse, Update};
use crate::domain::{DomainError, OutboundMessage};
use crate::ports::MessengerPort;
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, warn};

const MAX_RETRIES: u32 = 3;
/// Extra time on top of the long-poll timeout before the HTTP request gives up.
const HTTP_TIMEOUT_MARGIN_SECS: u64 = 10;

/// Bot API client. One shared reqwest connection pool for polling and sending.
pub struct BotApiClient {
    client: Client,
    /// `{api_base}/bot{token}`
    base: String,
}

impl BotApiClient {
    /// `api_base_url` is normally `https://api.telegram.org`.
    /// `poll_timeout` bounds `getUpdates`; the HTTP timeout is set slightly above it.
    pub fn new(api_base_url: &str, token: &str, poll_timeout: Duration) -> Result<Self, DomainError> {
        let client = Client::builder()
            .timeout(poll_timeout + Duration::from_secs(HTTP_TIMEOUT_MARGIN_SECS))
            .build()
            .map_err(|e| DomainError::Gateway(e.to_string()))?;
        Ok(Self {
            client,
            base: format!("{}/bot{}", api_base_url.trim_end_matches('/'), token),
        })
    }

    /// POST a Bot API method with a JSON body and unwrap the response envelope.
    async fn call<T: DeserializeOwned>(&self, method: &str, body: &Value) -> Result<T, DomainError> {
        let url = format!("{}/{}", self.base, method);
        for attempt in 0..=MAX_RETRIES {
            let res = self
                .client
                .post(&url)
                .json(body)
                .send()
                .await
                .map_err(|e| DomainError::Gateway(format!("{} failed: {}", method, e.without_url())))?;

            let envelope: ApiResponse<T> = res
                .json()
                .await
                .map_err(|e| DomainError::Gateway(format!("{}: bad response: {}", method, e.without_url())))?;

            if envelope.ok {
                return envelope
                    .result
                    .ok_or_else(|| DomainError::Gateway(format!("{}: empty result", method)));
            }

            let retry_after = envelope.parameters.as_ref().and_then(|p| p.retry_after);
            match retry_after {
                Some(wait_secs) if attempt < MAX_RETRIES => {
                    warn!(method, attempt, wait_secs, "rate limited, sleeping");
                    tokio::time::sleep(Duration::from_secs(wait_secs)).await;
                }
                _ => {
                    return Err(DomainError::Gateway(format!(
                        "{}: {}",
                        method,
                        envelope.description.unwrap_or_else(|| "unknown error".into())
                    )));
                }
            }
        }
        Err(DomainError::Gateway(format!("{}: rate limit retries exhausted", method)))
    }

    /// Long poll for updates after `offset`. Returns an empty batch on timeout.
    pub async fn get_updates(
        &self,
        offset: Option<i64>,
        timeout_secs: u64,
    ) -> Result<Vec<Update>, DomainError> {
        let mut body = json!({
            "timeout": timeout_secs,
            "allowed_updates": ["message", "callback_query"],
        });
        if let Some(offset) = offset {
            body["offset"] = json!(offset);
        }
        self.call("getUpdates", &body).await
    }

    /// Remove any webhook so `getUpdates` is allowed.
    pub async fn delete_webhook(&self) -> Result<(), DomainError> {
        let _: bool = self.call("deleteWebhook", &json!({})).await?;
        Ok(())
    }
}

/// `sendMessage` body: text plus the inline keyboard as `reply_markup`.
fn send_message_body(message: &OutboundMessage) -> Value {
    let mut body = json!({
        "chat_id": message.chat_id,
        "text": message.text,
    });
    if let Some(keyboard) = &message.keyboard {
        body["reply_markup"] = mapper::keyboard_to_markup(keyboard);
    }
    body
}

#[async_trait]
impl MessengerPort for BotApiClient {
    async fn send_message(&self, message: &OutboundMessage) -> Result<(), DomainError> {
        let _: Value = self.call("sendMessage", &send_message_body(message)).await?;
        debug!(chat_id = message.chat_id, "message sent");
        Ok(())
    }

    async fn answer_callback(
        &self,
        callback_id: &str,
        text: Option<&str>,
    ) -> Result<(), DomainError> {
        let mut body = json!({ "callback_query_id": callback_id });
        if let Some(text) = text {
            body["text"] = json!(text);
        }
        let _: bool = self.call("answerCallbackQuery", &body).await?;
        Ok(())
    }
}
