//! Implements InputPort. Long-polls `getUpdates` and feeds the conversation engine.
//!
//! Updates are processed one at a time, in order. The offset is advanced past every
//! update, including ones that are skipped, so nothing is delivered twice.

use crate::adapters::telegram::client::BotApiClient;
use crate::adapters::telegram::mapper::{self, Update};
use crate::domain::DomainError;
use crate::ports::{InputPort, MessengerPort};
use crate::usecases::ConversationEngine;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Pause after a failed `getUpdates` before polling again.
const RETRY_DELAY: Duration = Duration::from_secs(5);

pub struct TelegramPoller {
    client: Arc<BotApiClient>,
    engine: Arc<ConversationEngine>,
    poll_timeout_secs: u64,
}

impl TelegramPoller {
    pub fn new(
        client: Arc<BotApiClient>,
        engine: Arc<ConversationEngine>,
        poll_timeout_secs: u64,
    ) -> Self {
        Self {
            client,
            engine,
            poll_timeout_secs,
        }
    }

    /// Run one update through the engine and deliver the replies.
    async fn dispatch(&self, update: &Update) {
        let Some(event) = mapper::update_to_event(update) else {
            if let Some(callback_id) = mapper::orphan_callback_id(update) {
                if let Err(e) = self.client.answer_callback(callback_id, None).await {
                    debug!(error = %e, "failed to answer callback");
                }
            }
            return;
        };

        let callback_id = event.callback_id().map(str::to_owned);
        let user_id = event.user.id;
        let replies = self.engine.handle(event).await;

        // Stop the client-side spinner first; failures here are cosmetic.
        if let Some(id) = callback_id {
            if let Err(e) = self.client.answer_callback(&id, None).await {
                debug!(user_id, error = %e, "failed to answer callback");
            }
        }

        for reply in &replies {
            if let Err(e) = self.client.send_message(reply).await {
                warn!(user_id, chat_id = reply.chat_id, error = %e, "failed to send reply");
            }
        }
    }
}

#[async_trait]
impl InputPort for TelegramPoller {
    async fn run(&self) -> Result<(), DomainError> {
        if let Err(e) = self.client.delete_webhook().await {
            warn!(error = %e, "deleteWebhook failed; polling anyway");
        }
        info!(timeout_secs = self.poll_timeout_secs, "polling for updates");

        let mut offset: Option<i64> = None;
        loop {
            let updates = match self.client.get_updates(offset, self.poll_timeout_secs).await {
                Ok(updates) => updates,
                Err(e) => {
                    warn!(error = %e, retry_secs = RETRY_DELAY.as_secs(), "getUpdates failed");
                    tokio::time::sleep(RETRY_DELAY).await;
                    continue;
                }
            };

            for update in &updates {
                offset = Some(update.update_id + 1);
                self.dispatch(update).await;
            }
        }
    }
}
