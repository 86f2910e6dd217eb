//! Test doubles for the outbound ports.

use crate::domain::{DomainError, Order, OutboundMessage};
use crate::ports::{MessengerPort, OrderLogPort};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;

/// Records every message; sends to chats in `failing` return an error.
#[derive(Default)]
pub struct RecordingMessenger {
    failing: HashSet<i64>,
    attempts: Mutex<Vec<i64>>,
    sent: Mutex<Vec<OutboundMessage>>,
}

impl RecordingMessenger {
    pub fn failing_for(chat_ids: impl IntoIterator<Item = i64>) -> Self {
        Self {
            failing: chat_ids.into_iter().collect(),
            ..Self::default()
        }
    }

    pub async fn attempted_chats(&self) -> Vec<i64> {
        self.attempts.lock().await.clone()
    }

    pub async fn sent(&self) -> Vec<OutboundMessage> {
        self.sent.lock().await.clone()
    }

    pub async fn sent_to(&self, chat_id: i64) -> Vec<OutboundMessage> {
        self.sent
            .lock()
            .await
            .iter()
            .filter(|m| m.chat_id == chat_id)
            .cloned()
            .collect()
    }
}

#[async_trait::async_trait]
impl MessengerPort for RecordingMessenger {
    async fn send_message(&self, message: &OutboundMessage) -> Result<(), DomainError> {
        self.attempts.lock().await.push(message.chat_id);
        if self.failing.contains(&message.chat_id) {
            return Err(DomainError::Gateway("chat not found".into()));
        }
        self.sent.lock().await.push(message.clone());
        Ok(())
    }

    async fn answer_callback(
        &self,
        _callback_id: &str,
        _text: Option<&str>,
    ) -> Result<(), DomainError> {
        Ok(())
    }
}

/// Order log in memory. `set_failing(true)` makes appends fail.
#[derive(Default)]
pub struct InMemoryOrderLog {
    orders: Mutex<Vec<Order>>,
    failing: AtomicBool,
}

impl InMemoryOrderLog {
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl OrderLogPort for InMemoryOrderLog {
    async fn append(&self, order: &Order) -> Result<Order, DomainError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(DomainError::OrderLog("disk full".into()));
        }
        let mut orders = self.orders.lock().await;
        let stored = Order {
            id: Some(orders.len() as i64 + 1),
            ..order.clone()
        };
        orders.push(stored.clone());
        Ok(stored)
    }

    async fn recent(&self, limit: u32) -> Result<Vec<Order>, DomainError> {
        let orders = self.orders.lock().await;
        Ok(orders.iter().rev().take(limit as usize).cloned().collect())
    }

    async fn all(&self) -> Result<Vec<Order>, DomainError> {
        Ok(self.orders.lock().await.clone())
    }
}
