//! Outbound ports. Application calls into infrastructure.
//!
//! Implemented by adapters.

use crate::domain::{CatalogItem, DomainError, Order, OutboundMessage, Platform, PriceEntry, Rate};

/// Messaging gateway. Delivers replies and notifications to a chat.
#[async_trait::async_trait]
pub trait MessengerPort: Send + Sync {
    /// Send a text message, with an inline keyboard if the message carries one.
    async fn send_message(&self, message: &OutboundMessage) -> Result<(), DomainError>;

    /// Acknowledge a button press so the client stops showing a spinner.
    async fn answer_callback(
        &self,
        callback_id: &str,
        text: Option<&str>,
    ) -> Result<(), DomainError>;
}

/// Price store. Platform -> rate per 1,000,000 coins.
#[async_trait::async_trait]
pub trait PriceStorePort: Send + Sync {
    async fn get_rate(&self, platform: Platform) -> Option<Rate>;

    /// All rates, ordered by platform.
    async fn rates(&self) -> Vec<PriceEntry>;

    /// Update a rate. Returns only after the change is persisted; on error the
    /// previous rate stays in effect.
    async fn set_rate(&self, platform: Platform, rate: Rate) -> Result<(), DomainError>;
}

/// Catalog store. Games and subscriptions.
#[async_trait::async_trait]
pub trait CatalogStorePort: Send + Sync {
    async fn items(&self) -> Vec<CatalogItem>;

    async fn item(&self, id: &str) -> Option<CatalogItem>;

    /// Insert or replace by id. Persisted before returning.
    async fn upsert_item(&self, item: CatalogItem) -> Result<(), DomainError>;

    /// Remove by id. Returns `false` if no such item existed.
    async fn remove_item(&self, id: &str) -> Result<bool, DomainError>;
}

/// Order log. Append-only record of confirmed orders.
#[async_trait::async_trait]
pub trait OrderLogPort: Send + Sync {
    /// Append a confirmed order. Returns the stored order with its assigned id.
    async fn append(&self, order: &Order) -> Result<Order, DomainError>;

    /// Newest first.
    async fn recent(&self, limit: u32) -> Result<Vec<Order>, DomainError>;

    /// Every order, oldest first (export).
    async fn all(&self) -> Result<Vec<Order>, DomainError>;
}
