//! Inbound port. The transport adapter drives the application through it.

use crate::domain::DomainError;

/// Input port: a transport (long polling) feeds user events into the conversation engine.
#[async_trait::async_trait]
pub trait InputPort: Send + Sync {
    /// Receive and dispatch events until the process is stopped.
    async fn run(&self) -> Result<(), DomainError>;
}
