//! Application use cases. Orchestrate domain logic via ports.

pub mod admin_panel;
pub mod conversation;
pub mod export_service;
pub mod notification;
pub mod replies;
pub mod sessions;

#[cfg(test)]
pub(crate) mod testing;

pub use admin_panel::AdminPanel;
pub use conversation::ConversationEngine;
pub use export_service::{ExportReport, ExportSchedule, ExportService};
pub use notification::{NotificationDispatcher, NotifyReport};
pub use sessions::SessionRegistry;
