//! Administrator notifications. Best-effort: one send attempt per administrator,
//! failures are logged and never reach the buyer.

use crate::domain::{AdministratorSet, Order, OutboundMessage};
use crate::ports::MessengerPort;
use crate::usecases::replies;
use std::sync::Arc;
use tracing::{info, warn};

/// Outcome of one fan-out to the administrators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NotifyReport {
    pub attempted: usize,
    pub delivered: usize,
}

pub struct NotificationDispatcher {
    messenger: Arc<dyn MessengerPort>,
    admins: AdministratorSet,
}

impl NotificationDispatcher {
    pub fn new(messenger: Arc<dyn MessengerPort>, admins: AdministratorSet) -> Self {
        Self { messenger, admins }
    }

    /// Send the order summary to every administrator.
    pub async fn notify(&self, order: &Order) -> NotifyReport {
        let report = self.broadcast(&replies::admin_order_summary(order)).await;
        info!(
            order_id = order.id.unwrap_or_default(),
            attempted = report.attempted,
            delivered = report.delivered,
            "order notification sent"
        );
        report
    }

    /// Send free text to every administrator (e.g. export notices).
    pub async fn broadcast(&self, text: &str) -> NotifyReport {
        let mut report = NotifyReport::default();
        for admin_id in self.admins.ids() {
            report.attempted += 1;
            // Private chat id equals the user id.
            let message = OutboundMessage::text(admin_id, text);
            match self.messenger.send_message(&message).await {
                Ok(()) => report.delivered += 1,
                Err(e) => warn!(admin_id, error = %e, "admin notification failed"),
            }
        }
        report
    }
}
