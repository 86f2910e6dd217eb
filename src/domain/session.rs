//! Per-user conversation state.
//!
//! A session is created on a user's first event and reset to `Idle` after an order is
//! confirmed or cancelled. Scratch data (platform, pending order) lives inside the state
//! variant that needs it, so a reset discards it.

use crate::domain::entities::{Order, Platform};
use chrono::{DateTime, Duration, Utc};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Menu,
    PlatformSelect,
    QuantityEntry {
        platform: Platform,
    },
    /// Coin order computed and shown; waiting for confirm/cancel.
    PriceConfirm {
        order: Order,
    },
    GameBrowse,
    SubscriptionBrowse,
    /// Catalog item chosen; waiting for confirm/cancel.
    ItemConfirm {
        order: Order,
    },
    Admin(AdminState),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminState {
    Menu,
    ChoosePlatform,
    AwaitRate { platform: Platform },
    Catalog,
    AwaitItem,
}

#[derive(Debug, Clone)]
pub struct Session {
    pub state: SessionState,
    pub last_activity: DateTime<Utc>,
}

impl Session {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            state: SessionState::Idle,
            last_activity: now,
        }
    }

    /// Back to `Idle`, dropping any scratch data.
    pub fn reset(&mut self) {
        self.state = SessionState::Idle;
    }

    /// True when the session has been inactive for longer than `idle` and is not already idle.
    pub fn is_expired(&self, now: DateTime<Utc>, idle: Duration) -> bool {
        self.state != SessionState::Idle && now - self.last_activity > idle
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_activity = now;
    }

    /// The order waiting for confirmation, if any.
    pub fn pending_order(&self) -> Option<&Order> {
        match &self.state {
            SessionState::PriceConfirm { order } | SessionState::ItemConfirm { order } => {
                Some(order)
            }
            _ => None,
        }
    }
}
