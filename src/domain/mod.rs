//! Core domain layer. No external I/O dependencies.
//!
//! Entities, pricing rules, session states and the button protocol live here.

pub mod actions;
pub mod entities;
pub mod errors;
pub mod messages;
pub mod pricing;
pub mod session;

pub use actions::{Action, AdminAction};
pub use entities::{
    AdministratorSet, CatalogItem, Category, Order, OrderKind, OrderStatus, Platform, PriceEntry,
    Rate, UserRef,
};
pub use errors::{DomainError, InputError};
pub use messages::{Button, EventKind, InboundEvent, Keyboard, OutboundMessage};
pub use pricing::{COINS_PER_RATE_UNIT, MAX_AMOUNT, coin_total, parse_quantity};
pub use session::{AdminState, Session, SessionState};
