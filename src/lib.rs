//! storefront-bot: Telegram storefront for in-game coins, games and subscriptions,
//! with an admin panel. Hexagonal layout: domain, ports, use cases, adapters.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod shared;
pub mod usecases;
