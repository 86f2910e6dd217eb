//! Infrastructure adapters. Implement outbound ports.
//!
//! Telegram Bot API, JSON data file, SQLite order log. Map errors to DomainError.

pub mod persistence;
pub mod telegram;
