//! Domain errors. Used by ports and use cases.
//!
//! Adapters map infrastructure errors into `DomainError`. `InputError` covers
//! user input that is answered with a re-prompt and never surfaces as a failure.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Telegram gateway error: {0}")]
    Gateway(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Order log error: {0}")]
    OrderLog(String),

    #[error("Export failed: {0}")]
    Export(String),
}

/// Rejected user input. The conversation re-prompts and keeps its state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("not a number")]
    NotANumber,

    #[error("value must be greater than zero")]
    NotPositive,

    #[error("value is too large")]
    TooLarge,

    #[error("at most two decimal places are allowed")]
    TooManyDecimals,

    #[error("unknown platform: {0}")]
    UnknownPlatform(String),

    #[error("unknown action: {0}")]
    UnknownAction(String),

    #[error("invalid catalog item: {0}")]
    InvalidItem(String),
}
