//! Error types for the menu engine.
//!
//! [`MenuError`] is the top-level error; [`ValidationError`] describes why a field commit was rejected.

use thiserror::Error;

use crate::types::MessageId;

/// Top-level error (transport, stale message reference, configuration, validation, routing).
#[derive(Error, Debug)]
pub enum MenuError {
    #[error("Transport error: {0}")]
    Transport(String),

    /// The message to edit or delete no longer exists on the remote side.
    #[error("Message not found: {0}")]
    StaleMessage(MessageId),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Route not found: {0}")]
    RouteNotFound(String),

    #[error("Store error: {0}")]
    Store(String),
}

/// Reasons a candidate value is refused by a field.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Value is mandatory")]
    Empty,

    #[error("Not a number: {0}")]
    NotANumber(String),

    #[error("Value {value} is out of range [{min}, {max}]")]
    OutOfRange { value: f64, min: f64, max: f64 },

    #[error("Value {value} is not a multiple of step {step}")]
    Step { value: f64, step: f64 },

    #[error("Unknown choice: {0}")]
    UnknownChoice(String),

    #[error("Field is read-only: {0}")]
    ReadOnly(String),

    #[error("Change of '{0}' rejected by hook")]
    Vetoed(String),
}

/// Result type for core operations; uses [`MenuError`].
pub type Result<T> = std::result::Result<T, MenuError>;
