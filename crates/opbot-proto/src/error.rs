//! Error types for the protocol crate.

use thiserror::Error;

/// Errors produced while parsing a raw IRC line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessageParseError {
    /// The line was empty or contained only whitespace.
    #[error("empty message")]
    EmptyMessage,

    /// A prefix or tag block was present but no command followed it.
    #[error("message has no command: {0:?}")]
    MissingCommand(String),
}
