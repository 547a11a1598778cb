//! Unified error handling for opbot.
//!
//! Policy errors come from loading, reloading and saving the policy file;
//! session errors end a single server connection and trigger failover.

use thiserror::Error;

// ============================================================================
// Policy Errors (file access and document validation)
// ============================================================================

/// Errors raised while loading, reloading or saving the policy file.
///
/// Entry-level problems never show up here: they are recorded as warnings on
/// the decoded [`Policy`](crate::policy::Policy) instead.
#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("failed to access policy file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse policy document: {0}")]
    Syntax(#[from] serde_json::Error),

    /// The document parsed but failed validation. Carries every error found.
    #[error("policy rejected: {}", .0.join("; "))]
    Rejected(Vec<String>),
}

impl PolicyError {
    /// Get a static error code string for log labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Io(_) => "io",
            Self::Syntax(_) => "syntax",
            Self::Rejected(_) => "rejected",
        }
    }

    /// Human-readable lines describing the failure, one per problem.
    pub fn messages(&self) -> Vec<String> {
        match self {
            Self::Rejected(errors) => errors.clone(),
            other => vec![other.to_string()],
        }
    }
}

// ============================================================================
// Session Errors (one server connection)
// ============================================================================

/// Errors that end a connection to an IRC server.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid TLS server name: {0}")]
    InvalidServerName(String),

    #[error("connection closed by server")]
    Closed,

    #[error("policy lists no servers")]
    NoServers,
}

/// Result type for session operations.
pub type SessionResult<T = ()> = Result<T, SessionError>;
