//! Error types for the Readerly core
//!
//! This module defines error types using thiserror for ergonomic error handling.
//! Every fallible core operation (`list_shelves`, `scan`, `toggle`,
//! `update_progress`) resolves to one of four user-facing failure categories:
//!
//! - `AuthRequired` — no usable bearer credential; the user must re-authenticate
//! - `RemoteUnavailable` — a network or server failure on a single remote call
//! - `InvariantViolation` — the remote rejected a membership swap or reported
//!   state the client must not render; forces a full reconciliation scan
//! - `ValidationError` — bad input, rejected before any network call
//!
//! Transport-level variants (`InvalidRemoteResponse`, `Timeout`, `Cancelled`,
//! conversions from reqwest/serde_json) exist for diagnostics but collapse into
//! the categories above via [`ShelfError::kind`].

use thiserror::Error;

/// Result type alias using our ShelfError type
pub type Result<T> = std::result::Result<T, ShelfError>;

/// The four failure categories surfaced to presentation code.
///
/// Rendering layers switch on this instead of the full [`ShelfError`] so new
/// diagnostic variants never leak into UI match arms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// User must re-authenticate before retrying
    AuthRequired,
    /// Transient or permanent remote failure; safe to retry later
    RemoteUnavailable,
    /// Remote state disagrees with what the client may render
    InvariantViolation,
    /// Input was rejected locally; retrying without changes cannot succeed
    ValidationError,
}

/// Main error type for the Readerly core
#[derive(Error, Debug)]
pub enum ShelfError {
    // ===== Authentication =====

    /// No valid bearer credential could be obtained
    #[error("authentication required: {message}")]
    AuthRequired {
        message: String,
    },

    // ===== Remote failures =====

    /// A single remote call failed (network error or server-side failure)
    #[error("remote unavailable: {message}")]
    RemoteUnavailable {
        message: String,
        /// HTTP status code if a response was received
        status_code: Option<u16>,
        /// Endpoint path that failed
        endpoint: Option<String>,
        /// Whether a retry might succeed
        transient: bool,
    },

    /// The remote returned a body that could not be decoded
    #[error("invalid remote response: {message}")]
    InvalidRemoteResponse {
        message: String,
        /// Response body snippet for debugging
        response_body: Option<String>,
    },

    /// A probe or mutation did not resolve within the bounded interval
    #[error("operation timed out after {0} seconds")]
    Timeout(u64),

    /// The requesting view went away before the operation settled
    #[error("operation cancelled")]
    Cancelled,

    // ===== Consistency =====

    /// The remote rejected an exclusivity swap, or a partial swap left state
    /// the client must not render as-is
    #[error("membership invariant violated for edition '{edition_id}': {message}")]
    InvariantViolation {
        message: String,
        edition_id: String,
    },

    // ===== Local validation =====

    /// Input rejected before any network call was made
    #[error("validation error: {0}")]
    ValidationError(String),

    // ===== General =====

    /// Internal error that should not normally occur
    #[error("internal error: {0}")]
    Internal(String),

    // ===== External library errors =====

    /// HTTP client error from reqwest
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// Helper methods for creating common errors
impl ShelfError {
    /// Create an AuthRequired error
    pub fn auth_required<S: Into<String>>(message: S) -> Self {
        ShelfError::AuthRequired {
            message: message.into(),
        }
    }

    /// Create a RemoteUnavailable error with status/endpoint context
    pub fn remote<S: Into<String>>(
        message: S,
        status_code: Option<u16>,
        endpoint: Option<String>,
        transient: bool,
    ) -> Self {
        ShelfError::RemoteUnavailable {
            message: message.into(),
            status_code,
            endpoint,
            transient,
        }
    }

    /// Create an InvariantViolation error for one edition
    pub fn invariant<S: Into<String>>(message: S, edition_id: impl Into<String>) -> Self {
        ShelfError::InvariantViolation {
            message: message.into(),
            edition_id: edition_id.into(),
        }
    }

    /// Create a ValidationError
    pub fn validation<S: Into<String>>(message: S) -> Self {
        ShelfError::ValidationError(message.into())
    }

    /// Create an Internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        ShelfError::Internal(message.into())
    }

    /// Collapse this error into one of the four user-facing categories
    pub fn kind(&self) -> FailureKind {
        match self {
            ShelfError::AuthRequired { .. } => FailureKind::AuthRequired,
            ShelfError::InvariantViolation { .. } => FailureKind::InvariantViolation,
            ShelfError::ValidationError(_) => FailureKind::ValidationError,
            ShelfError::Internal(_)
            | ShelfError::RemoteUnavailable { .. }
            | ShelfError::InvalidRemoteResponse { .. }
            | ShelfError::Timeout(_)
            | ShelfError::Cancelled
            | ShelfError::Http(_)
            | ShelfError::Json(_) => FailureKind::RemoteUnavailable,
        }
    }

    /// Check if the user needs to re-authenticate
    pub fn is_auth_error(&self) -> bool {
        matches!(self, ShelfError::AuthRequired { .. })
    }

    /// Check if a retry might succeed (network blips, timeouts, 5xx)
    pub fn is_transient(&self) -> bool {
        match self {
            ShelfError::RemoteUnavailable { transient, .. } => *transient,
            ShelfError::Timeout(_) => true,
            ShelfError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            _ => false,
        }
    }

    /// Check whether further toggles on the affected edition must be preceded
    /// by a full reconciliation scan
    pub fn forces_rescan(&self) -> bool {
        matches!(self, ShelfError::InvariantViolation { .. })
    }

    /// Get user-friendly error message suitable for display
    pub fn user_message(&self) -> String {
        match self {
            ShelfError::AuthRequired { .. } => {
                "Your session has expired. Please sign in again.".to_string()
            }
            ShelfError::RemoteUnavailable { transient: true, .. } | ShelfError::Timeout(_) => {
                "Couldn't reach your shelves. Check your connection and try again.".to_string()
            }
            ShelfError::RemoteUnavailable { .. } => {
                "Something went wrong talking to the server. Please try again later.".to_string()
            }
            ShelfError::InvariantViolation { .. } => {
                "Your shelves changed elsewhere. Refreshing to the latest state.".to_string()
            }
            ShelfError::ValidationError(msg) => msg.clone(),
            _ => self.to_string(),
        }
    }
}

impl From<tokio::time::error::Elapsed> for ShelfError {
    fn from(_: tokio::time::error::Elapsed) -> Self {
        ShelfError::Timeout(0)
    }
}

// ===== TESTS =====
