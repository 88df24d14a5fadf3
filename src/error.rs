//! Error types for the backend client.

use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

/// Client error taxonomy.
///
/// `InvalidArgument` and `AuthorizationDenied` are terminal for the call that
/// raised them. Transport-level failures on one partner's habit fetch are
/// confined to that partner's slot in the fan-out report and never abort
/// sibling fetches.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Caller supplied an empty or malformed account id
    #[error("invalid account id: {0}")]
    InvalidArgument(String),

    /// Requested account is not an active partner of the requesting user
    #[error("account {partner_id} is not an active partner of {user_id}")]
    AuthorizationDenied { user_id: Uuid, partner_id: Uuid },

    /// Referenced account or resource does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// HTTP request failed (connect, TLS, decode)
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Backend returned a non-success status
    #[error("server error {status}: {message}")]
    Server { status: u16, message: String },

    /// Caller-supplied deadline elapsed before the request completed
    #[error("timed out after {0:?}")]
    Timeout(Duration),
}

impl ClientError {
    /// True when the caller's partner id was rejected by the authorization
    /// check rather than by a lookup or transport failure.
    pub fn is_authorization_denied(&self) -> bool {
        matches!(self, ClientError::AuthorizationDenied { .. })
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;
