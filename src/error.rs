use reqwest::StatusCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PortalError>;

/// Errors surfaced by the backend client, the decoders and the controllers.
///
/// Every variant is recoverable by retrying the user action. The type is
/// `Clone` so it can be kept in observable list and form state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PortalError {
    /// The request failed before a response was received
    #[error("Network error: {0}")]
    Network(String),

    /// Get-by-id or delete returned 404
    #[error("{entity} '{id}' not found")]
    NotFound { entity: String, id: String },

    /// The backend rejected the payload
    #[error("Validation failed (HTTP {status}): {reason}")]
    Validation { status: u16, reason: String },

    /// Concurrent edit collision
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A recipient payload carried a `type` outside the known variant set
    #[error("Unrecognized recipient type '{0}'")]
    UnrecognizedVariant(String),

    /// The response body could not be decoded into the expected shape
    #[error("Decode error: {0}")]
    Decode(String),

    /// The request cannot name a record: a bad base URL or an unusable id
    #[error("Invalid request target: {0}")]
    InvalidTarget(String),

    /// Any other non-success status
    #[error("Server error (HTTP {status}): {body}")]
    Server { status: u16, body: String },
}

impl PortalError {
    /// Map a non-success HTTP status to the matching variant
    pub fn from_status(status: StatusCode, entity: &str, id: Option<&str>, body: String) -> Self {
        match status {
            StatusCode::NOT_FOUND => PortalError::NotFound {
                entity: entity.to_string(),
                id: id.unwrap_or_default().to_string(),
            },
            StatusCode::CONFLICT => PortalError::Conflict(body),
            s if s.is_client_error() => PortalError::Validation {
                status: s.as_u16(),
                reason: body,
            },
            s => PortalError::Server {
                status: s.as_u16(),
                body,
            },
        }
    }
}

impl From<reqwest::Error> for PortalError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            PortalError::Decode(err.to_string())
        } else {
            PortalError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for PortalError {
    fn from(err: serde_json::Error) -> Self {
        PortalError::Decode(err.to_string())
    }
}
