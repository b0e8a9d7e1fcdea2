//! Session manager error types

use crate::codec::CodecError;
use crate::store::StorageError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Result type for session manager operations
pub type SessionResult<T> = Result<T, SessionError>;

/// Errors from storing or resuming a suspended request.
///
/// "Nothing pending" is not an error: lookups return `Ok(None)` for it.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The message to store has an empty identifier
    #[error("Protocol message has no identifier")]
    MissingRequestId,

    /// An outbound message or context could not be encoded
    #[error("Failed to encode pending request: {0}")]
    Encoding(#[source] CodecError),

    /// A stored entry exists but cannot be turned back into a message and
    /// context of the requested kind. Indicates tampering or corruption.
    #[error("Corrupt correlation entry {request_id}: {source}")]
    CorruptEntry {
        request_id: String,
        #[source]
        source: CodecError,
    },

    /// The session attribute holding the entries is not an entry map
    #[error("Corrupt correlation mapping in session: {0}")]
    CorruptMapping(String),

    /// The session collaborator failed
    #[error("Session storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saml_status: Option<String>,
}

impl IntoResponse for SessionError {
    fn into_response(self) -> Response {
        let (status, error_code, saml_status) = match &self {
            SessionError::MissingRequestId => (
                StatusCode::BAD_REQUEST,
                "invalid_request",
                "urn:oasis:names:tc:SAML:2.0:status:Requester",
            ),
            SessionError::CorruptEntry { .. } => (
                StatusCode::BAD_REQUEST,
                "corrupt_request_session",
                "urn:oasis:names:tc:SAML:2.0:status:Requester",
            ),
            SessionError::Encoding(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "request_encoding_failed",
                "urn:oasis:names:tc:SAML:2.0:status:Responder",
            ),
            SessionError::CorruptMapping(_) | SessionError::Storage(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "session_storage_error",
                "urn:oasis:names:tc:SAML:2.0:status:Responder",
            ),
        };

        let message = match &self {
            SessionError::MissingRequestId => self.to_string(),
            SessionError::CorruptEntry { request_id, source } => {
                tracing::warn!(
                    request_id = %request_id,
                    error = %source,
                    "Rejected corrupt SAML request session"
                );
                "The pending SAML request could not be restored".to_string()
            }
            SessionError::Encoding(e) => {
                tracing::error!("SAML request encoding error: {}", e);
                "An internal error occurred".to_string()
            }
            SessionError::CorruptMapping(msg) => {
                tracing::error!("SAML session mapping corrupt: {}", msg);
                "A session storage error occurred".to_string()
            }
            SessionError::Storage(e) => {
                tracing::error!("SAML session storage error: {}", e);
                "A session storage error occurred".to_string()
            }
        };

        let body = ErrorResponse {
            error: error_code.to_string(),
            message,
            saml_status: Some(saml_status.to_string()),
        };

        (status, Json(body)).into_response()
    }
}
