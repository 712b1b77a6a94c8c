//! Error types for pod protocol operations.

use thiserror::Error;

/// Errors that can occur while talking to a pod or its identity provider.
#[derive(Debug, Error, Clone)]
pub enum ClientError {
    /// Resource does not exist on the remote store.
    #[error("Resource not found: {uri}")]
    NotFound { uri: String },

    /// The server refused access to the resource.
    #[error("Access denied to {uri} (status {status})")]
    AccessDenied { uri: String, status: u16 },

    /// The server answered with a status the client cannot act on.
    #[error("Unexpected status {status} for {uri}")]
    UnexpectedStatus { uri: String, status: u16 },

    /// Transport-level failure (DNS, connect, timeout, body read).
    #[error("Network error for {uri}: {message}")]
    Network { uri: String, message: String },

    /// The identity provider rejected the login.
    #[error("Login against {idp} failed: {message}")]
    LoginFailed { idp: String, message: String },

    /// The containment document could not be interpreted.
    #[error("Malformed containment document for {uri}: {message}")]
    Protocol { uri: String, message: String },
}
