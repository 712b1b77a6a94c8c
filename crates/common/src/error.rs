//! Shared error types used across podfs crates.

use thiserror::Error;

/// URI-related errors shared across crates.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UriError {
    /// URI could not be parsed or manipulated.
    #[error("Malformed pod URI {uri}: {message}")]
    Malformed {
        /// The offending URI text.
        uri: String,
        /// Parser error message.
        message: String,
    },

    /// No parent segment exists above this URI.
    ///
    /// This should never occur below the pod root; hitting it there is an
    /// internal-consistency fault, not a user error.
    #[error("No parent above {uri}")]
    NoParent {
        /// The URI that has no parent.
        uri: String,
    },

    /// A child name is not usable as a single path segment.
    #[error("Invalid path segment: {name:?}")]
    InvalidSegment {
        /// The rejected name.
        name: String,
    },
}
