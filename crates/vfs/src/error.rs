//! Error types for the VFS crate.

use podfs_client::ClientError;
use podfs_common::UriError;
use thiserror::Error;

/// Errors that can occur during VFS operations.
///
/// Everything here propagates with `?` through the session layer and is
/// translated to an errno only at the FUSE callback boundary.
#[derive(Debug, Error)]
pub enum VfsError {
    /// Cache miss surfaced to the caller rather than silently handled.
    #[error("No cached entry for {uri}")]
    CacheMiss { uri: String },

    /// Metadata requested for an identifier that was never primed by a
    /// listing fetch - a local ordering fault, not a remote-absence signal.
    #[error("No local metadata for {uri}: resource was never listed")]
    LocalInfoNotFound { uri: String },

    /// Inode/handle/identifier cross-reference absent from the registry.
    #[error("No mapping registered for {reference}")]
    MappingNotFound { reference: String },

    /// URI navigation fault (no parent above the pod root, bad segment).
    #[error(transparent)]
    Uri(#[from] UriError),

    /// Remote-transport fault, passed through unchanged from the client.
    #[error(transparent)]
    Client(#[from] ClientError),
}
