//! Client trait/interface for pod operations.

use async_trait::async_trait;
use podfs_common::PodUri;

use crate::error::ClientError;
use crate::types::FolderListing;

/// Remote pod operations - implemented by each backend.
///
/// The VFS is written entirely against this trait; tests substitute an
/// in-memory double with fetch counters.
#[async_trait]
pub trait PodClient: Send + Sync {
    /// List the children of a container.
    async fn read_folder(&self, uri: &PodUri) -> Result<FolderListing, ClientError>;

    /// Fetch the full byte content of an item.
    async fn get(&self, uri: &PodUri) -> Result<Vec<u8>, ClientError>;

    /// Replace the full content of an item.
    ///
    /// # Arguments
    /// * `uri` - Item identifier
    /// * `data` - New full content
    /// * `media_type` - Content-type hint, derived from the URI's extension
    async fn put_file(
        &self,
        uri: &PodUri,
        data: &[u8],
        media_type: &str,
    ) -> Result<(), ClientError>;
}
