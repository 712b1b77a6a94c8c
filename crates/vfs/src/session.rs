//! Session state and resource access orchestration.
//!
//! `PodSession` owns the three identity caches and the inode registry, and
//! is the only component that talks to the remote client. Every method
//! accepts a `ResourceRef` - any one of inode, handle, or identifier - and
//! resolves the rest through the registry before proceeding.

use podfs_client::{media_type_for, FolderEntry, FolderListing, PodClient};
use podfs_common::PodUri;
use tokio::sync::Mutex;

use crate::cache::InfoCache;
use crate::error::VfsError;
use crate::inode::{InodeRegistry, ROOT_INODE};
use crate::options::VfsOptions;

/// A reference to a resource by any of its session-local names.
///
/// When a caller could supply more than one, resolution priority is inode,
/// then handle, then identifier.
#[derive(Debug, Clone)]
pub enum ResourceRef<'a> {
    /// Kernel inode number.
    Inode(u64),
    /// Session file handle (numerically identical to its inode).
    Handle(u64),
    /// Full identifier.
    Uri(&'a PodUri),
}

/// Cached metadata for a resolved resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Metadata {
    /// The resource is a container with a cached listing.
    Container(FolderListing),
    /// The resource is a child record from its parent's listing.
    Item(FolderEntry),
}

impl Metadata {
    /// Identifier of the described resource.
    pub fn uri(&self) -> &PodUri {
        match self {
            Metadata::Container(listing) => &listing.uri,
            Metadata::Item(entry) => &entry.uri,
        }
    }
}

/// One mount's worth of state: caches, registry, and the remote client.
///
/// Constructed at mount time, dropped at unmount. The constructor binds the
/// pod root to the reserved root inode and primes its listing, so metadata
/// for the root is servable before the first kernel call arrives.
pub struct PodSession<C> {
    client: C,
    root: PodUri,
    options: VfsOptions,
    registry: InodeRegistry,
    listings: InfoCache<FolderListing>,
    entries: InfoCache<FolderEntry>,
    contents: InfoCache<Vec<u8>>,
    /// Serializes every check-then-fetch sequence and the read-modify-write
    /// in `write_at`, so concurrently dispatched callbacks cannot duplicate
    /// fetches or lose writes.
    fetch_lock: Mutex<()>,
}

impl<C: PodClient> PodSession<C> {
    /// Construct a session rooted at `root` and prime the root listing.
    ///
    /// # Arguments
    /// * `client` - Remote protocol client (already logged in if needed)
    /// * `root` - Pod root identifier; must be a container
    /// * `options` - Session options
    ///
    /// # Errors
    /// Fails if the root listing cannot be fetched.
    pub async fn new(client: C, root: PodUri, options: VfsOptions) -> Result<Self, VfsError> {
        let session = Self {
            client,
            root: root.clone(),
            options,
            registry: InodeRegistry::new(),
            listings: InfoCache::new(),
            entries: InfoCache::new(),
            contents: InfoCache::new(),
            fetch_lock: Mutex::new(()),
        };
        session.registry.insert(&root, Some(ROOT_INODE));
        session.retrieve_and_cache(&root).await?;
        Ok(session)
    }

    /// The pod root identifier this session is mounted on.
    pub fn root(&self) -> &PodUri {
        &self.root
    }

    /// Session options.
    pub fn options(&self) -> &VfsOptions {
        &self.options
    }

    /// True iff `inode` was registered by this session.
    pub fn has_inode(&self, inode: u64) -> bool {
        self.registry.has_inode(inode)
    }

    /// Inode registered for `uri`.
    ///
    /// # Errors
    /// `MappingNotFound` if the identifier was never seen in a listing.
    pub fn inode_for_uri(&self, uri: &PodUri) -> Result<u64, VfsError> {
        self.registry.inode_for_uri(uri)
    }

    /// Inode for a listed child, reusing the registered one if present.
    pub fn bind(&self, uri: &PodUri) -> u64 {
        self.registry.bind(uri)
    }

    /// Resolve any reference form into the full identifier.
    fn resolve(&self, reference: ResourceRef<'_>) -> Result<PodUri, VfsError> {
        match reference {
            ResourceRef::Inode(inode) => {
                let handle: u64 = self.registry.handle_for(inode);
                self.registry.uri_for_handle(handle)
            }
            ResourceRef::Handle(handle) => self.registry.uri_for_handle(handle),
            ResourceRef::Uri(uri) => Ok(uri.clone()),
        }
    }

    /// Cached metadata for a resource. Never performs network I/O - the
    /// precondition (a prior priming fetch) is established by the
    /// open/opendir handlers via `prepare`/`prepare_resource`.
    ///
    /// # Errors
    /// `LocalInfoNotFound` if the identifier was never primed.
    pub fn metadata_for(&self, reference: ResourceRef<'_>) -> Result<Metadata, VfsError> {
        let uri: PodUri = self.resolve(reference)?;
        if uri == self.root || self.listings.has(&uri) {
            return Ok(Metadata::Container(self.listings.get(&uri)?));
        }
        match self.entries.get(&uri) {
            Ok(entry) => Ok(Metadata::Item(entry)),
            Err(VfsError::CacheMiss { .. }) => Err(VfsError::LocalInfoNotFound {
                uri: uri.to_string(),
            }),
            Err(other) => Err(other),
        }
    }

    /// Container listing for a resource, fetching on miss.
    ///
    /// This is the sole network-fetching path for hierarchy data. For an
    /// item reference the parent container is fetched instead (only
    /// containers are listed remotely) and its listing is returned.
    pub async fn listing_for(&self, reference: ResourceRef<'_>) -> Result<FolderListing, VfsError> {
        let uri: PodUri = self.resolve(reference)?;
        if self.listings.has(&uri) {
            return self.listings.get(&uri);
        }

        let _guard = self.fetch_lock.lock().await;
        if self.listings.has(&uri) {
            return self.listings.get(&uri);
        }
        let target: PodUri = if uri.is_container() {
            uri
        } else {
            uri.parent()?
        };
        self.retrieve_and_cache(&target).await?;
        self.listings.get(&target)
    }

    /// Full byte content of an item, fetching on miss.
    pub async fn content_for(&self, reference: ResourceRef<'_>) -> Result<Vec<u8>, VfsError> {
        let uri: PodUri = self.resolve(reference)?;
        if self.contents.has(&uri) {
            return self.contents.get(&uri);
        }
        let _guard = self.fetch_lock.lock().await;
        self.cached_or_fetched_content(&uri).await
    }

    /// Byte length of an item's content.
    ///
    /// Forces a full content fetch merely to answer a size query - an
    /// accepted cost of caching items whole.
    pub async fn size_of(&self, reference: ResourceRef<'_>) -> Result<u64, VfsError> {
        Ok(self.content_for(reference).await?.len() as u64)
    }

    /// Push `data` verbatim as the new full content of a resource.
    ///
    /// Does not touch the content cache; `write_at` is the caller-facing
    /// read-modify-write that keeps cache and remote consistent.
    pub async fn put(&self, reference: ResourceRef<'_>, data: &[u8]) -> Result<(), VfsError> {
        let uri: PodUri = self.resolve(reference)?;
        let media_type: &str = media_type_for(&uri);
        self.client.put_file(&uri, data, media_type).await?;
        Ok(())
    }

    /// Splice `data` into the item's content at `offset` and write through.
    ///
    /// The cache is updated only after the remote push succeeds; a failed
    /// push aborts the call and leaves the cached content untouched, so
    /// cache and remote never diverge on this path. Writes past the current
    /// end of content zero-fill the gap.
    ///
    /// # Returns
    /// The number of bytes accepted, always `data.len()`.
    pub async fn write_at(
        &self,
        reference: ResourceRef<'_>,
        offset: u64,
        data: &[u8],
    ) -> Result<usize, VfsError> {
        let uri: PodUri = self.resolve(reference)?;

        let _guard = self.fetch_lock.lock().await;
        let current: Vec<u8> = self.cached_or_fetched_content(&uri).await?;
        let spliced: Vec<u8> = splice(current, offset as usize, data);
        self.put(ResourceRef::Uri(&uri), &spliced).await?;
        self.contents.put(&uri, spliced);
        Ok(data.len())
    }

    /// Open step for directories: bootstrap the container listing and hand
    /// back the session handle. This is the boundary that triggers the
    /// first hierarchy fetch for an inode.
    pub async fn prepare(&self, reference: ResourceRef<'_>) -> Result<u64, VfsError> {
        let uri: PodUri = self.resolve(reference)?;
        self.listing_for(ResourceRef::Uri(&uri)).await?;
        let inode: u64 = self.registry.inode_for_uri(&uri)?;
        Ok(self.registry.handle_for(inode))
    }

    /// Open step for items: ensure content is cached and hand back the
    /// session handle.
    pub async fn prepare_resource(&self, reference: ResourceRef<'_>) -> Result<u64, VfsError> {
        let uri: PodUri = self.resolve(reference)?;
        self.content_for(ResourceRef::Uri(&uri)).await?;
        let inode: u64 = self.registry.inode_for_uri(&uri)?;
        Ok(self.registry.handle_for(inode))
    }

    /// Fetch a container's listing, register every child, and under the
    /// eager priming policy fetch each sub-item's content as well.
    async fn retrieve_and_cache(&self, uri: &PodUri) -> Result<(), VfsError> {
        tracing::debug!(uri = %uri, "retrieve_and_cache");
        let listing: FolderListing = self.client.read_folder(uri).await?;

        for sub in &listing.folders {
            tracing::debug!(child = %sub.uri, "registering sub-container");
            self.registry.bind(&sub.uri);
            self.entries.put(&sub.uri, sub.clone());
        }
        for sub in &listing.files {
            tracing::debug!(child = %sub.uri, "registering sub-item");
            self.registry.bind(&sub.uri);
            self.entries.put(&sub.uri, sub.clone());
            if self.options.priming.is_eager() {
                self.retrieve_and_cache_resource(&sub.uri).await?;
            }
        }

        self.listings.put(uri, listing);
        Ok(())
    }

    /// Fetch an item's full content into the content cache.
    async fn retrieve_and_cache_resource(&self, uri: &PodUri) -> Result<(), VfsError> {
        tracing::debug!(uri = %uri, "retrieve_and_cache_resource");
        let data: Vec<u8> = self.client.get(uri).await?;
        self.contents.put(uri, data);
        Ok(())
    }

    /// Content lookup that fetches on miss. Callers hold `fetch_lock`.
    async fn cached_or_fetched_content(&self, uri: &PodUri) -> Result<Vec<u8>, VfsError> {
        if !self.contents.has(uri) {
            self.retrieve_and_cache_resource(uri).await?;
        }
        self.contents.get(uri)
    }
}

/// Replace `current[offset..offset + data.len()]` with `data`, growing the
/// buffer (zero-filled) when the write extends past the current end.
fn splice(mut current: Vec<u8>, offset: usize, data: &[u8]) -> Vec<u8> {
    let end: usize = offset + data.len();
    if current.len() < end {
        current.resize(end, 0);
    }
    current[offset..end].copy_from_slice(data);
    current
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splice_overwrites_in_place() {
        let spliced = splice(b"hello world".to_vec(), 6, b"rusty");
        assert_eq!(spliced, b"hello rusty");
    }

    #[test]
    fn splice_appends_at_the_end() {
        let spliced = splice(b"hello".to_vec(), 5, b"!!!");
        assert_eq!(spliced, b"hello!!!");
    }

    #[test]
    fn splice_zero_fills_a_gap() {
        let spliced = splice(b"ab".to_vec(), 4, b"cd");
        assert_eq!(spliced, b"ab\0\0cd");
    }

    #[test]
    fn splice_grows_past_the_end_mid_overlap() {
        let spliced = splice(b"abcdef".to_vec(), 4, b"XYZ");
        assert_eq!(spliced, b"abcdXYZ");
    }
}
