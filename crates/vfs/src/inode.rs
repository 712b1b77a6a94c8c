//! Bidirectional mapping between inodes, file handles, and identifiers.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use podfs_common::PodUri;

use crate::error::VfsError;

/// The reserved inode number for the tree root, defined by the bridge.
pub const ROOT_INODE: u64 = fuser::FUSE_ROOT_ID;

#[derive(Debug, Default)]
struct RegistryInner {
    /// handle -> identifier.
    by_handle: HashMap<u64, PodUri>,
    /// identifier -> inode, maintained atomically with every registration
    /// so reverse lookup never scans.
    by_uri: HashMap<String, u64>,
    /// inode -> handle.
    handles: HashMap<u64, u64>,
}

/// Session-local registry of every resource the kernel has been shown.
///
/// Inodes are allocated monotonically and never reused within a session;
/// entries are appended, never removed. Invariant: `handle == inode`,
/// always. The handle exists as a separate concept only because the bridge
/// passes handles rather than inodes to read/write/readdir; a future
/// multiplexed-handle design would have to revisit every lookup here.
#[derive(Debug)]
pub struct InodeRegistry {
    next: AtomicU64,
    inner: RwLock<RegistryInner>,
}

impl Default for InodeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl InodeRegistry {
    pub fn new() -> Self {
        Self {
            next: AtomicU64::new(ROOT_INODE + 1),
            inner: RwLock::new(RegistryInner::default()),
        }
    }

    /// Allocate the next unused inode number.
    pub fn new_inode(&self) -> u64 {
        self.next.fetch_add(1, Ordering::SeqCst)
    }

    /// Record `uri` as reachable via `inode`, allocating one if omitted.
    ///
    /// Also registers the coincident file handle. If `uri` was already
    /// registered under another inode, the first registration wins for
    /// reverse lookup.
    ///
    /// # Returns
    /// The inode now bound to `uri`.
    pub fn insert(&self, uri: &PodUri, inode: Option<u64>) -> u64 {
        let inode: u64 = inode.unwrap_or_else(|| self.new_inode());
        let mut inner = self.inner.write().unwrap();
        let handle: u64 = *inner.handles.entry(inode).or_insert(inode);
        inner.by_handle.insert(handle, uri.clone());
        inner
            .by_uri
            .entry(uri.as_str().to_string())
            .or_insert(inode);
        inode
    }

    /// Reuse the inode already bound to `uri`, or register a fresh one.
    ///
    /// This is the path directory reads take for listed children: an
    /// identifier seen in an earlier listing keeps its inode instead of
    /// leaking a new number on every call.
    pub fn bind(&self, uri: &PodUri) -> u64 {
        {
            let inner = self.inner.read().unwrap();
            if let Some(&inode) = inner.by_uri.get(uri.as_str()) {
                return inode;
            }
        }
        self.insert(uri, None)
    }

    /// The handle bound to `inode`, registering the 1:1 binding on first
    /// use.
    pub fn handle_for(&self, inode: u64) -> u64 {
        *self
            .inner
            .write()
            .unwrap()
            .handles
            .entry(inode)
            .or_insert(inode)
    }

    /// Reverse lookup: identifier registered for `inode`.
    ///
    /// # Errors
    /// `VfsError::MappingNotFound` if `inode` was never registered.
    pub fn uri_for_inode(&self, inode: u64) -> Result<PodUri, VfsError> {
        let handle: u64 = self.handle_for(inode);
        self.uri_for_handle(handle)
    }

    /// Reverse lookup: identifier registered for `handle`.
    ///
    /// # Errors
    /// `VfsError::MappingNotFound` if `handle` was never registered.
    pub fn uri_for_handle(&self, handle: u64) -> Result<PodUri, VfsError> {
        self.inner
            .read()
            .unwrap()
            .by_handle
            .get(&handle)
            .cloned()
            .ok_or_else(|| VfsError::MappingNotFound {
                reference: format!("handle {handle}"),
            })
    }

    /// Reverse lookup: inode registered for `uri`.
    ///
    /// # Errors
    /// `VfsError::MappingNotFound` if `uri` was never registered - name
    /// resolution surfaces this as a missing entry even when the resource
    /// exists remotely but was never listed.
    pub fn inode_for_uri(&self, uri: &PodUri) -> Result<u64, VfsError> {
        self.inner
            .read()
            .unwrap()
            .by_uri
            .get(uri.as_str())
            .copied()
            .ok_or_else(|| VfsError::MappingNotFound {
                reference: uri.to_string(),
            })
    }

    /// True iff `inode` resolves to a registered identifier.
    pub fn has_inode(&self, inode: u64) -> bool {
        let inner = self.inner.read().unwrap();
        inner
            .handles
            .get(&inode)
            .is_some_and(|handle| inner.by_handle.contains_key(handle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uri(text: &str) -> PodUri {
        PodUri::parse(text).unwrap()
    }

    #[test]
    fn allocation_is_monotonic_above_the_root() {
        let registry = InodeRegistry::new();
        let first: u64 = registry.new_inode();
        let second: u64 = registry.new_inode();
        assert!(first > ROOT_INODE);
        assert_eq!(second, first + 1);
    }

    #[test]
    fn insert_with_explicit_inode_binds_the_root() {
        let registry = InodeRegistry::new();
        let root = uri("https://p.example/");
        registry.insert(&root, Some(ROOT_INODE));

        assert!(registry.has_inode(ROOT_INODE));
        assert_eq!(registry.uri_for_inode(ROOT_INODE).unwrap(), root);
        assert_eq!(registry.inode_for_uri(&root).unwrap(), ROOT_INODE);
    }

    #[test]
    fn handle_space_coincides_with_inode_space() {
        let registry = InodeRegistry::new();
        let id = uri("https://p.example/a.txt");
        let inode: u64 = registry.insert(&id, None);

        assert_eq!(registry.handle_for(inode), inode);
        assert_eq!(registry.uri_for_handle(inode).unwrap(), id);
    }

    #[test]
    fn bind_reuses_the_registered_inode() {
        let registry = InodeRegistry::new();
        let id = uri("https://p.example/docs/");

        let first: u64 = registry.bind(&id);
        let second: u64 = registry.bind(&id);
        assert_eq!(first, second);
    }

    #[test]
    fn first_registration_wins_for_reverse_lookup() {
        let registry = InodeRegistry::new();
        let id = uri("https://p.example/a.txt");

        let first: u64 = registry.insert(&id, None);
        let duplicate: u64 = registry.insert(&id, None);
        assert_ne!(first, duplicate);
        assert_eq!(registry.inode_for_uri(&id).unwrap(), first);
    }

    #[test]
    fn unregistered_lookups_fail_with_mapping_not_found() {
        let registry = InodeRegistry::new();

        assert!(!registry.has_inode(99));
        assert!(matches!(
            registry.uri_for_inode(99),
            Err(VfsError::MappingNotFound { .. })
        ));
        assert!(matches!(
            registry.inode_for_uri(&uri("https://p.example/ghost")),
            Err(VfsError::MappingNotFound { .. })
        ));
    }
}
