//! Identifier-keyed cache of remote resource information.

use std::collections::HashMap;
use std::sync::RwLock;

use podfs_common::PodUri;

use crate::error::VfsError;

/// A generic identifier -> value store.
///
/// Used three times by the session with different value types: container
/// listings, item metadata, and item content. Entries live for the process
/// lifetime unless explicitly deleted; there is no capacity bound and no
/// expiry. The cache itself only guards individual operations - callers
/// that need an atomic check-then-fetch sequence impose their own
/// serialization on top.
#[derive(Debug)]
pub struct InfoCache<V> {
    entries: RwLock<HashMap<String, V>>,
}

impl<V> Default for InfoCache<V> {
    fn default() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl<V: Clone> InfoCache<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// True iff an entry exists for `uri`.
    pub fn has(&self, uri: &PodUri) -> bool {
        self.entries.read().unwrap().contains_key(uri.as_str())
    }

    /// Insert or replace the entry for `uri`.
    pub fn put(&self, uri: &PodUri, value: V) {
        self.entries
            .write()
            .unwrap()
            .insert(uri.as_str().to_string(), value);
    }

    /// Fetch the entry for `uri`.
    ///
    /// # Errors
    /// Fails with `VfsError::CacheMiss` if absent; callers either check
    /// `has` first or handle the miss.
    pub fn get(&self, uri: &PodUri) -> Result<V, VfsError> {
        self.entries
            .read()
            .unwrap()
            .get(uri.as_str())
            .cloned()
            .ok_or_else(|| VfsError::CacheMiss {
                uri: uri.to_string(),
            })
    }

    /// Remove the entry for `uri`, if any.
    pub fn delete(&self, uri: &PodUri) {
        self.entries.write().unwrap().remove(uri.as_str());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uri(text: &str) -> PodUri {
        PodUri::parse(text).unwrap()
    }

    #[test]
    fn put_get_roundtrip() {
        let cache: InfoCache<Vec<u8>> = InfoCache::new();
        let id = uri("https://p.example/a.txt");

        assert!(!cache.has(&id));
        cache.put(&id, b"abc".to_vec());
        assert!(cache.has(&id));
        assert_eq!(cache.get(&id).unwrap(), b"abc");
    }

    #[test]
    fn get_of_absent_entry_is_a_cache_miss() {
        let cache: InfoCache<u32> = InfoCache::new();
        let err = cache.get(&uri("https://p.example/missing")).unwrap_err();
        assert!(matches!(err, VfsError::CacheMiss { .. }));
    }

    #[test]
    fn put_replaces_and_delete_removes() {
        let cache: InfoCache<u32> = InfoCache::new();
        let id = uri("https://p.example/a.txt");

        cache.put(&id, 1);
        cache.put(&id, 2);
        assert_eq!(cache.get(&id).unwrap(), 2);

        cache.delete(&id);
        assert!(!cache.has(&id));
    }
}
