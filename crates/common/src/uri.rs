//! Pod URI navigation.
//!
//! Resources in a pod form a strict tree addressed by hierarchical URIs.
//! A trailing `/` on the path marks a container (directory-like); its absence
//! marks an item (file-like). `PodUri` wraps a parsed URL and provides the
//! pure navigation operations the rest of podfs is built on: classification,
//! parent derivation, and child composition.

use std::fmt;

use percent_encoding::percent_decode_str;
use url::Url;

use crate::error::UriError;

/// A resource identifier within a pod.
///
/// The canonical string form (`as_str`) is the key used by every cache and
/// registry in podfs; two `PodUri` values are equal iff their canonical
/// forms are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PodUri {
    inner: Url,
}

impl PodUri {
    /// Parse a pod URI from text.
    ///
    /// # Arguments
    /// * `text` - Absolute URI, e.g. `https://alice.example/docs/`
    ///
    /// # Errors
    /// Returns `UriError::Malformed` for relative or non-hierarchical URIs.
    pub fn parse(text: &str) -> Result<Self, UriError> {
        let inner: Url = Url::parse(text).map_err(|e| UriError::Malformed {
            uri: text.to_string(),
            message: e.to_string(),
        })?;
        if inner.cannot_be_a_base() {
            return Err(UriError::Malformed {
                uri: text.to_string(),
                message: "not a hierarchical URI".to_string(),
            });
        }
        Ok(Self { inner })
    }

    /// Canonical string form of this identifier.
    pub fn as_str(&self) -> &str {
        self.inner.as_str()
    }

    /// True iff this identifier denotes a container.
    pub fn is_container(&self) -> bool {
        self.inner.path().ends_with('/')
    }

    /// Derive the parent container's identifier.
    ///
    /// Strips the last path segment and keeps the trailing separator, so the
    /// result is always a container URI.
    ///
    /// # Errors
    /// Returns `UriError::NoParent` at the host root. Callers operating below
    /// the pod root must treat that as an internal-consistency fault.
    pub fn parent(&self) -> Result<PodUri, UriError> {
        let mut segments: Vec<String> = self
            .inner
            .path_segments()
            .map(|segs| {
                segs.filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        if segments.pop().is_none() {
            return Err(UriError::NoParent {
                uri: self.inner.to_string(),
            });
        }

        let mut url: Url = self.inner.clone();
        let mut path = String::from("/");
        for segment in &segments {
            path.push_str(segment);
            path.push('/');
        }
        url.set_path(&path);
        Ok(Self { inner: url })
    }

    /// Compose a child identifier by appending `name` as the next segment.
    ///
    /// `name` is a single path segment; a trailing `/` composes a container
    /// child, otherwise an item child. Names arrive from the kernel as raw
    /// bytes and must already be decoded to UTF-8 at the caller; rejection
    /// here signals a programming error, not a recoverable fault.
    ///
    /// # Errors
    /// Returns `UriError::InvalidSegment` for empty, dot, or multi-segment
    /// names.
    pub fn child(&self, name: &str) -> Result<PodUri, UriError> {
        let (stem, container) = match name.strip_suffix('/') {
            Some(stem) => (stem, true),
            None => (name, false),
        };
        if stem.is_empty() || stem == "." || stem == ".." || stem.contains('/') {
            return Err(UriError::InvalidSegment {
                name: name.to_string(),
            });
        }

        let mut url: Url = self.inner.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| UriError::Malformed {
                    uri: self.inner.to_string(),
                    message: "cannot extend path".to_string(),
                })?;
            segments.pop_if_empty();
            segments.push(stem);
            if container {
                // trailing empty segment re-adds the separator
                segments.push("");
            }
        }
        Ok(Self { inner: url })
    }

    /// Resolve a URI reference against this identifier.
    ///
    /// Accepts both absolute URIs and references relative to this one, as
    /// they appear in containment documents.
    ///
    /// # Arguments
    /// * `reference` - Absolute URI or relative reference
    pub fn join(&self, reference: &str) -> Result<PodUri, UriError> {
        let inner: Url = self.inner.join(reference).map_err(|e| UriError::Malformed {
            uri: reference.to_string(),
            message: e.to_string(),
        })?;
        Ok(Self { inner })
    }

    /// The final path segment, percent-decoded.
    ///
    /// For containers the trailing separator is retained, so
    /// `parent.child(&uri.last_segment()?)` reproduces `uri` including its
    /// classification. Returns `None` at the host root.
    pub fn last_segment(&self) -> Option<String> {
        let decoded = self
            .inner
            .path_segments()?
            .filter(|s| !s.is_empty())
            .last()
            .map(|s| percent_decode_str(s).decode_utf8_lossy().to_string())?;
        if self.is_container() {
            Some(format!("{}/", decoded))
        } else {
            Some(decoded)
        }
    }

    /// The apparent file extension of the final segment, if any.
    pub fn extension(&self) -> Option<String> {
        let segment = self.last_segment()?;
        if segment.ends_with('/') {
            return None;
        }
        let (stem, ext) = segment.rsplit_once('.')?;
        if stem.is_empty() || ext.is_empty() {
            return None;
        }
        Some(ext.to_ascii_lowercase())
    }
}

impl fmt::Display for PodUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl AsRef<str> for PodUri {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uri(text: &str) -> PodUri {
        PodUri::parse(text).unwrap()
    }

    #[test]
    fn classifies_by_trailing_separator() {
        assert!(uri("https://alice.example/docs/").is_container());
        assert!(!uri("https://alice.example/docs/readme.txt").is_container());
        // a bare host normalizes to the root container
        assert!(uri("https://alice.example").is_container());
    }

    #[test]
    fn parent_of_item_is_enclosing_container() {
        let item = uri("https://alice.example/docs/readme.txt");
        assert_eq!(item.parent().unwrap(), uri("https://alice.example/docs/"));
    }

    #[test]
    fn parent_of_container_strips_one_segment() {
        let docs = uri("https://alice.example/docs/notes/");
        assert_eq!(docs.parent().unwrap(), uri("https://alice.example/docs/"));
        assert_eq!(
            docs.parent().unwrap().parent().unwrap(),
            uri("https://alice.example/")
        );
    }

    #[test]
    fn parent_of_host_root_fails() {
        let root = uri("https://alice.example/");
        assert!(matches!(root.parent(), Err(UriError::NoParent { .. })));
    }

    #[test]
    fn child_composes_items_and_containers() {
        let docs = uri("https://alice.example/docs/");
        assert_eq!(
            docs.child("readme.txt").unwrap(),
            uri("https://alice.example/docs/readme.txt")
        );
        assert_eq!(
            docs.child("notes/").unwrap(),
            uri("https://alice.example/docs/notes/")
        );
    }

    #[test]
    fn child_percent_encodes_segment() {
        let docs = uri("https://alice.example/docs/");
        let child = docs.child("my notes.txt").unwrap();
        assert_eq!(child.as_str(), "https://alice.example/docs/my%20notes.txt");
        assert_eq!(child.last_segment().unwrap(), "my notes.txt");
    }

    #[test]
    fn child_rejects_dot_and_multi_segment_names() {
        let docs = uri("https://alice.example/docs/");
        assert!(docs.child("").is_err());
        assert!(docs.child(".").is_err());
        assert!(docs.child("..").is_err());
        assert!(docs.child("a/b").is_err());
    }

    #[test]
    fn last_segment_keeps_container_separator() {
        assert_eq!(
            uri("https://alice.example/docs/").last_segment().unwrap(),
            "docs/"
        );
        assert_eq!(
            uri("https://alice.example/docs/readme.txt")
                .last_segment()
                .unwrap(),
            "readme.txt"
        );
        assert_eq!(uri("https://alice.example/").last_segment(), None);
    }

    #[test]
    fn classification_round_trips_through_parent_and_child() {
        for text in [
            "https://alice.example/docs/",
            "https://alice.example/docs/readme.txt",
            "https://alice.example/docs/notes/deep/",
        ] {
            let id = uri(text);
            let rebuilt = id
                .parent()
                .unwrap()
                .child(&id.last_segment().unwrap())
                .unwrap();
            assert_eq!(rebuilt, id);
            assert_eq!(rebuilt.is_container(), id.is_container());
        }
    }

    #[test]
    fn extension_from_final_segment() {
        assert_eq!(
            uri("https://alice.example/a/report.PDF").extension().unwrap(),
            "pdf"
        );
        assert_eq!(uri("https://alice.example/a/Makefile").extension(), None);
        assert_eq!(uri("https://alice.example/a/.hidden").extension(), None);
        assert_eq!(uri("https://alice.example/docs/").extension(), None);
    }
}
