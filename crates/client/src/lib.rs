//! Solid protocol client for podfs.
//!
//! This crate provides the remote side of podfs: listing a container's
//! children, fetching an item's content, and replacing an item's content.
//! The `PodClient` trait is the seam the VFS is written against; the
//! `HttpPodClient` implementation talks to a real pod over HTTP.
//!
//! Containment documents are requested as `text/turtle` and only the
//! `ldp:contains` triples are extracted; everything else in the document is
//! ignored.

mod error;
mod http;
mod media;
mod parse;
mod traits;
mod types;

pub use error::ClientError;
pub use http::HttpPodClient;
pub use media::media_type_for;
pub use parse::parse_containment;
pub use traits::PodClient;
pub use types::{FolderEntry, FolderListing};
