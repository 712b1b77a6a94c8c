//! FUSE-based virtual filesystem over a Solid pod.
//!
//! This crate mounts a remote pod (a tree of containers and items addressed
//! by URIs) as a local filesystem. Applications perform ordinary file
//! operations against mounted paths; podfs translates these into remote
//! reads and writes and back-translates the remote hierarchy into
//! filesystem attributes.
//!
//! # Architecture
//!
//! ```text
//! Layer 3: FUSE handlers (fuser::Filesystem impl on PodFs)
//! Layer 2: PodSession (cache + registry orchestration, remote fetches)
//! Layer 1: Primitives (InodeRegistry, InfoCache, PodClient)
//! ```
//!
//! All session state - the three identity caches and the inode registry -
//! is owned by one `PodSession` constructed at mount time and dropped at
//! unmount; there are no process-wide globals.

pub mod cache;
pub mod error;
pub mod fuse;
pub mod inode;
pub mod options;
pub mod session;

pub use cache::InfoCache;
pub use error::VfsError;
pub use fuse::PodFs;
pub use inode::{InodeRegistry, ROOT_INODE};
pub use options::{PrimingStrategy, VfsOptions};
pub use session::{Metadata, PodSession, ResourceRef};
