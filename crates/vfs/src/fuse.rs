//! FUSE operation handlers.
//!
//! `PodFs` implements the bridge's callback contract in terms of
//! `PodSession`. Callbacks are synchronous; remote work runs on a captured
//! tokio runtime handle via `block_on`. Error translation to errno values
//! happens here and nowhere else.

use std::ffi::OsStr;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use fuser::{
    FileAttr, FileType, Filesystem, ReplyAttr, ReplyData, ReplyDirectory, ReplyEmpty, ReplyEntry,
    ReplyOpen, ReplyWrite, Request,
};
use podfs_client::{ClientError, FolderEntry, FolderListing, PodClient};
use tokio::runtime::Handle;

use crate::error::VfsError;
use crate::session::{PodSession, ResourceRef};

/// Fixed synthetic timestamp stamped on every attribute; the remote
/// hierarchy carries no usable times.
const SYNTHETIC_STAMP_NS: u64 = 1_438_467_123_985_654_000;

/// The filesystem face of a mount session.
pub struct PodFs<C: PodClient> {
    session: Arc<PodSession<C>>,
    runtime: Handle,
}

impl<C: PodClient> PodFs<C> {
    /// Wrap a session for mounting.
    ///
    /// # Arguments
    /// * `session` - Session constructed at mount time
    /// * `runtime` - Handle of the runtime that drives remote I/O
    pub fn new(session: Arc<PodSession<C>>, runtime: Handle) -> Self {
        Self { session, runtime }
    }

    fn ttl(&self) -> Duration {
        Duration::from_secs(self.session.options().attr_ttl_secs)
    }

    /// Attributes for a registered inode.
    ///
    /// Containers report size 0; items force a content fetch to report the
    /// exact byte length.
    fn attr_for_inode(&self, inode: u64) -> Result<FileAttr, VfsError> {
        let metadata = self.session.metadata_for(ResourceRef::Inode(inode))?;
        if metadata.uri().is_container() {
            Ok(make_attr(inode, FileType::Directory, 0))
        } else {
            let size: u64 = self
                .runtime
                .block_on(self.session.size_of(ResourceRef::Inode(inode)))?;
            Ok(make_attr(inode, FileType::RegularFile, size))
        }
    }

    fn lookup_inner(&self, parent: u64, name: &str) -> Result<FileAttr, VfsError> {
        if name == "." {
            return self.attr_for_inode(parent);
        }

        let parent_meta = self.session.metadata_for(ResourceRef::Inode(parent))?;
        if name == ".." {
            let grandparent = parent_meta.uri().parent()?;
            let inode: u64 = self.session.inode_for_uri(&grandparent)?;
            return self.attr_for_inode(inode);
        }

        let child = parent_meta.uri().child(name)?;
        let inode: u64 = match self.session.inode_for_uri(&child) {
            Ok(inode) => inode,
            // the child may be a container, whose identifier carries the
            // trailing separator the kernel name lacks
            Err(VfsError::MappingNotFound { .. }) => {
                let as_container = parent_meta.uri().child(&format!("{name}/"))?;
                self.session.inode_for_uri(&as_container)?
            }
            Err(other) => return Err(other),
        };
        self.attr_for_inode(inode)
    }
}

/// Translate a VFS error into the bridge's errno signaling.
fn errno_for(err: &VfsError) -> libc::c_int {
    match err {
        VfsError::CacheMiss { .. }
        | VfsError::LocalInfoNotFound { .. }
        | VfsError::MappingNotFound { .. }
        | VfsError::Uri(_) => libc::ENOENT,
        VfsError::Client(ClientError::NotFound { .. }) => libc::ENOENT,
        VfsError::Client(_) => libc::EIO,
    }
}

/// Build kernel attributes for a resource.
///
/// Times are a fixed synthetic stamp; ownership is the mounting process's
/// own identity. There is no permission model beyond always-allow.
fn make_attr(ino: u64, kind: FileType, size: u64) -> FileAttr {
    let stamp: SystemTime = UNIX_EPOCH + Duration::from_nanos(SYNTHETIC_STAMP_NS);
    let directory: bool = kind == FileType::Directory;
    FileAttr {
        ino,
        size,
        blocks: (size + 511) / 512,
        atime: stamp,
        mtime: stamp,
        ctime: stamp,
        crtime: stamp,
        kind,
        perm: if directory { 0o755 } else { 0o644 },
        nlink: if directory { 2 } else { 1 },
        uid: unsafe { libc::getuid() },
        gid: unsafe { libc::getgid() },
        rdev: 0,
        blksize: 512,
        flags: 0,
    }
}

/// Slice `data` to `[offset, offset + size)`, clipped to the content
/// length. Out-of-range offsets yield an empty slice, never a fault.
fn clip(data: &[u8], offset: i64, size: u32) -> &[u8] {
    let start: usize = (offset.max(0) as usize).min(data.len());
    let end: usize = start.saturating_add(size as usize).min(data.len());
    &data[start..end]
}

/// All children of a listing in reply order: sub-containers first, then
/// sub-items, with a 1-based continuation index spanning both groups.
fn dir_entries(listing: &FolderListing) -> impl Iterator<Item = (usize, FileType, &FolderEntry)> {
    listing
        .folders
        .iter()
        .map(|entry| (FileType::Directory, entry))
        .chain(
            listing
                .files
                .iter()
                .map(|entry| (FileType::RegularFile, entry)),
        )
        .enumerate()
        .map(|(i, (kind, entry))| (i + 1, kind, entry))
}

impl<C: PodClient> Filesystem for PodFs<C> {
    fn getattr(&mut self, _req: &Request, ino: u64, reply: ReplyAttr) {
        tracing::debug!(ino, "getattr");
        match self.attr_for_inode(ino) {
            Ok(attr) => reply.attr(&self.ttl(), &attr),
            Err(e) => {
                tracing::debug!(ino, error = %e, "getattr failed");
                reply.error(errno_for(&e));
            }
        }
    }

    fn lookup(&mut self, _req: &Request, parent: u64, name: &OsStr, reply: ReplyEntry) {
        tracing::debug!(parent, name = ?name, "lookup");
        let Some(name) = name.to_str() else {
            reply.error(libc::ENOENT);
            return;
        };
        match self.lookup_inner(parent, name) {
            Ok(attr) => reply.entry(&self.ttl(), &attr, 0),
            Err(e) => {
                tracing::debug!(parent, name, error = %e, "lookup failed");
                reply.error(errno_for(&e));
            }
        }
    }

    fn opendir(&mut self, _req: &Request, ino: u64, _flags: i32, reply: ReplyOpen) {
        tracing::debug!(ino, "opendir");
        if !self.session.has_inode(ino) {
            reply.error(libc::ENOENT);
            return;
        }
        match self
            .runtime
            .block_on(self.session.prepare(ResourceRef::Inode(ino)))
        {
            Ok(fh) => reply.opened(fh, 0),
            Err(e) => {
                tracing::error!(ino, error = %e, "opendir failed");
                reply.error(errno_for(&e));
            }
        }
    }

    fn readdir(
        &mut self,
        _req: &Request,
        ino: u64,
        fh: u64,
        offset: i64,
        mut reply: ReplyDirectory,
    ) {
        tracing::debug!(ino, fh, offset, "readdir");
        let listing: FolderListing = match self
            .runtime
            .block_on(self.session.listing_for(ResourceRef::Handle(fh)))
        {
            Ok(listing) => listing,
            Err(e) => {
                tracing::error!(fh, error = %e, "readdir failed");
                reply.error(errno_for(&e));
                return;
            }
        };

        for (index, kind, entry) in dir_entries(&listing).skip(offset.max(0) as usize) {
            let child_ino: u64 = self.session.bind(&entry.uri);
            if reply.add(child_ino, index as i64, kind, &entry.name) {
                break;
            }
        }
        reply.ok();
    }

    fn open(&mut self, _req: &Request, ino: u64, _flags: i32, reply: ReplyOpen) {
        // access-mode flags are deliberately ignored; nothing is enforced
        tracing::debug!(ino, "open");
        if !self.session.has_inode(ino) {
            reply.error(libc::ENOENT);
            return;
        }
        match self
            .runtime
            .block_on(self.session.prepare_resource(ResourceRef::Inode(ino)))
        {
            Ok(fh) => reply.opened(fh, 0),
            Err(e) => {
                tracing::error!(ino, error = %e, "open failed");
                reply.error(errno_for(&e));
            }
        }
    }

    fn read(
        &mut self,
        _req: &Request,
        ino: u64,
        fh: u64,
        offset: i64,
        size: u32,
        _flags: i32,
        _lock_owner: Option<u64>,
        reply: ReplyData,
    ) {
        tracing::debug!(ino, fh, offset, size, "read");
        match self
            .runtime
            .block_on(self.session.content_for(ResourceRef::Handle(fh)))
        {
            Ok(data) => reply.data(clip(&data, offset, size)),
            Err(e) => {
                tracing::error!(fh, error = %e, "read failed");
                reply.error(errno_for(&e));
            }
        }
    }

    fn write(
        &mut self,
        _req: &Request,
        ino: u64,
        fh: u64,
        offset: i64,
        data: &[u8],
        _write_flags: u32,
        _flags: i32,
        _lock_owner: Option<u64>,
        reply: ReplyWrite,
    ) {
        tracing::debug!(ino, fh, offset, bytes = data.len(), "write");
        match self.runtime.block_on(self.session.write_at(
            ResourceRef::Handle(fh),
            offset.max(0) as u64,
            data,
        )) {
            Ok(written) => reply.written(written as u32),
            Err(e) => {
                tracing::error!(fh, error = %e, "write failed");
                reply.error(errno_for(&e));
            }
        }
    }

    fn access(&mut self, _req: &Request, ino: u64, _mask: i32, reply: ReplyEmpty) {
        tracing::debug!(ino, "access");
        reply.ok();
    }

    fn flush(&mut self, _req: &Request, _ino: u64, _fh: u64, _lock_owner: u64, reply: ReplyEmpty) {
        reply.ok();
    }

    fn release(
        &mut self,
        _req: &Request,
        _ino: u64,
        _fh: u64,
        _flags: i32,
        _lock_owner: Option<u64>,
        _flush: bool,
        reply: ReplyEmpty,
    ) {
        reply.ok();
    }

    fn releasedir(&mut self, _req: &Request, _ino: u64, _fh: u64, _flags: i32, reply: ReplyEmpty) {
        reply.ok();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use podfs_common::PodUri;

    fn entry(uri: &str) -> FolderEntry {
        let uri = PodUri::parse(uri).unwrap();
        FolderEntry {
            name: uri.last_segment().unwrap().trim_end_matches('/').to_string(),
            uri,
        }
    }

    fn listing() -> FolderListing {
        FolderListing {
            uri: PodUri::parse("https://alice.example/").unwrap(),
            folders: vec![entry("https://alice.example/docs/")],
            files: vec![entry("https://alice.example/readme.txt")],
        }
    }

    #[test]
    fn reply_order_is_containers_then_items_with_contiguous_indices() {
        let listing = listing();
        let collected: Vec<(usize, FileType, &str)> = dir_entries(&listing)
            .map(|(i, kind, e)| (i, kind, e.name.as_str()))
            .collect();
        assert_eq!(
            collected,
            vec![
                (1, FileType::Directory, "docs"),
                (2, FileType::RegularFile, "readme.txt"),
            ]
        );
    }

    #[test]
    fn continuation_skips_already_delivered_entries() {
        let listing = listing();
        let rest: Vec<&str> = dir_entries(&listing)
            .skip(1)
            .map(|(_, _, e)| e.name.as_str())
            .collect();
        assert_eq!(rest, vec!["readme.txt"]);
        assert_eq!(dir_entries(&listing).skip(2).count(), 0);
    }

    #[test]
    fn attrs_distinguish_containers_from_items() {
        let dir: FileAttr = make_attr(1, FileType::Directory, 0);
        assert_eq!(dir.perm, 0o755);
        assert_eq!(dir.nlink, 2);
        assert_eq!(dir.size, 0);

        let file: FileAttr = make_attr(7, FileType::RegularFile, 1025);
        assert_eq!(file.perm, 0o644);
        assert_eq!(file.nlink, 1);
        assert_eq!(file.blocks, 3);
        assert_eq!(file.mtime, file.atime);
    }

    #[test]
    fn reads_clip_to_content_length() {
        let data: &[u8] = b"0123456789";
        assert_eq!(clip(data, 0, 4), b"0123");
        assert_eq!(clip(data, 8, 10), b"89");
        assert_eq!(clip(data, 10, 4), b"");
        assert_eq!(clip(data, 25, 4), b"");
        assert_eq!(clip(data, -3, 4), b"0123");
    }

    #[test]
    fn errno_translation_at_the_boundary() {
        assert_eq!(
            errno_for(&VfsError::LocalInfoNotFound {
                uri: "u".to_string()
            }),
            libc::ENOENT
        );
        assert_eq!(
            errno_for(&VfsError::MappingNotFound {
                reference: "u".to_string()
            }),
            libc::ENOENT
        );
        assert_eq!(
            errno_for(&VfsError::Client(ClientError::NotFound {
                uri: "u".to_string()
            })),
            libc::ENOENT
        );
        assert_eq!(
            errno_for(&VfsError::Client(ClientError::Network {
                uri: "u".to_string(),
                message: "down".to_string()
            })),
            libc::EIO
        );
    }
}
