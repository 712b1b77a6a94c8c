//! Configuration options for the VFS.

/// Configuration options for a mount session.
///
/// # Example
///
/// ```ignore
/// let options = VfsOptions::default().with_priming(PrimingStrategy::Lazy);
/// let session = PodSession::new(client, root, options).await?;
/// ```
#[derive(Debug, Clone)]
pub struct VfsOptions {
    /// Content priming policy applied when a container listing is fetched.
    pub priming: PrimingStrategy,
    /// How long the kernel may cache attributes and entries, in seconds.
    pub attr_ttl_secs: u64,
}

impl Default for VfsOptions {
    fn default() -> Self {
        Self {
            priming: PrimingStrategy::default(),
            attr_ttl_secs: 1,
        }
    }
}

impl VfsOptions {
    /// Set the content priming policy.
    pub fn with_priming(mut self, priming: PrimingStrategy) -> Self {
        self.priming = priming;
        self
    }

    /// Set the kernel attribute/entry cache TTL.
    pub fn with_attr_ttl_secs(mut self, secs: u64) -> Self {
        self.attr_ttl_secs = secs;
        self
    }
}

/// When item content is fetched relative to its parent's listing fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PrimingStrategy {
    /// Fetching a container's listing also fetches and caches every
    /// sub-item's content (not sub-listings). Trades upfront network round
    /// trips for non-blocking metadata and read calls afterwards.
    #[default]
    Eager,

    /// Item content is fetched on first open/read/write of that item.
    /// Minimizes startup traffic; size queries block on a full fetch.
    Lazy,
}

impl PrimingStrategy {
    /// True iff listing fetches prime sub-item content.
    pub fn is_eager(&self) -> bool {
        matches!(self, Self::Eager)
    }
}
