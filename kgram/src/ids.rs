//! Small numeric handles used throughout the engine, plus the per-run
//! allocator for [`FileId`].
//!
//! [Design note]: ids are scoped to a single analysis run rather than to
//! the process, so that parallel test runs (and parallel analyses within
//! one process) never observe id collisions or ordering dependent on
//! unrelated work elsewhere in the process.

use std::cell::Cell;

use derive_more::{Display, From};

/// Stable identifier for a [`crate::File`] within one analysis run.
///
/// Monotonically increasing within a given [`FileIdAllocator`]; never
/// reused, and never compared across two different allocators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, From)]
pub struct FileId(u32);

/// The hash of one k-gram, as selected by the [`crate::winnow`] filter.
///
/// This is a filter, not an identity: two different k-grams may
/// (rarely) share a hash. Downstream consumers must not treat hash
/// equality as a proof of token equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, From)]
pub struct Hash(u64);

impl Hash {
    /// The raw 64-bit value backing this hash.
    pub fn value(self) -> u64 {
        self.0
    }
}

/// Index of a k-gram within one file's token stream: the k-gram spans
/// `tokens[index..index + k]`.
pub type KgramIndex = usize;

/// Mints [`FileId`]s for one analysis run.
///
/// Construct one allocator per [`crate::FingerprintIndex`] (or, for
/// standalone tokenization ahead of indexing, one per batch of files
/// headed for the same index) and thread it through [`crate::File::new`].
#[derive(Debug, Default)]
pub struct FileIdAllocator {
    next: Cell<u32>,
}

impl FileIdAllocator {
    /// Create a fresh allocator, starting at id `0`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint the next [`FileId`] in sequence.
    pub fn next(&self) -> FileId {
        let id = self.next.get();
        self.next.set(id + 1);
        FileId(id)
    }
}
