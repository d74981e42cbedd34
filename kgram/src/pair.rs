//! A lazily-computed, non-owning view over two files' entries in a
//! [`FingerprintIndex`].
//!
//! `Pair` borrows the index rather than holding any fingerprint data of
//! its own: every metric is derived on demand from `left.shared ∩
//! right.shared`, which is what keeps this type from ever needing
//! `Rc`/`RefCell` back-references into the index it reads.

use itertools::Itertools;

use crate::fragment::{assemble_fragments, Fragment, PairedOccurrence};
use crate::ids::FileId;
use crate::index::FingerprintIndex;

/// See the module docs: borrows its index, computes everything lazily.
#[derive(Debug, Clone, Copy)]
pub struct Pair<'idx> {
    index: &'idx FingerprintIndex,
    left: FileId,
    right: FileId,
}

impl<'idx> Pair<'idx> {
    pub(crate) fn new(index: &'idx FingerprintIndex, left: FileId, right: FileId) -> Self {
        Self { index, left, right }
    }

    pub fn left_id(&self) -> FileId {
        self.left
    }

    pub fn right_id(&self) -> FileId {
        self.right
    }

    fn left_entry(&self) -> &crate::index::FileEntry {
        self.index.file_entry(self.left).expect("pair holds a valid left file")
    }

    fn right_entry(&self) -> &crate::index::FileEntry {
        self.index
            .file_entry(self.right)
            .expect("pair holds a valid right file")
    }

    /// Non-ignored fingerprints shared by both files.
    fn shared_both(&self) -> impl Iterator<Item = crate::ids::Hash> + '_ {
        let left = self.left_entry();
        let right = self.right_entry();
        left.shared()
            .intersection(right.shared())
            .copied()
            .collect::<Vec<_>>()
            .into_iter()
    }

    /// `overlap`: number of shared non-ignored fingerprints.
    pub fn overlap(&self) -> usize {
        self.shared_both().count()
    }

    /// `similarity = |shared_both| / min(|nonIgnored(left)|, |nonIgnored(right)|)`.
    /// The smaller file is always the denominator, so a large file
    /// cannot dilute a small one's score.
    pub fn similarity(&self) -> f64 {
        let denominator = self
            .left_entry()
            .shared()
            .len()
            .min(self.right_entry().shared().len());
        if denominator == 0 {
            return 0.0;
        }
        self.overlap() as f64 / denominator as f64
    }

    /// Build the sorted `(leftKgramIdx, rightKgramIdx)` stream of
    /// [`PairedOccurrence`]s, then assemble it into [`Fragment`]s.
    pub fn build_fragments(&self, min_fragment_length: usize) -> Vec<Fragment> {
        let mut stream: Vec<PairedOccurrence> = self
            .shared_both()
            .flat_map(|hash| {
                let fingerprint = self.index.fingerprint(hash).expect("hash came from the index");
                let left_occurrences: Vec<_> = fingerprint.occurrences_in(self.left).collect();
                let right_occurrences: Vec<_> = fingerprint.occurrences_in(self.right).collect();
                left_occurrences
                    .into_iter()
                    .cartesian_product(right_occurrences)
                    .map(move |(l, r)| PairedOccurrence::new(hash, l, r))
                    .collect::<Vec<_>>()
            })
            .collect();

        stream.sort_by_key(|p| (p.left_kgram_start, p.right_kgram_start));

        assemble_fragments(self.left, self.right, stream, min_fragment_length)
    }

    /// Length, in k-grams, of the longest fragment between these files.
    pub fn longest(&self) -> usize {
        self.build_fragments(1).iter().map(|f| f.len()).max().unwrap_or(0)
    }

    /// Count of distinct k-gram positions in the left file covered by
    /// any fragment.
    pub fn left_covered(&self) -> usize {
        self.build_fragments(1)
            .iter()
            .flat_map(|f| f.left_kgrams().from()..f.left_kgrams().to())
            .unique()
            .count()
    }

    /// Count of distinct k-gram positions in the right file covered by
    /// any fragment.
    pub fn right_covered(&self) -> usize {
        self.build_fragments(1)
            .iter()
            .flat_map(|f| f.right_kgrams().from()..f.right_kgrams().to())
            .unique()
            .count()
    }

    pub fn left_total(&self) -> usize {
        self.left_entry().total_kgrams()
    }

    pub fn right_total(&self) -> usize {
        self.right_entry().total_kgrams()
    }
}
