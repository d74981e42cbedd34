//! Paired occurrences and their assembly into contiguous [`Fragment`]s.

use crate::ids::{FileId, Hash, KgramIndex};
use crate::index::Occurrence;
use crate::region::{Range, Region};

/// A single fingerprint occurring in both files of a pair at once: one
/// occurrence on the left, one on the right.
#[derive(Debug, Clone)]
pub struct PairedOccurrence {
    pub hash: Hash,
    pub left_kgram_start: KgramIndex,
    pub right_kgram_start: KgramIndex,
    pub left_region: Region,
    pub right_region: Region,
}

impl PairedOccurrence {
    pub fn new(hash: Hash, left: &Occurrence, right: &Occurrence) -> Self {
        Self {
            hash,
            left_kgram_start: left.kgram_start,
            right_kgram_start: right.kgram_start,
            left_region: left.region,
            right_region: right.region,
        }
    }
}

/// A maximal run of [`PairedOccurrence`]s forming a contiguous diagonal
/// in (left k-gram index, right k-gram index) space: evidence of a
/// contiguous block of matched structure between two files.
#[derive(Debug, Clone)]
pub struct Fragment {
    left_file: FileId,
    right_file: FileId,
    left_kgrams: Range,
    right_kgrams: Range,
    left_selection: Region,
    right_selection: Region,
    pairs: Vec<PairedOccurrence>,
}

impl Fragment {
    fn start(left_file: FileId, right_file: FileId, occurrence: PairedOccurrence) -> Self {
        let left_kgrams = Range::single(occurrence.left_kgram_start);
        let right_kgrams = Range::single(occurrence.right_kgram_start);
        let left_selection = occurrence.left_region;
        let right_selection = occurrence.right_region;
        Self {
            left_file,
            right_file,
            left_kgrams,
            right_kgrams,
            left_selection,
            right_selection,
            pairs: vec![occurrence],
        }
    }

    /// Whether `occurrence` extends this fragment: its left/right
    /// k-gram starts must exactly continue this fragment's (left, right)
    /// end, i.e. the occurrence lies on the same diagonal one step on.
    fn extends_with(&self, occurrence: &PairedOccurrence) -> bool {
        occurrence.left_kgram_start == self.left_kgrams.to()
            && occurrence.right_kgram_start == self.right_kgrams.to()
    }

    fn extend(&mut self, occurrence: PairedOccurrence) {
        self.left_kgrams = self.left_kgrams.merge(&Range::single(occurrence.left_kgram_start));
        self.right_kgrams = self
            .right_kgrams
            .merge(&Range::single(occurrence.right_kgram_start));
        self.left_selection = self.left_selection.merge(&occurrence.left_region);
        self.right_selection = self.right_selection.merge(&occurrence.right_region);
        self.pairs.push(occurrence);
    }

    /// Whether `other` picks up exactly where `self` leaves off, on both
    /// sides at once. Used by the second assembly pass to stitch
    /// fragments that were interleaved apart by equal-hash occurrences.
    fn touches(&self, other: &Fragment) -> bool {
        self.left_kgrams.touches_start_of(&other.left_kgrams)
            && self.right_kgrams.touches_start_of(&other.right_kgrams)
    }

    fn merge_with(mut self, other: Fragment) -> Fragment {
        self.left_kgrams = self.left_kgrams.merge(&other.left_kgrams);
        self.right_kgrams = self.right_kgrams.merge(&other.right_kgrams);
        self.left_selection = self.left_selection.merge(&other.left_selection);
        self.right_selection = self.right_selection.merge(&other.right_selection);
        self.pairs.extend(other.pairs);
        self
    }

    pub fn left_file(&self) -> FileId {
        self.left_file
    }

    pub fn right_file(&self) -> FileId {
        self.right_file
    }

    pub fn left_kgrams(&self) -> Range {
        self.left_kgrams
    }

    pub fn right_kgrams(&self) -> Range {
        self.right_kgrams
    }

    pub fn left_selection(&self) -> Region {
        self.left_selection
    }

    pub fn right_selection(&self) -> Region {
        self.right_selection
    }

    pub fn pairs(&self) -> &[PairedOccurrence] {
        &self.pairs
    }

    /// Length of the fragment in k-grams: one more than the number of
    /// extensions, since the starting occurrence already counts as one.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Greedily assemble `stream` (already sorted by `(leftKgramIdx,
/// rightKgramIdx)` ascending) into fragments, then run a second pass
/// merging fragments whose endpoints abut, per `spec.md` §4.5.
///
/// `min_fragment_length` filters the final result, not the assembly
/// itself — fragments below the threshold are dropped only after
/// merging, so a short fragment that would have merged into a longer
/// one is never discarded prematurely.
pub fn assemble_fragments(
    left_file: FileId,
    right_file: FileId,
    stream: Vec<PairedOccurrence>,
    min_fragment_length: usize,
) -> Vec<Fragment> {
    let mut fragments: Vec<Fragment> = Vec::new();

    for occurrence in stream {
        let extended = fragments
            .last_mut()
            .map(|f| f.extends_with(&occurrence))
            .unwrap_or(false);

        if extended {
            fragments.last_mut().unwrap().extend(occurrence);
        } else {
            fragments.push(Fragment::start(left_file, right_file, occurrence));
        }
    }

    let merged = merge_touching(fragments);

    merged
        .into_iter()
        .filter(|f| f.len() >= min_fragment_length.max(1))
        .collect()
}

/// Second assembly pass: repeatedly scan for a fragment whose endpoint
/// touches another's start, merging them, until no more merges apply.
fn merge_touching(mut fragments: Vec<Fragment>) -> Vec<Fragment> {
    loop {
        let mut merged_any = false;
        let mut result: Vec<Fragment> = Vec::with_capacity(fragments.len());

        'outer: for fragment in fragments.drain(..) {
            for existing in result.iter_mut() {
                if existing.touches(&fragment) {
                    let combined = std::mem::replace(
                        existing,
                        Fragment::start(
                            fragment.left_file,
                            fragment.right_file,
                            fragment.pairs[0].clone(),
                        ),
                    )
                    .merge_with(fragment);
                    *existing = combined;
                    merged_any = true;
                    continue 'outer;
                }
            }
            result.push(fragment);
        }

        fragments = result;
        if !merged_any {
            return fragments;
        }
    }
}
