//! The inverted fingerprint index: the sole owner of every
//! [`SharedFingerprint`], keyed by [`Hash`]. Files only ever reference
//! fingerprints by key (`BTreeSet<Hash>`), never by pointer — this is
//! what keeps the index/file/fingerprint/pair graph acyclic (see
//! `kgram`'s design notes on ownership).

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use fallible_iterator::FallibleIterator;
use itertools::Itertools;
use tracing::instrument;
use typed_builder::TypedBuilder;

use crate::file::TokenizedFile;
use crate::ids::{FileId, Hash, KgramIndex};
use crate::pair::Pair;
use crate::region::Region;
use crate::winnow::winnow;

/// Parameters governing k-gram extraction and fingerprint selection.
/// Defaults match `spec.md` §4.3.
#[derive(Debug, Clone, Copy, TypedBuilder)]
pub struct IndexOptions {
    #[builder(default = 23)]
    pub k: usize,

    #[builder(default = 15)]
    pub w: usize,

    /// Retain each selected k-gram's token slice on its `SharedFingerprint`.
    #[builder(default = false)]
    pub kgram_data: bool,

    /// A fingerprint observed in more than this many files is globally
    /// ignored as boilerplate. `None` disables the cutoff.
    #[builder(default)]
    pub max_fingerprint_file_count: Option<u32>,
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// One occurrence of a fingerprint inside a single file: the k-gram
/// index range it spans, plus the source [`Region`] it covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occurrence {
    pub file: FileId,
    pub kgram_start: KgramIndex,
    pub kgram_end: KgramIndex,
    pub region: Region,
    pub tokens: Option<Vec<String>>,
}

/// A fingerprint observed in one or more files, with the occurrences
/// that produced it and its current ignore status.
#[derive(Debug, Clone)]
pub struct SharedFingerprint {
    hash: Hash,
    occurrences: Vec<Occurrence>,
    ignored: bool,
}

impl SharedFingerprint {
    pub fn hash(&self) -> Hash {
        self.hash
    }

    pub fn occurrences(&self) -> &[Occurrence] {
        &self.occurrences
    }

    pub fn occurrences_in(&self, file: FileId) -> impl Iterator<Item = &Occurrence> {
        self.occurrences.iter().filter(move |o| o.file == file)
    }

    pub fn file_count(&self) -> usize {
        self.occurrences.iter().map(|o| o.file).unique().count()
    }

    pub fn is_ignored(&self) -> bool {
        self.ignored
    }
}

/// Per-file bookkeeping: which fingerprint hashes this file contributed,
/// split into the `shared` (active) and `ignored` buckets.
#[derive(Debug, Clone, Default)]
pub struct FileEntry {
    file: Option<Arc<TokenizedFile>>,
    /// Every hash this file ever selected, regardless of that
    /// fingerprint's current ignore status. `shared`/`ignored` are
    /// always a full partition of this set, rebuilt from scratch by
    /// `reevaluate_ignores` — this is what lets a file added after a
    /// fingerprint was already ignored (by an earlier, separate call)
    /// land in the right bucket instead of defaulting to `shared`.
    all_hashes: BTreeSet<Hash>,
    shared: BTreeSet<Hash>,
    ignored: BTreeSet<Hash>,
    kgram_ranges: Vec<Region>,
}

impl FileEntry {
    pub fn file(&self) -> Option<&Arc<TokenizedFile>> {
        self.file.as_ref()
    }

    /// Non-ignored fingerprint hashes contributed by this file. This is
    /// the `nonIgnored(file)` set used as the similarity denominator.
    pub fn shared(&self) -> &BTreeSet<Hash> {
        &self.shared
    }

    pub fn ignored(&self) -> &BTreeSet<Hash> {
        &self.ignored
    }

    pub fn kgram_region(&self, index: KgramIndex) -> Option<&Region> {
        self.kgram_ranges.get(index)
    }

    pub fn total_kgrams(&self) -> usize {
        self.kgram_ranges.len()
    }

    /// Whether this file ever selected at least one fingerprint, ignored
    /// or not. Used to decide whether a file counts as a real submission
    /// for `spec.md` §7's `InsufficientFiles` gate.
    pub fn has_fingerprints(&self) -> bool {
        !self.all_hashes.is_empty()
    }
}

/// The inverted map from fingerprint hash to [`SharedFingerprint`], plus
/// the per-file membership sets and the ignore model.
///
/// See `spec.md` §4.3: `addFiles`, `addIgnoredFile`,
/// `addIgnoredHashes`, and ignore re-evaluation after every mutation.
#[derive(Debug)]
pub struct FingerprintIndex {
    options: IndexOptions,
    files: HashMap<FileId, FileEntry>,
    ignored_files: HashSet<FileId>,
    index: HashMap<Hash, SharedFingerprint>,
    ignored_hashes: HashSet<Hash>,
}

impl FingerprintIndex {
    pub fn new(options: IndexOptions) -> Self {
        Self {
            options,
            files: HashMap::new(),
            ignored_files: HashSet::new(),
            index: HashMap::new(),
            ignored_hashes: HashSet::new(),
        }
    }

    pub fn options(&self) -> &IndexOptions {
        &self.options
    }

    pub fn file_entry(&self, id: FileId) -> Option<&FileEntry> {
        self.files.get(&id)
    }

    pub fn fingerprint(&self, hash: Hash) -> Option<&SharedFingerprint> {
        self.index.get(&hash)
    }

    /// Ids of every registered file, including files added via
    /// [`Self::add_ignored_file`].
    pub fn file_ids(&self) -> impl Iterator<Item = FileId> + '_ {
        self.files.keys().copied()
    }

    /// Ids of non-ignored files that selected at least one fingerprint —
    /// the population `spec.md` §7's `InsufficientFiles` gate and
    /// `Report::summary`'s `total_files` count over. An explicitly
    /// ignored (boilerplate) file is not a "submission" in that sense.
    pub fn non_ignored_file_ids(&self) -> impl Iterator<Item = FileId> + '_ {
        let ignored_files = &self.ignored_files;
        self.files.iter().filter_map(move |(id, entry)| {
            (!ignored_files.contains(id) && entry.has_fingerprints()).then_some(*id)
        })
    }

    /// Add a batch of tokenized, non-boilerplate files to the index.
    ///
    /// Fails fast with [`crate::Error::EngineInvariant`] if any file's id
    /// was already registered in this index (by an earlier `add_files`
    /// or `add_ignored_file` call) — `spec.md` §8 treats re-adding a file
    /// as a contract violation, not a silent overwrite.
    #[instrument(skip(self, files))]
    pub fn add_files(&mut self, files: Vec<Arc<TokenizedFile>>) -> Result<(), crate::Error> {
        for file in files {
            self.add_one(file)?;
        }
        self.reevaluate_ignores();
        Ok(())
    }

    /// Add a single file whose fingerprints are always treated as
    /// boilerplate: every `SharedFingerprint` they touch becomes
    /// permanently ignored, and the file is tracked separately so its
    /// occurrences never appear in a non-ignored `FileEntry`.
    ///
    /// Same duplicate-id fail-fast contract as [`Self::add_files`].
    #[instrument(skip(self, file))]
    pub fn add_ignored_file(&mut self, file: Arc<TokenizedFile>) -> Result<(), crate::Error> {
        let id = file.id();
        self.add_one(file)?;
        self.ignored_files.insert(id);
        self.reevaluate_ignores();
        Ok(())
    }

    /// Union `hashes` into the manual ignore set. One-way: hashes are
    /// never un-ignored by this call.
    pub fn add_ignored_hashes(&mut self, hashes: impl IntoIterator<Item = Hash>) {
        self.ignored_hashes.extend(hashes);
        self.reevaluate_ignores();
    }

    /// Change (raise or lower) the boilerplate file-count cutoff and
    /// re-run ignore evaluation.
    pub fn update_max_fingerprint_file_count(&mut self, max: Option<u32>) {
        self.options.max_fingerprint_file_count = max;
        self.reevaluate_ignores();
    }

    fn add_one(&mut self, file: Arc<TokenizedFile>) -> Result<(), crate::Error> {
        let id = file.id();
        if self.files.contains_key(&id) || self.ignored_files.contains(&id) {
            return Err(crate::Error::EngineInvariant(format!(
                "file {id} was already added to this index"
            )));
        }

        let k = self.options.k;
        let kgram_ranges = file.kgram_regions(k);

        let mut entry = FileEntry {
            file: Some(Arc::clone(&file)),
            all_hashes: BTreeSet::new(),
            shared: BTreeSet::new(),
            ignored: BTreeSet::new(),
            kgram_ranges: kgram_ranges.clone(),
        };

        let mut selections = winnow(file.tokens(), k, self.options.w, self.options.kgram_data);
        while let Some(selection) = selections.next().expect("winnowing is infallible") {
            let region = kgram_ranges[selection.kgram_index];

            let occurrence = Occurrence {
                file: id,
                kgram_start: selection.kgram_index,
                kgram_end: selection.kgram_index + k,
                region,
                tokens: selection.tokens,
            };

            let fingerprint = self.index.entry(selection.hash).or_insert_with(|| SharedFingerprint {
                hash: selection.hash,
                occurrences: Vec::new(),
                ignored: false,
            });
            fingerprint.occurrences.push(occurrence);
            entry.all_hashes.insert(selection.hash);
        }

        self.files.insert(id, entry);
        Ok(())
    }

    /// Re-derive `ignored` for every `SharedFingerprint` from scratch,
    /// then fully repartition every `FileEntry`'s `all_hashes` into
    /// `shared`/`ignored` against that freshly-derived status. Runs after
    /// every mutating call, per `spec.md` §4.3.
    ///
    /// This re-syncs rather than diffs transitions: a hash already
    /// ignored before a file arrives (e.g. an `add_ignored_file` call, or
    /// a boilerplate threshold trip, from an earlier separate call) would
    /// never register as a "transition" for that file's entry, and a
    /// diff-based pass would leave it stuck in `shared`. Rebuilding both
    /// buckets from `all_hashes` against the current `ignored` flag every
    /// time makes that ordering irrelevant.
    fn reevaluate_ignores(&mut self) {
        let max_file_count = self.options.max_fingerprint_file_count;
        let ignored_files = &self.ignored_files;
        let ignored_hashes = &self.ignored_hashes;

        for fingerprint in self.index.values_mut() {
            let from_ignored_file = fingerprint
                .occurrences
                .iter()
                .any(|o| ignored_files.contains(&o.file));
            let from_manual_hash = ignored_hashes.contains(&fingerprint.hash);
            let from_boilerplate = max_file_count
                .map(|max| fingerprint.file_count() as u32 > max)
                .unwrap_or(false);

            fingerprint.ignored = from_ignored_file || from_manual_hash || from_boilerplate;
        }

        let index = &self.index;
        for entry in self.files.values_mut() {
            entry.shared.clear();
            entry.ignored.clear();
            for &hash in &entry.all_hashes {
                let fingerprint = index.get(&hash).expect("all_hashes only contains indexed hashes");
                if fingerprint.ignored {
                    entry.ignored.insert(hash);
                } else {
                    entry.shared.insert(hash);
                }
            }
        }
    }

    /// Construct a lazily-computed [`Pair`] view over two files' entries.
    pub fn get_pair(&self, left: FileId, right: FileId) -> Option<Pair<'_>> {
        if !self.files.contains_key(&left) || !self.files.contains_key(&right) {
            return None;
        }
        Some(Pair::new(self, left, right))
    }

    /// All unordered pairs of non-ignored files sharing at least one
    /// non-ignored fingerprint, sorted by the given key (descending),
    /// breaking ties by `(leftFileId, rightFileId)` ascending.
    pub fn all_pairs(&self, sort_by: SortKey) -> Vec<Pair<'_>> {
        let ids: Vec<FileId> = self
            .files
            .keys()
            .copied()
            .filter(|id| !self.ignored_files.contains(id))
            .sorted()
            .collect();

        let mut pairs = Vec::new();
        for (i, &left) in ids.iter().enumerate() {
            for &right in &ids[i + 1..] {
                let left_entry = &self.files[&left];
                let right_entry = &self.files[&right];
                if left_entry.shared.is_disjoint(&right_entry.shared) {
                    continue;
                }
                pairs.push(Pair::new(self, left, right));
            }
        }

        pairs.sort_by(|a, b| {
            let key_cmp = match sort_by {
                SortKey::Similarity => b.similarity().partial_cmp(&a.similarity()),
                SortKey::Overlap => Some(b.overlap().cmp(&a.overlap())),
                SortKey::Longest => Some(b.longest().cmp(&a.longest())),
            }
            .unwrap_or(std::cmp::Ordering::Equal);

            key_cmp.then_with(|| (a.left_id(), a.right_id()).cmp(&(b.left_id(), b.right_id())))
        });

        pairs
    }
}

/// Sort key for [`FingerprintIndex::all_pairs`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Similarity,
    Overlap,
    Longest,
}
