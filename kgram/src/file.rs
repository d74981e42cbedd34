//! The unit of analysis: a file's content plus, once tokenized, its
//! ordered token stream and per-token source mapping.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use getset::{CopyGetters, Getters};
use thiserror::Error;

use crate::ids::{FileId, FileIdAllocator};
use crate::region::Region;

/// An immutable unit of source content, submitted for analysis.
///
/// Cheap to clone (wraps its content in an [`Arc`]); intended to be
/// shared read-only across every [`crate::Pair`] that references it.
#[derive(Debug, Clone, PartialEq, Eq, Getters, CopyGetters)]
pub struct File {
    #[getset(get_copy = "pub")]
    id: FileId,

    #[getset(get = "pub")]
    path: PathBuf,

    content: Arc<[u8]>,

    /// Byte offsets of each line, split on `\n` (kept for diagnostics and
    /// fragment pretty-printing; the core algorithm operates on token
    /// indices and [`Region`]s, not line numbers).
    lines: Arc<[std::ops::Range<usize>]>,

    #[getset(get = "pub")]
    metadata: BTreeMap<String, String>,
}

impl File {
    /// Register a new file with the given allocator, which assigns its
    /// [`FileId`]. Two files from different allocators must never be
    /// compared against the same [`crate::FingerprintIndex`].
    pub fn new(
        ids: &FileIdAllocator,
        path: impl Into<PathBuf>,
        content: impl Into<Vec<u8>>,
        metadata: BTreeMap<String, String>,
    ) -> Self {
        let content: Arc<[u8]> = content.into().into();
        let lines = split_lines(&content).into();
        Self {
            id: ids.next(),
            path: path.into(),
            content,
            lines,
            metadata,
        }
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    pub fn content_str(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.content)
    }

    /// Number of lines in the file (at least `1`, even for empty content).
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// The text of line `row` (0-indexed), excluding its trailing `\n`.
    pub fn line_text(&self, row: usize) -> Option<&str> {
        let range = self.lines.get(row)?;
        std::str::from_utf8(&self.content[range.clone()]).ok()
    }

    /// The file extension, lowercased, used to select a [`crate::tokenizer::Language`].
    pub fn extension(&self) -> Option<String> {
        extension_of(&self.path)
    }
}

fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
}

fn split_lines(content: &[u8]) -> Vec<std::ops::Range<usize>> {
    let mut lines = Vec::new();
    let mut start = 0;
    for (idx, byte) in content.iter().enumerate() {
        if *byte == b'\n' {
            lines.push(start..idx);
            start = idx + 1;
        }
    }
    lines.push(start..content.len());
    lines
}

/// Raised when a [`TokenizedFile`] would be constructed with mismatched
/// token/mapping lengths. See `spec.md` §8, "Mapping parity".
#[derive(Debug, Error)]
#[error("tokenized file invariant violated: {token_count} tokens but {mapping_count} mapped regions")]
pub struct MappingParityError {
    token_count: usize,
    mapping_count: usize,
}

/// A [`File`] together with the ordered token stream produced by a
/// [`crate::tokenizer::Tokenizer`], and the source [`Region`] each token
/// maps back to.
///
/// Invariant: `tokens.len() == mapping.len()`. A file whose token count
/// is less than the index's `k` produces no fingerprints, but is still a
/// valid, registerable [`TokenizedFile`].
#[derive(Debug, Clone, Getters)]
pub struct TokenizedFile {
    #[getset(get = "pub")]
    file: Arc<File>,

    tokens: Vec<String>,
    mapping: Vec<Region>,
}

impl TokenizedFile {
    /// Construct a tokenized file, checking the mapping-parity invariant.
    pub fn new(
        file: impl Into<Arc<File>>,
        tokens: Vec<String>,
        mapping: Vec<Region>,
    ) -> Result<Self, MappingParityError> {
        if tokens.len() != mapping.len() {
            return Err(MappingParityError {
                token_count: tokens.len(),
                mapping_count: mapping.len(),
            });
        }
        Ok(Self {
            file: file.into(),
            tokens,
            mapping,
        })
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn mapping(&self) -> &[Region] {
        &self.mapping
    }

    pub fn id(&self) -> FileId {
        self.file.id()
    }

    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    /// The source [`Region`] spanned by the k-gram `tokens[start..start + k]`,
    /// i.e. the merge of `mapping[start..start + k]`.
    ///
    /// Panics if `start + k > token_count()`; callers are expected to
    /// only request in-range k-grams (see [`Self::kgram_ranges`]).
    pub fn kgram_region(&self, start: usize, k: usize) -> Region {
        let slice = &self.mapping[start..start + k];
        slice[1..]
            .iter()
            .fold(slice[0], |acc, region| acc.merge(region))
    }

    /// The source [`Region`] for every k-gram in the file, in order.
    /// Empty if `token_count() < k`.
    pub fn kgram_regions(&self, k: usize) -> Vec<Region> {
        if k == 0 || self.tokens.len() < k {
            return Vec::new();
        }
        (0..=self.tokens.len() - k)
            .map(|start| self.kgram_region(start, k))
            .collect()
    }

    /// Number of k-gram positions in this file: `max(0, token_count - k + 1)`.
    pub fn kgram_count(&self, k: usize) -> usize {
        if k == 0 || self.tokens.len() < k {
            0
        } else {
            self.tokens.len() - k + 1
        }
    }
}
