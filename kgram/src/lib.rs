//! Structural plagiarism detection over tokenized source.
//!
//! # Aspirations
//!
//! - Determinism over raw throughput
//! - Extensible over feature complete
//! - Reliable over performant
//!
//! # Feature flags
//!
//! Name | Description | Kind
//! ---|---|---
//! `lang-all` | Enables all supported language tokenizers | Language
//! `lang-c` | Enables the C tokenizer | Language
//! `lang-java` | Enables the Java tokenizer | Language
//! `lang-python` | Enables the Python tokenizer | Language
//! `parallel` | Tokenize/winnow files concurrently with rayon | Performance
//!
//! # Pipeline
//!
//! ```text
//! File ─► tokenize_file ─► TokenizedFile ─► winnow ─► FingerprintIndex
//!                                                          │
//!                                                 get_pair/all_pairs
//!                                                          │
//!                                                        Pair ─► Fragment
//! ```

pub mod debugging;
pub mod file;
pub mod fragment;
pub mod ids;
pub mod index;
pub mod pair;
pub mod region;
pub mod report;
pub mod tokenizer;
pub mod winnow;

use std::sync::Arc;

use thiserror::Error;
use tracing::instrument;

pub use fallible_iterator::FallibleIterator;
pub use file::{File, MappingParityError, TokenizedFile};
pub use fragment::{Fragment, PairedOccurrence};
pub use ids::{FileId, FileIdAllocator, Hash, KgramIndex};
pub use index::{FileEntry, FingerprintIndex, IndexOptions, Occurrence, SharedFingerprint, SortKey};
pub use pair::Pair;
pub use region::{InvalidRegion, Range, Region};
pub use report::{Report, ReportOptions, Summary};
pub use tokenizer::{tokenize_file, Language, Tokenizer, TokenizerError, TokenizerOptions};

/// Crate-wide error type. Variant names are the error *kinds*; see
/// `kgram`'s design notes for the recoverable/fatal split.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Parser failure on one file. Recoverable: the caller should record
    /// this in `Report.warnings` and continue without that file.
    #[error("failed to tokenize {path}: {source}")]
    Tokenizer {
        path: String,
        #[source]
        source: TokenizerError,
    },

    /// Fewer than two non-ignored files share a fingerprint; there is
    /// nothing to compare.
    #[error("need at least two non-ignored files with at least one fingerprint to compare, found {found}")]
    InsufficientFiles { found: usize },

    /// No tokenizer is registered (or compiled in) for the requested
    /// language.
    #[error("unsupported language: {0}")]
    UnsupportedLanguage(String),

    /// A [`Region`] was constructed in violation of its ordering
    /// invariant. Always a caller/tokenizer bug.
    #[error(transparent)]
    InvalidRegion(#[from] InvalidRegion),

    /// A [`TokenizedFile`] was constructed with mismatched token and
    /// mapping lengths. Always a caller/tokenizer bug.
    #[error(transparent)]
    MappingParity(#[from] MappingParityError),

    /// Internal inconsistency: a fingerprint references a file the
    /// index has no entry for, or similar. Always a bug in this crate.
    #[error("internal invariant violated: {0}")]
    EngineInvariant(String),
}

/// A file submitted for analysis, paired with the language to tokenize
/// it as. See [`Options::analyze`].
pub struct SourceFile {
    pub file: Arc<File>,
    pub language: Language,
}

impl SourceFile {
    /// Pair a file with an explicitly chosen language, bypassing
    /// extension sniffing entirely. Use this when the caller already
    /// knows the language (e.g. a submission's language is recorded in
    /// its own metadata rather than its file extension).
    pub fn new(file: Arc<File>, language: Language) -> Self {
        Self { file, language }
    }

    /// Resolve the language from `file`'s extension, per `spec.md` §9's
    /// "registry maps file extension → variant". Returns
    /// [`Error::UnsupportedLanguage`] if no tokenizer is registered for
    /// the extension — see `spec.md` §7.
    pub fn detect(file: Arc<File>) -> Result<Self, Error> {
        let language = Language::from_path(file.path()).ok_or_else(|| {
            let ext = file.extension().unwrap_or_default();
            Error::UnsupportedLanguage(ext)
        })?;
        Ok(Self { file, language })
    }
}

/// Top-level options for a full `analyze` run: the union of
/// [`TokenizerOptions`], [`IndexOptions`], and [`ReportOptions`].
#[derive(Debug, Clone, Copy)]
pub struct Options {
    pub tokenizer: TokenizerOptions,
    pub index: IndexOptions,
    pub report: ReportOptions,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            tokenizer: TokenizerOptions::default(),
            index: IndexOptions::default(),
            report: ReportOptions::default(),
        }
    }
}

/// Tokenize every `source`, fold the results into a fresh
/// [`FingerprintIndex`], and return it alongside any per-file
/// [`TokenizerError`] warnings (non-fatal; the offending file is simply
/// excluded).
///
/// Files that fail to tokenize do not abort the run — see `spec.md` §7
/// on the recoverable/fatal error split. Returns [`Error::EngineInvariant`]
/// if two `sources` entries resolve to the same [`crate::FileId`] (a
/// caller bug, not a tokenizer failure — see `spec.md` §8).
#[instrument(skip(sources, options))]
pub fn build_index(
    sources: Vec<SourceFile>,
    options: Options,
) -> Result<(FingerprintIndex, Vec<String>), Error> {
    let mut warnings = Vec::new();
    let mut index = FingerprintIndex::new(options.index);

    let tokenized = tokenize_all(sources, options.tokenizer, &mut warnings);
    index.add_files(tokenized)?;

    Ok((index, warnings))
}

#[cfg(feature = "parallel")]
fn tokenize_all(
    sources: Vec<SourceFile>,
    options: TokenizerOptions,
    warnings: &mut Vec<String>,
) -> Vec<Arc<TokenizedFile>> {
    use rayon::prelude::*;

    let results: Vec<_> = sources
        .into_par_iter()
        .map(|source| {
            let path = source.file.path().display().to_string();
            tokenize_file(source.file, source.language, options)
                .map(Arc::new)
                .map_err(|err| (path, err))
        })
        .collect();

    fold_tokenize_results(results, warnings)
}

#[cfg(not(feature = "parallel"))]
fn tokenize_all(
    sources: Vec<SourceFile>,
    options: TokenizerOptions,
    warnings: &mut Vec<String>,
) -> Vec<Arc<TokenizedFile>> {
    let results: Vec<_> = sources
        .into_iter()
        .map(|source| {
            let path = source.file.path().display().to_string();
            tokenize_file(source.file, source.language, options)
                .map(Arc::new)
                .map_err(|err| (path, err))
        })
        .collect();

    fold_tokenize_results(results, warnings)
}

fn fold_tokenize_results(
    results: Vec<Result<Arc<TokenizedFile>, (String, TokenizerError)>>,
    warnings: &mut Vec<String>,
) -> Vec<Arc<TokenizedFile>> {
    let mut tokenized = Vec::with_capacity(results.len());
    for result in results {
        match result {
            Ok(file) => tokenized.push(file),
            Err((path, err)) => {
                tracing::warn!(path = %path, error = %err, "tokenizer failure; skipping file");
                warnings.push(format!("{path}: {err}"));
            }
        }
    }
    tokenized
}

/// Convenience bundle: build the index then wrap it in a [`Report`].
/// Returns [`Error::InsufficientFiles`] if fewer than two non-ignored
/// files ended up in the index.
pub fn analyze<'idx>(
    index: &'idx FingerprintIndex,
    language: Option<Language>,
    name: Option<String>,
    warnings: Vec<String>,
    options: ReportOptions,
) -> Result<Report<'idx>, Error> {
    let file_count = index.non_ignored_file_ids().count();
    if file_count < 2 {
        return Err(Error::InsufficientFiles { found: file_count });
    }
    Ok(Report::new(index, options, language, name, warnings))
}
