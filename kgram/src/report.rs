//! Thin, read-only view over a built [`FingerprintIndex`]: summaries and
//! filtered/sorted pair listings for presentation layers.

use getset::Getters;
use typed_builder::TypedBuilder;

use crate::index::{FingerprintIndex, SortKey};
use crate::pair::Pair;
use crate::tokenizer::Language;

/// Options controlling what a [`Report`] surfaces. Distinct from
/// [`crate::index::IndexOptions`]: these govern presentation
/// (thresholds, fragment filtering), not fingerprinting.
#[derive(Debug, Clone, Copy, TypedBuilder)]
pub struct ReportOptions {
    /// Minimum similarity for a pair to count as "suspicious" in
    /// [`Report::summary`]. Default `0.5`.
    #[builder(default = 0.5)]
    pub suspicious_threshold: f64,

    /// Passed through to [`Pair::build_fragments`].
    #[builder(default = 1)]
    pub min_fragment_length: usize,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Aggregate statistics over every non-ignored pair in the index.
#[derive(Debug, Clone, Getters)]
#[getset(get = "pub")]
pub struct Summary {
    total_files: usize,
    total_pairs: usize,
    suspicious_pairs: usize,
    average_similarity: f64,
    max_similarity: f64,
    language: Option<Language>,
    warnings: Vec<String>,
}

/// A read-only report over a built index: a named, optionally
/// language-tagged view with accumulated tokenizer warnings.
pub struct Report<'idx> {
    index: &'idx FingerprintIndex,
    options: ReportOptions,
    language: Option<Language>,
    name: Option<String>,
    warnings: Vec<String>,
}

impl<'idx> Report<'idx> {
    pub fn new(
        index: &'idx FingerprintIndex,
        options: ReportOptions,
        language: Option<Language>,
        name: Option<String>,
        warnings: Vec<String>,
    ) -> Self {
        Self {
            index,
            options,
            language,
            name,
            warnings,
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn language(&self) -> Option<Language> {
        self.language
    }

    /// All non-ignored pairs sharing at least one fingerprint, sorted
    /// by similarity descending.
    pub fn pairs(&self) -> Vec<Pair<'idx>> {
        self.index.all_pairs(SortKey::Similarity)
    }

    /// The `n` highest-similarity pairs.
    pub fn top_pairs(&self, n: usize) -> Vec<Pair<'idx>> {
        self.pairs().into_iter().take(n).collect()
    }

    /// Pairs at or above `threshold` similarity.
    pub fn suspicious_pairs(&self, threshold: f64) -> Vec<Pair<'idx>> {
        self.pairs()
            .into_iter()
            .filter(|p| p.similarity() >= threshold)
            .collect()
    }

    /// Assembled fragments for every non-ignored pair, filtered by
    /// `options.min_fragment_length`.
    pub fn fragments(&self) -> Vec<(Pair<'idx>, Vec<crate::fragment::Fragment>)> {
        self.pairs()
            .into_iter()
            .map(|pair| {
                let fragments = pair.build_fragments(self.options.min_fragment_length);
                (pair, fragments)
            })
            .collect()
    }

    pub fn summary(&self) -> Summary {
        let pairs = self.pairs();
        let total_pairs = pairs.len();
        let suspicious_pairs = pairs
            .iter()
            .filter(|p| p.similarity() >= self.options.suspicious_threshold)
            .count();

        let (sum, max) = pairs
            .iter()
            .map(|p| p.similarity())
            .fold((0.0, 0.0_f64), |(sum, max), sim| (sum + sim, max.max(sim)));

        let average_similarity = if total_pairs == 0 {
            0.0
        } else {
            sum / total_pairs as f64
        };

        Summary {
            total_files: self.index.non_ignored_file_ids().count(),
            total_pairs,
            suspicious_pairs,
            average_similarity,
            max_similarity: max,
            language: self.language,
            warnings: self.warnings.clone(),
        }
    }
}
