//! `spec.md` §8 scenario S5: building the index with files added in a
//! different order must not change the summary or the pairwise
//! similarity/overlap/longest metrics — only the arbitrary `FileId`
//! values may differ, never what they mean once mapped back to a path.

use std::collections::BTreeMap;
use std::sync::Arc;

use kgram::{
    tokenize_file, File, FileIdAllocator, FingerprintIndex, IndexOptions, Language, Report,
    ReportOptions, SortKey, TokenizerOptions,
};

use crate::include_str_lf;

fn tokenize(ids: &FileIdAllocator, path: &str, content: &str) -> Arc<kgram::TokenizedFile> {
    let file = Arc::new(File::new(ids, path, content.as_bytes(), BTreeMap::new()));
    Arc::new(tokenize_file(file, Language::C, TokenizerOptions::default()).unwrap())
}

/// The metrics of one pair, keyed by the *paths* of its two files rather
/// than their (allocator-order-dependent) ids, so two builds with
/// different insertion orders can be compared directly.
#[derive(Debug, PartialEq)]
struct PairByPath {
    left_path: String,
    right_path: String,
    similarity: f64,
    overlap: usize,
    longest: usize,
}

fn pairs_by_path(index: &FingerprintIndex, paths: &BTreeMap<kgram::FileId, String>) -> Vec<PairByPath> {
    index
        .all_pairs(SortKey::Similarity)
        .into_iter()
        .map(|pair| {
            let mut left_path = paths[&pair.left_id()].clone();
            let mut right_path = paths[&pair.right_id()].clone();
            if left_path > right_path {
                std::mem::swap(&mut left_path, &mut right_path);
            }
            PairByPath {
                left_path,
                right_path,
                similarity: pair.similarity(),
                overlap: pair.overlap(),
                longest: pair.longest(),
            }
        })
        .collect()
}

#[test]
fn build_order_does_not_change_summary_or_pair_metrics() {
    crate::tracing::setup();

    let a_src = include_str_lf!("testdata/hello_world.c");
    let b_src = include_str_lf!("testdata/hello_world_renamed.c");
    let c_src = include_str_lf!("testdata/unrelated.c");

    // Build once adding [A, B, C]...
    let ids1 = FileIdAllocator::new();
    let a1 = tokenize(&ids1, "a.c", &a_src);
    let b1 = tokenize(&ids1, "b.c", &b_src);
    let c1 = tokenize(&ids1, "c.c", &c_src);
    let paths1: BTreeMap<_, _> = [
        (a1.id(), "a.c".to_string()),
        (b1.id(), "b.c".to_string()),
        (c1.id(), "c.c".to_string()),
    ]
    .into_iter()
    .collect();

    let mut index1 = FingerprintIndex::new(IndexOptions::builder().k(5).w(4).build());
    index1.add_files(vec![a1, b1, c1]).unwrap();

    // ...and again adding [C, A, B].
    let ids2 = FileIdAllocator::new();
    let c2 = tokenize(&ids2, "c.c", &c_src);
    let a2 = tokenize(&ids2, "a.c", &a_src);
    let b2 = tokenize(&ids2, "b.c", &b_src);
    let paths2: BTreeMap<_, _> = [
        (c2.id(), "c.c".to_string()),
        (a2.id(), "a.c".to_string()),
        (b2.id(), "b.c".to_string()),
    ]
    .into_iter()
    .collect();

    let mut index2 = FingerprintIndex::new(IndexOptions::builder().k(5).w(4).build());
    index2.add_files(vec![c2, a2, b2]).unwrap();

    let report1 = Report::new(&index1, ReportOptions::default(), Some(Language::C), None, vec![]);
    let report2 = Report::new(&index2, ReportOptions::default(), Some(Language::C), None, vec![]);

    let summary1 = report1.summary();
    let summary2 = report2.summary();
    assert_eq!(summary1.total_files(), summary2.total_files());
    assert_eq!(summary1.total_pairs(), summary2.total_pairs());
    assert_eq!(summary1.suspicious_pairs(), summary2.suspicious_pairs());
    assert_eq!(summary1.average_similarity(), summary2.average_similarity());
    assert_eq!(summary1.max_similarity(), summary2.max_similarity());

    assert_eq!(pairs_by_path(&index1, &paths1), pairs_by_path(&index2, &paths2));
}
