use std::collections::BTreeMap;
use std::sync::Arc;

use kgram::{
    tokenize_file, File, FileIdAllocator, FingerprintIndex, IndexOptions, Language, Report,
    ReportOptions, TokenizerOptions,
};

use crate::include_str_lf;

fn tokenize(ids: &FileIdAllocator, path: &str, content: &str) -> Arc<kgram::TokenizedFile> {
    let file = Arc::new(File::new(ids, path, content.as_bytes(), BTreeMap::new()));
    Arc::new(tokenize_file(file, Language::C, TokenizerOptions::default()).unwrap())
}

#[test]
fn summary_flags_near_duplicates_as_suspicious() {
    crate::tracing::setup();

    let ids = FileIdAllocator::new();
    let a = tokenize(&ids, "a.c", &include_str_lf!("testdata/hello_world.c"));
    let b = tokenize(&ids, "b.c", &include_str_lf!("testdata/hello_world_renamed.c"));
    let c = tokenize(&ids, "c.c", &include_str_lf!("testdata/unrelated.c"));

    let mut index = FingerprintIndex::new(IndexOptions::builder().k(5).w(4).build());
    index.add_files(vec![a, b, c]).unwrap();

    let report = Report::new(
        &index,
        ReportOptions::default(),
        Some(Language::C),
        Some("integration-fixture".to_string()),
        vec![],
    );

    let summary = report.summary();
    assert_eq!(*summary.total_files(), 3);
    assert!(*summary.suspicious_pairs() >= 1);
}

#[test]
fn get_top_pairs_is_sorted_descending_by_similarity() {
    crate::tracing::setup();

    let ids = FileIdAllocator::new();
    let a = tokenize(&ids, "a.c", &include_str_lf!("testdata/hello_world.c"));
    let b = tokenize(&ids, "b.c", &include_str_lf!("testdata/hello_world_renamed.c"));
    let c = tokenize(&ids, "c.c", &include_str_lf!("testdata/unrelated.c"));

    let mut index = FingerprintIndex::new(IndexOptions::builder().k(5).w(4).build());
    index.add_files(vec![a, b, c]).unwrap();

    let report = Report::new(&index, ReportOptions::default(), None, None, vec![]);
    let top = report.top_pairs(10);
    for window in top.windows(2) {
        assert!(window[0].similarity() >= window[1].similarity());
    }
}
