use std::collections::BTreeMap;
use std::sync::Arc;

use kgram::{tokenize_file, File, FileIdAllocator, IndexOptions, Language, TokenizerOptions};
use kgram::FingerprintIndex;

use crate::include_str_lf;

fn tokenize(ids: &FileIdAllocator, path: &str, content: &str) -> Arc<kgram::TokenizedFile> {
    let file = Arc::new(File::new(ids, path, content.as_bytes(), BTreeMap::new()));
    Arc::new(tokenize_file(file, Language::C, TokenizerOptions::default()).unwrap())
}

#[test]
fn structurally_similar_files_share_fingerprints() {
    crate::tracing::setup();

    let ids = FileIdAllocator::new();
    let a = tokenize(&ids, "a.c", &include_str_lf!("testdata/hello_world.c"));
    let b = tokenize(&ids, "b.c", &include_str_lf!("testdata/hello_world_renamed.c"));

    let mut index = FingerprintIndex::new(IndexOptions::builder().k(5).w(4).build());
    index.add_files(vec![a.clone(), b.clone()]).unwrap();

    let entry_a = index.file_entry(a.id()).unwrap();
    let entry_b = index.file_entry(b.id()).unwrap();
    assert!(!entry_a.shared().is_empty());
    assert!(!entry_a.shared().is_disjoint(entry_b.shared()));
}

#[test]
fn boilerplate_file_suppresses_shared_fingerprints() {
    crate::tracing::setup();

    let ids = FileIdAllocator::new();
    let boilerplate = tokenize(&ids, "boilerplate.c", &include_str_lf!("testdata/hello_world.c"));
    let real = tokenize(&ids, "real.c", &include_str_lf!("testdata/hello_world_renamed.c"));

    let mut index = FingerprintIndex::new(IndexOptions::builder().k(5).w(4).build());
    index.add_ignored_file(boilerplate).unwrap();
    index.add_files(vec![real.clone()]).unwrap();

    let entry = index.file_entry(real.id()).unwrap();
    assert!(!entry.ignored().is_empty());
}

#[test]
fn inverted_map_consistency_holds_after_build() {
    crate::tracing::setup();

    let ids = FileIdAllocator::new();
    let a = tokenize(&ids, "a.c", &include_str_lf!("testdata/hello_world.c"));
    let b = tokenize(&ids, "b.c", &include_str_lf!("testdata/unrelated.c"));

    let mut index = FingerprintIndex::new(IndexOptions::builder().k(5).w(4).build());
    index.add_files(vec![a.clone(), b.clone()]).unwrap();

    for id in [a.id(), b.id()] {
        let entry = index.file_entry(id).unwrap();
        for hash in entry.shared().iter().chain(entry.ignored().iter()) {
            let fingerprint = index.fingerprint(*hash).expect("every referenced hash exists");
            assert!(fingerprint.occurrences().iter().any(|o| o.file == id));
        }
        // Every hash lives in exactly one of shared/ignored, never both.
        assert!(entry.shared().is_disjoint(entry.ignored()));
    }
}
