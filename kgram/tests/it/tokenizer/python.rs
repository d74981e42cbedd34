use std::collections::BTreeMap;
use std::sync::Arc;

use kgram::{tokenize_file, File, FileIdAllocator, Language, TokenizerOptions};

use crate::include_str_lf;

#[test]
fn hello_world_produces_balanced_tokens() {
    crate::tracing::setup();

    let content = include_str_lf!("../testdata/hello_world.py");
    let ids = FileIdAllocator::new();
    let file = Arc::new(File::new(&ids, "hello_world.py", content.as_bytes(), BTreeMap::new()));

    let tokenized = tokenize_file(file, Language::Python, TokenizerOptions::default()).unwrap();

    assert_eq!(tokenized.tokens().len(), tokenized.mapping().len());
    assert!(tokenized.tokens().iter().any(|t| t == "function_definition"));
    assert!(!tokenized.tokens().iter().any(|t| t.contains("comment")));
}
