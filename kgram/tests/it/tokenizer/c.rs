use std::collections::BTreeMap;
use std::sync::Arc;

use kgram::{tokenize_file, File, FileIdAllocator, Language, TokenizerOptions};
use pretty_assertions::assert_eq;

use crate::include_str_lf;

#[test]
fn hello_world_produces_balanced_tokens() {
    crate::tracing::setup();

    let content = include_str_lf!("../testdata/hello_world.c");
    let ids = FileIdAllocator::new();
    let file = Arc::new(File::new(&ids, "hello_world.c", content.as_bytes(), BTreeMap::new()));

    let tokenized = tokenize_file(file, Language::C, TokenizerOptions::default()).unwrap();

    assert_eq!(tokenized.tokens().len(), tokenized.mapping().len());

    let opens = tokenized.tokens().iter().filter(|t| t.as_str() == "(").count();
    let closes = tokenized.tokens().iter().filter(|t| t.as_str() == ")").count();
    assert_eq!(opens, closes);
    assert!(tokenized.tokens().iter().any(|t| t == "function_definition"));
}

#[test]
fn renamed_function_has_same_token_count() {
    crate::tracing::setup();

    let ids = FileIdAllocator::new();
    let original = include_str_lf!("../testdata/hello_world.c");
    let renamed = include_str_lf!("../testdata/hello_world_renamed.c");

    let original_file = Arc::new(File::new(&ids, "a.c", original.as_bytes(), BTreeMap::new()));
    let renamed_file = Arc::new(File::new(&ids, "b.c", renamed.as_bytes(), BTreeMap::new()));

    let original_tf = tokenize_file(original_file, Language::C, TokenizerOptions::default()).unwrap();
    let renamed_tf = tokenize_file(renamed_file, Language::C, TokenizerOptions::default()).unwrap();

    // Renaming a function doesn't change the AST shape: same node types
    // in the same order, only the `identifier` token's source text
    // differs (which this engine doesn't compare — only structure).
    assert_eq!(original_tf.tokens().len(), renamed_tf.tokens().len());
}

#[test]
fn comments_excluded_unless_requested() {
    crate::tracing::setup();

    let ids = FileIdAllocator::new();
    let content = "// a comment\nint x = 1;\n";
    let file = Arc::new(File::new(&ids, "a.c", content.as_bytes(), BTreeMap::new()));

    let default_tf = tokenize_file(Arc::clone(&file), Language::C, TokenizerOptions::default()).unwrap();
    assert!(!default_tf.tokens().iter().any(|t| t.contains("comment")));

    let opts = TokenizerOptions::builder().include_comments(true).build();
    let with_comments = tokenize_file(file, Language::C, opts).unwrap();
    assert!(with_comments.tokens().iter().any(|t| t.contains("comment")));
}
