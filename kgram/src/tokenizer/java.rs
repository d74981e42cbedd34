//! Java language binding.

use super::Tokenizer;

#[derive(Debug, Default)]
pub struct JavaTokenizer;

impl JavaTokenizer {
    pub fn new() -> Self {
        Self
    }
}

impl Tokenizer for JavaTokenizer {
    fn language_name(&self) -> &'static str {
        "java"
    }

    fn ts_language(&self) -> tree_sitter::Language {
        tree_sitter_java::LANGUAGE.into()
    }
}
