//! C language binding.

use super::Tokenizer;

#[derive(Debug, Default)]
pub struct CTokenizer;

impl CTokenizer {
    pub fn new() -> Self {
        Self
    }
}

impl Tokenizer for CTokenizer {
    fn language_name(&self) -> &'static str {
        "c"
    }

    fn ts_language(&self) -> tree_sitter::Language {
        tree_sitter_c::LANGUAGE.into()
    }
}
