//! Python language binding.

use super::Tokenizer;

#[derive(Debug, Default)]
pub struct PythonTokenizer;

impl PythonTokenizer {
    pub fn new() -> Self {
        Self
    }
}

impl Tokenizer for PythonTokenizer {
    fn language_name(&self) -> &'static str {
        "python"
    }

    fn ts_language(&self) -> tree_sitter::Language {
        tree_sitter_python::LANGUAGE.into()
    }

    fn is_comment(&self, node_kind: &str) -> bool {
        // Python's grammar names plain comments `comment` but also emits
        // `string` nodes for docstrings; docstrings are left as ordinary
        // tokens since they're part of the AST shape, not noise.
        node_kind.contains("comment")
    }
}
