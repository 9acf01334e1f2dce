//! Grammar selection for the ECMAScript family
//!
//! A single tree-sitter grammar is picked per file. JSX is covered by the
//! JavaScript grammar; TypeScript and TSX have their own grammars.

mod javascript;

pub use javascript::{
    classify, is_comment, node_text, positional_arguments, string_value, FunctionShape, Syntax,
};

use serde::{Deserialize, Serialize};
use std::path::Path;
use tree_sitter::Language;

/// Source dialect to parse a file with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// Decide from the file extension
    Auto,
    Javascript,
    Typescript,
    Tsx,
}

impl Dialect {
    /// Resolve `Auto` against a file path; explicit dialects are returned as-is
    pub fn resolve(self, path: &Path) -> Dialect {
        if self != Dialect::Auto {
            return self;
        }

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("ts") | Some("mts") | Some("cts") => Dialect::Typescript,
            Some("tsx") => Dialect::Tsx,
            _ => Dialect::Javascript,
        }
    }

    /// Tree-sitter grammar for this dialect
    pub fn grammar(self) -> Language {
        match self {
            Dialect::Typescript => tree_sitter_typescript::language_typescript(),
            Dialect::Tsx => tree_sitter_typescript::language_tsx(),
            Dialect::Auto | Dialect::Javascript => tree_sitter_javascript::language(),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Dialect::Auto => "auto",
            Dialect::Javascript => "javascript",
            Dialect::Typescript => "typescript",
            Dialect::Tsx => "tsx",
        }
    }
}
