use std::path::{Path, PathBuf};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};
use tree_sitter::{Parser, Tree};

use crate::config::ParsingConfig;
use crate::error::{Result, SlicerError};
use super::languages::Dialect;

/// A parsed source file together with its syntax tree
#[derive(Debug, Clone)]
pub struct ParsedSource {
    /// Path the source was read from (as given on the command line)
    pub path: PathBuf,

    /// Dialect the file was parsed as (never `Auto`)
    pub dialect: Dialect,

    /// Raw source text
    pub text: String,

    /// SHA-256 of the source text
    pub content_hash: String,

    /// Error-recovering syntax tree
    pub tree: Tree,
}

impl ParsedSource {
    /// Whether error recovery kicked in anywhere in the tree
    pub fn has_errors(&self) -> bool {
        self.tree.root_node().has_error()
    }
}

/// Tree-sitter based parser for one ECMAScript-family file
pub struct SourceParser {
    config: ParsingConfig,
}

impl SourceParser {
    pub fn new(config: &ParsingConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Read and parse a single source file
    pub fn parse_file<P: AsRef<Path>>(&self, file_path: P) -> Result<ParsedSource> {
        let path = file_path.as_ref();
        let text = std::fs::read_to_string(path)?;

        if text.len() > self.config.max_file_size {
            return Err(SlicerError::Parser(format!(
                "File {} exceeds maximum size limit of {} bytes",
                path.display(),
                self.config.max_file_size
            )));
        }

        let dialect = self.config.language.resolve(path);
        self.parse_source(text, dialect, path)
    }

    /// Parse in-memory source text as the given dialect
    pub fn parse_source(&self, text: String, dialect: Dialect, path: &Path) -> Result<ParsedSource> {
        let dialect = dialect.resolve(path);
        let mut parser = Parser::new();
        parser
            .set_language(&dialect.grammar())
            .map_err(|e| SlicerError::Parser(format!("Failed to set {} language: {}", dialect.name(), e)))?;

        let tree = parser.parse(&text, None).ok_or_else(|| {
            SlicerError::Parser(format!("Failed to parse {} as {}", path.display(), dialect.name()))
        })?;

        let parsed = ParsedSource {
            path: path.to_path_buf(),
            dialect,
            content_hash: calculate_hash(&text),
            text,
            tree,
        };

        if parsed.has_errors() {
            warn!(
                "Syntax errors in {}; continuing with the recoverable part of the tree",
                path.display()
            );
        }
        debug!("Parsed {} as {} ({} bytes)", path.display(), dialect.name(), parsed.text.len());

        Ok(parsed)
    }
}

/// Calculate SHA256 hash of content
fn calculate_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_source_tolerates_broken_input() {
        let parser = SourceParser::new(&ParsingConfig::default());
        let parsed = parser
            .parse_source("function ok() {}\nfunction broken( {".to_string(), Dialect::Javascript, Path::new("x.js"))
            .unwrap();

        assert!(parsed.has_errors());
        assert_eq!(parsed.dialect, Dialect::Javascript);
        assert_eq!(parsed.content_hash.len(), 64);
    }

    #[test]
    fn test_parse_file_respects_size_limit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.js");
        std::fs::write(&path, "function f() {}\n".repeat(10)).unwrap();

        let config = ParsingConfig {
            max_file_size: 16,
            ..ParsingConfig::default()
        };
        let result = SourceParser::new(&config).parse_file(&path);
        assert!(matches!(result, Err(SlicerError::Parser(_))));
    }

    #[test]
    fn test_parse_file_picks_dialect_from_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("typed.ts");
        std::fs::write(&path, "function f(x: number): number { return x; }\n").unwrap();

        let parsed = SourceParser::new(&ParsingConfig::default()).parse_file(&path).unwrap();
        assert_eq!(parsed.dialect, Dialect::Typescript);
        assert!(!parsed.has_errors());
    }
}
