// src/core/engine.rs
use std::path::Path;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::Result;
use super::{
    CallGraph, Dialect, ParsedSource, ProjectionOptions, Projector, ReindentPrinter,
    SelectionState, SliceDocument, SliceRequest, SliceSelector, SourceParser,
};

/// Orchestrates parse -> collect -> resolve -> slice -> project.
///
/// Everything here is synchronous and free of terminal I/O; prompting and
/// output sinks live in the CLI layer.
pub struct Engine {
    config: Config,
    parser: SourceParser,
    printer: ReindentPrinter,
}

/// A parsed file and its call graph, ready to be sliced any number of times
#[derive(Debug, Clone)]
pub struct Analysis {
    pub source: ParsedSource,
    pub graph: CallGraph,
}

impl Engine {
    pub fn new(config: Config) -> Self {
        debug!("Loaded configuration: {:?}", config);
        let parser = SourceParser::new(&config.parsing);

        Self {
            config,
            parser,
            printer: ReindentPrinter,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Parse a file from disk and build its call graph
    pub fn analyze<P: AsRef<Path>>(&self, path: P) -> Result<Analysis> {
        info!("📖 Parsing {}", path.as_ref().display());
        let source = self.parser.parse_file(path)?;
        Ok(self.build(source))
    }

    /// Same as [`Engine::analyze`] for in-memory source
    pub fn analyze_source(&self, text: &str, dialect: Dialect, path: &Path) -> Result<Analysis> {
        let source = self.parser.parse_source(text.to_string(), dialect, path)?;
        Ok(self.build(source))
    }

    fn build(&self, source: ParsedSource) -> Analysis {
        let graph = CallGraph::build(&source, &self.printer);
        Analysis { source, graph }
    }
}

impl Analysis {
    pub fn select(&self, request: &SliceRequest) -> Result<SelectionState> {
        SliceSelector::new(&self.graph).select(request)
    }

    /// Slice around the requested seeds and project the result
    pub fn slice(&self, request: &SliceRequest, options: &ProjectionOptions) -> Result<SliceDocument> {
        let selection = self.select(request)?;
        Ok(Projector::new(&self.graph, &selection, options).document(&self.source))
    }
}
