use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use std::path::PathBuf;
use tracing::info;

use crate::config::Config;
use crate::core::{render, Dialect, Encoding, Engine, SliceDocument};
use crate::error::SlicerError;
use crate::interaction::TerminalPrompter;
use crate::session::SessionSettings;
use crate::sink::{ClipboardSink, FileSink, StdoutSink, TextSink};

#[derive(Parser, Debug)]
#[command(name = "callslice")]
#[command(about = "Slice a JavaScript call graph around chosen declarations")]
#[command(version)]
pub struct Cli {
    /// Source file to analyze
    pub file: Option<PathBuf>,

    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Seed declarations, comma-separated (skips the seed prompt)
    #[arg(long)]
    pub seeds: Option<String>,

    /// Accept configured defaults for every other prompt
    #[arg(short = 'y', long)]
    pub defaults: bool,

    /// Write the output to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Grammar to parse with
    #[arg(long, value_enum)]
    pub language: Option<Dialect>,
}

impl Cli {
    pub fn execute(self) -> Result<()> {
        let Some(file) = self.file.as_deref() else {
            let usage = Cli::command().render_usage().to_string();
            return Err(SlicerError::Usage(usage).into());
        };

        let mut config = Config::load_or_default(self.config.as_deref())
            .context("Failed to load configuration")?;
        if let Some(language) = self.language {
            config.parsing.language = language;
        }

        let engine = Engine::new(config);
        let analysis = engine
            .analyze(file)
            .with_context(|| format!("Failed to analyze {}", file.display()))?;

        let mut prompter = TerminalPrompter::stdio();
        let settings = SessionSettings::gather(
            &mut prompter,
            engine.config(),
            self.seeds.as_deref(),
            self.defaults,
        )?;

        let document = analysis.slice(&settings.request, &settings.projection)?;
        info!(
            "✂️  Selected {} of {} declarations",
            document.stats.included, document.stats.declarations
        );

        self.emit(&document, &settings, engine.config())
    }

    fn emit(&self, document: &SliceDocument, settings: &SessionSettings, config: &Config) -> Result<()> {
        if settings.clipboard {
            let text = render(document, Encoding::LiteralExport { pretty: settings.pretty })?;
            let mut sink = ClipboardSink::detect(config.output.clipboard_command.as_deref())?;
            sink.write_text(&text)?;
            eprintln!("Copied {} bytes to clipboard", text.len());
            return Ok(());
        }

        let text = render(document, Encoding::Json { pretty: settings.pretty })?;
        let mut sink: Box<dyn TextSink> = match &self.output {
            Some(path) => Box::new(FileSink::new(path)),
            None => Box::new(StdoutSink),
        };
        sink.write_text(&text)?;
        info!("📤 Wrote {} bytes to {}", text.len(), sink.name());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_all_options() {
        let cli = Cli::try_parse_from([
            "callslice",
            "app.ts",
            "--seeds",
            "main,run",
            "-y",
            "-o",
            "out.json",
            "--language",
            "tsx",
            "-v",
        ])
        .unwrap();

        assert_eq!(cli.file, Some(PathBuf::from("app.ts")));
        assert_eq!(cli.seeds.as_deref(), Some("main,run"));
        assert!(cli.defaults);
        assert!(cli.verbose);
        assert_eq!(cli.output, Some(PathBuf::from("out.json")));
        assert_eq!(cli.language, Some(Dialect::Tsx));
    }

    #[test]
    fn test_missing_file_is_a_usage_error() {
        let cli = Cli::try_parse_from(["callslice"]).unwrap();
        let err = cli.execute().unwrap_err();
        let slicer = err.downcast_ref::<SlicerError>().unwrap();
        assert!(matches!(slicer, SlicerError::Usage(_)));
        assert_eq!(slicer.exit_code(), 1);
    }
}
