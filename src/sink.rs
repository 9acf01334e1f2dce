//! Output sinks for the rendered document

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use tracing::debug;

use crate::error::{Result, SlicerError};

/// Clipboard helpers tried in order when none is configured
const CLIPBOARD_HELPERS: &[(&str, &[&str])] = &[
    ("pbcopy", &[]),
    ("wl-copy", &[]),
    ("xclip", &["-selection", "clipboard"]),
    ("xsel", &["--clipboard", "--input"]),
    ("clip.exe", &[]),
    ("clip", &[]),
];

/// One-shot destination for rendered text
pub trait TextSink {
    fn name(&self) -> &str;

    fn write_text(&mut self, text: &str) -> Result<()>;
}

#[derive(Debug, Default)]
pub struct StdoutSink;

impl TextSink for StdoutSink {
    fn name(&self) -> &str {
        "stdout"
    }

    fn write_text(&mut self, text: &str) -> Result<()> {
        let mut stdout = std::io::stdout().lock();
        stdout
            .write_all(text.as_bytes())
            .and_then(|_| stdout.flush())
            .map_err(|e| SlicerError::sink(self.name(), e))
    }
}

#[derive(Debug)]
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TextSink for FileSink {
    fn name(&self) -> &str {
        "file"
    }

    fn write_text(&mut self, text: &str) -> Result<()> {
        std::fs::write(&self.path, text)
            .map_err(|e| SlicerError::sink(self.name(), format!("{}: {}", self.path.display(), e)))
    }
}

/// Pipes text into a platform clipboard helper
#[derive(Debug)]
pub struct ClipboardSink {
    program: PathBuf,
    args: Vec<String>,
}

impl ClipboardSink {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Use the configured command, or the first helper found on PATH
    pub fn detect(configured: Option<&[String]>) -> Result<Self> {
        if let Some(command) = configured {
            let (program, args) = command
                .split_first()
                .ok_or_else(|| SlicerError::sink("clipboard", "clipboard_command is empty"))?;
            return Ok(Self::new(program, args.to_vec()));
        }

        for (program, args) in CLIPBOARD_HELPERS {
            if let Ok(path) = which::which(program) {
                debug!("Using clipboard helper {}", path.display());
                return Ok(Self::new(path, args.iter().map(|a| a.to_string()).collect()));
            }
        }

        let tried: Vec<_> = CLIPBOARD_HELPERS.iter().map(|(program, _)| *program).collect();
        Err(SlicerError::sink(
            "clipboard",
            format!("no clipboard helper found on PATH (tried {})", tried.join(", ")),
        ))
    }
}

impl TextSink for ClipboardSink {
    fn name(&self) -> &str {
        "clipboard"
    }

    fn write_text(&mut self, text: &str) -> Result<()> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| SlicerError::sink("clipboard", format!("{}: {}", self.program.display(), e)))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(text.as_bytes())
                .map_err(|e| SlicerError::sink("clipboard", e))?;
        }

        let status = child.wait().map_err(|e| SlicerError::sink("clipboard", e))?;
        if !status.success() {
            return Err(SlicerError::sink(
                "clipboard",
                format!("{} exited with {}", self.program.display(), status),
            ));
        }
        Ok(())
    }
}
