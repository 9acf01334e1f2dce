use thiserror::Error;

/// Main error type for callslice operations
#[derive(Error, Debug)]
pub enum SlicerError {
    #[error("{0}")]
    Usage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Parser error: {0}")]
    Parser(String),

    #[error(
        "No declaration matched {}. Retry with an exact node id or declaration name.",
        format_tokens(.tokens)
    )]
    SeedResolution { tokens: Vec<String> },

    #[error("Output sink '{sink}' failed: {message}")]
    Sink { sink: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SlicerError {
    pub fn sink(sink: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::Sink {
            sink: sink.into(),
            message: message.to_string(),
        }
    }

    /// Process exit code for this failure
    pub fn exit_code(&self) -> u8 {
        match self {
            SlicerError::SeedResolution { .. } => 2,
            SlicerError::Sink { .. } => 3,
            _ => 1,
        }
    }
}

fn format_tokens(tokens: &[String]) -> String {
    if tokens.is_empty() {
        "an empty seed list".to_string()
    } else {
        tokens
            .iter()
            .map(|t| format!("'{}'", t))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

pub type Result<T> = std::result::Result<T, SlicerError>;
