use serde::{Serialize, Deserialize};
use std::fmt;

/// What went wrong, independent of where.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum ErrorKind {
    /// The value handed to the timer cannot be called
    #[error("invalid callback")]
    InvalidCallback,
    /// Timer settings could not be parsed or are inconsistent
    #[error("invalid configuration")]
    Config,
    /// Settings file could not be read
    #[error("i/o failure")]
    Io,
}

/// Error type for the crate.
/// Only `build` on the wrapper and settings loading produce it; failures of
/// the wrapped callback are handed back to the caller untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerError {
    pub kind: ErrorKind,
    pub message: String,
    pub stage: String,
    pub context: Option<String>,
    pub source: Option<String>,
}

impl TimerError {
    /// Create a new error with kind, message and stage
    pub fn new<S: Into<String>>(kind: ErrorKind, message: S, stage: &'static str) -> Self {
        TimerError {
            kind,
            message: message.into(),
            stage: stage.to_string(),
            context: None,
            source: None,
        }
    }

    pub fn invalid_callback<S: Into<String>>(message: S) -> Self {
        Self::new(ErrorKind::InvalidCallback, message, "wrap")
    }

    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::new(ErrorKind::Config, message, "config")
    }

    /// Add additional context information
    pub fn with_context<S: Into<String>>(mut self, context: S) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Add source error information
    pub fn with_source<S: Into<String>>(mut self, source: S) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn is_invalid_callback(&self) -> bool {
        self.kind == ErrorKind::InvalidCallback
    }
}

impl fmt::Display for TimerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.stage, self.kind, self.message)?;
        if let Some(ref context) = self.context {
            write!(f, " (context: {})", context)?;
        }
        if let Some(ref source) = self.source {
            write!(f, " (source: {})", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for TimerError {}

impl From<std::io::Error> for TimerError {
    fn from(err: std::io::Error) -> Self {
        TimerError::new(
            ErrorKind::Io,
            format!("I/O error: {}", err),
            "io"
        ).with_source("std::io")
    }
}

impl From<toml::de::Error> for TimerError {
    fn from(err: toml::de::Error) -> Self {
        TimerError::new(
            ErrorKind::Config,
            format!("TOML error: {}", err),
            "toml_parse"
        ).with_source("toml")
    }
}

impl From<serde_json::Error> for TimerError {
    fn from(err: serde_json::Error) -> Self {
        TimerError::new(
            ErrorKind::Config,
            format!("JSON error: {}", err),
            "json_parse"
        ).with_source("serde_json")
    }
}
