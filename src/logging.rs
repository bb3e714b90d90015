use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use crate::error::TimerError;

/// Sink for timing lines. Only `warn` is ever called on it.
pub trait WarnLogger: Send + Sync {
    fn warn(&self, message: &str);
}

/// Writes each line to stderr, the default sink
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrLogger;

impl WarnLogger for StderrLogger {
    fn warn(&self, message: &str) {
        eprintln!("{}", message);
    }
}

/// Forwards each line as a `tracing` warn event
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl WarnLogger for TracingLogger {
    fn warn(&self, message: &str) {
        tracing::warn!(target: "callback_timer", "{}", message);
    }
}

/// Keeps every line in memory.
/// Clones share the same buffer, so one handle can go into a config while
/// another is used to read back what was logged.
#[derive(Debug, Default, Clone)]
pub struct MemoryLogger {
    lines: Arc<Mutex<Vec<String>>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all captured lines, oldest first
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lines.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.lock().is_empty()
    }

    pub fn last(&self) -> Option<String> {
        self.lines.lock().last().cloned()
    }

    pub fn clear(&self) {
        self.lines.lock().clear();
    }
}

impl WarnLogger for MemoryLogger {
    fn warn(&self, message: &str) {
        self.lines.lock().push(message.to_string());
    }
}

/// Logger choice as it appears in settings files
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoggerKind {
    #[default]
    Stderr,
    Tracing,
}

impl LoggerKind {
    pub fn build(self) -> Arc<dyn WarnLogger> {
        match self {
            LoggerKind::Stderr => Arc::new(StderrLogger),
            LoggerKind::Tracing => Arc::new(TracingLogger),
        }
    }
}

/// Initialize structured logging with tracing.
/// Call once at startup; a second call reports an error instead of panicking.
pub fn init_logging() -> Result<(), TimerError> {
    install_subscriber(false)?;
    tracing::info!("Structured logging initialized");
    Ok(())
}

/// Same as [`init_logging`] with JSON output for log shippers
pub fn init_logging_json() -> Result<(), TimerError> {
    install_subscriber(true)?;
    tracing::info!("Structured JSON logging initialized");
    Ok(())
}

fn install_subscriber(json: bool) -> Result<(), TimerError> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let layer = fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);
    let layer = if json {
        layer.json().boxed()
    } else {
        layer.boxed()
    };

    let subscriber = tracing_subscriber::registry()
        .with(layer)
        .with(filter);

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| TimerError::config(format!("Failed to set global tracing subscriber: {}", e))
            .with_source("tracing"))
}
