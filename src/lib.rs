pub mod config;
pub mod error;
pub mod humanize;
pub mod logging;
pub mod timer;

pub use config::settings::TimerSettings;
pub use config::{Tag, TimerConfig};
pub use error::{ErrorKind, TimerError};
pub use humanize::{DurationFormatter, HumanizedFormatter};
pub use logging::{init_logging, init_logging_json, LoggerKind, MemoryLogger, StderrLogger, TracingLogger, WarnLogger};
pub use timer::{wrap, wrap_with, Callback, CallbackTimer, Method, NoCallback, Plain, TimedCallback};
