pub mod settings;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use crate::humanize::{DurationFormatter, HumanizedFormatter};
use crate::logging::{StderrLogger, WarnLogger};

/// Label printed in brackets at the front of a timing line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Tag {
    Single(String),
    Many(Vec<String>),
}

impl Tag {
    /// Display form; a list is joined with single spaces
    pub fn joined(&self) -> String {
        match self {
            Tag::Single(tag) => tag.clone(),
            Tag::Many(parts) => parts.join(" "),
        }
    }
}

impl From<&str> for Tag {
    fn from(tag: &str) -> Self {
        Tag::Single(tag.to_string())
    }
}

impl From<String> for Tag {
    fn from(tag: String) -> Self {
        Tag::Single(tag)
    }
}

impl From<Vec<String>> for Tag {
    fn from(parts: Vec<String>) -> Self {
        Tag::Many(parts)
    }
}

impl From<Vec<&str>> for Tag {
    fn from(parts: Vec<&str>) -> Self {
        Tag::Many(parts.into_iter().map(str::to_string).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Tag {
    fn from(parts: [&str; N]) -> Self {
        Tag::Many(parts.iter().map(|p| p.to_string()).collect())
    }
}

/// How a timed callback reports itself.
/// Logger and formatter are injected here rather than looked up globally.
#[derive(Clone)]
pub struct TimerConfig {
    pub logger: Arc<dyn WarnLogger>,
    pub formatter: Arc<dyn DurationFormatter>,
    /// Zero means every call is logged
    pub max_time_warning: Duration,
    pub use_relative_time: bool,
    pub tag: Option<Tag>,
    pub method_name: Option<String>,
}

impl Default for TimerConfig {
    fn default() -> Self {
        TimerConfig {
            logger: Arc::new(StderrLogger),
            formatter: Arc::new(HumanizedFormatter),
            max_time_warning: Duration::ZERO,
            use_relative_time: true,
            tag: None,
            method_name: None,
        }
    }
}

impl fmt::Debug for TimerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerConfig")
            .field("max_time_warning", &self.max_time_warning)
            .field("use_relative_time", &self.use_relative_time)
            .field("tag", &self.tag)
            .field("method_name", &self.method_name)
            .finish_non_exhaustive()
    }
}

impl TimerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_logger<L: WarnLogger + 'static>(mut self, logger: L) -> Self {
        self.logger = Arc::new(logger);
        self
    }

    pub fn with_shared_logger(mut self, logger: Arc<dyn WarnLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn with_formatter<D: DurationFormatter + 'static>(mut self, formatter: D) -> Self {
        self.formatter = Arc::new(formatter);
        self
    }

    pub fn with_max_time_warning(mut self, threshold: Duration) -> Self {
        self.max_time_warning = threshold;
        self
    }

    pub fn with_max_time_warning_ms(self, ms: u64) -> Self {
        self.with_max_time_warning(Duration::from_millis(ms))
    }

    pub fn with_relative_time(mut self, enabled: bool) -> Self {
        self.use_relative_time = enabled;
        self
    }

    pub fn with_tag<T: Into<Tag>>(mut self, tag: T) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn with_method_name<S: Into<String>>(mut self, name: S) -> Self {
        self.method_name = Some(name.into());
        self
    }

    /// Joined tag, or `None` when it would print as empty
    pub(crate) fn display_tag(&self) -> Option<String> {
        self.tag
            .as_ref()
            .map(Tag::joined)
            .filter(|tag| !tag.is_empty())
    }

    pub(crate) fn display_method(&self) -> Option<&str> {
        self.method_name
            .as_deref()
            .filter(|name| !name.is_empty())
    }
}
