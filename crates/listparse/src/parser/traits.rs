use super::model::Entry;
use crate::conf::{ConfigError, DialectConfig};

pub trait EntryParser: Send + Sync {
    /// Parse one record into an entry; `None` for lines this dialect does not recognize.
    fn parse_line(&self, line: &str) -> Option<Entry>;

    /// Transform the whole record list before per-line parsing.
    ///
    /// Must be idempotent on its own output.
    fn pre_process(&mut self, lines: Vec<String>) -> Vec<String> {
        lines
    }

    /// Split a raw listing into records. One record per line unless a dialect
    /// spreads entries over several lines.
    fn read_entries(&self, raw: &str) -> Vec<String> {
        raw.lines().map(str::to_string).collect()
    }

    fn name(&self) -> &'static str;
}

/// Grammars built from an optional [`DialectConfig`]; `None` means the grammar's own defaults.
pub trait FromConfig: Sized {
    fn from_config(config: Option<&DialectConfig>) -> Result<Self, ConfigError>;

    fn with_defaults() -> Result<Self, ConfigError> {
        Self::from_config(None)
    }
}

impl<P: EntryParser + ?Sized> EntryParser for Box<P> {
    fn parse_line(&self, line: &str) -> Option<Entry> {
        (**self).parse_line(line)
    }

    fn pre_process(&mut self, lines: Vec<String>) -> Vec<String> {
        (**self).pre_process(lines)
    }

    fn read_entries(&self, raw: &str) -> Vec<String> {
        (**self).read_entries(raw)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}
