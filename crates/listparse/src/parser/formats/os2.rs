use std::sync::LazyLock;

use regex::Regex;

use crate::conf::{ConfigError, DialectConfig, SystemType};
use crate::parser::model::{Entry, EntryKind};
use crate::parser::timestamp::TimestampParser;
use crate::parser::traits::{EntryParser, FromConfig};

/// Groups: 1 size, 2 attributes, 3 `DIR` marker, 4 date, 5 time, 6 name.
static OS2_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([0-9]+)\s*(\s+|[A-Z]+)\s*(DIR|\s+)\s*(\S+)\s+(\S+)\s+(\S.*)$")
        .expect("static regex must compile")
});

pub const DEFAULT_DATE_FORMAT: &str = "MM-dd-yy HH:mm";

pub struct Os2Parser {
    timestamps: TimestampParser,
}

impl Os2Parser {
    pub fn default_config() -> DialectConfig {
        DialectConfig::with_formats(SystemType::Os2, DEFAULT_DATE_FORMAT, None)
    }
}

impl FromConfig for Os2Parser {
    fn from_config(config: Option<&DialectConfig>) -> Result<Self, ConfigError> {
        let timestamps = TimestampParser::configured(config, Self::default_config())?;
        Ok(Self { timestamps })
    }
}

impl EntryParser for Os2Parser {
    fn parse_line(&self, line: &str) -> Option<Entry> {
        let caps = OS2_LINE.captures(line)?;

        let date = format!("{} {}", &caps[4], &caps[5]);
        let timestamp = match self.timestamps.parse(&date) {
            Ok(ts) => ts,
            Err(err) => {
                tracing::trace!(error = %err, "dropping OS/2 line with unparseable date");
                return None;
            }
        };

        // Either column may carry the marker.
        let is_dir = caps[3].trim() == "DIR" || caps[2].trim() == "DIR";
        let kind = if is_dir { EntryKind::Directory } else { EntryKind::File };

        let mut entry = Entry::new(line, kind);
        entry.name = caps[6].trim().to_string();
        entry.size = caps[1].parse().ok();
        entry.timestamp = Some(timestamp);
        Some(entry)
    }

    fn name(&self) -> &'static str {
        "os2"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    fn parser() -> Os2Parser {
        let config = DialectConfig::new(SystemType::Os2).with_timezone("UTC");
        Os2Parser::from_config(Some(&config)).unwrap()
    }

    #[test]
    fn test_directory() {
        let entry = parser()
            .parse_line("    0           DIR   11-28-97   09:42  PC")
            .unwrap();
        assert!(entry.is_directory());
        assert_eq!(entry.name, "PC");
        assert_eq!(entry.size, Some(0));
        let ts = entry.timestamp.unwrap();
        assert_eq!((ts.year(), ts.month(), ts.day()), (1997, 11, 28));
        assert_eq!((ts.hour(), ts.minute()), (9, 42));
    }

    #[test]
    fn test_directory_marker_after_attribute() {
        let entry = parser()
            .parse_line("    0      A     DIR   11-28-97   09:42  PC")
            .unwrap();
        assert!(entry.is_directory());
        assert_eq!(entry.name, "PC");
    }

    #[test]
    fn test_file_with_attribute() {
        let entry = parser()
            .parse_line("  149473      A          11-17-98   16:07  POPUPLOG.OS2")
            .unwrap();
        assert!(entry.is_file());
        assert_eq!(entry.size, Some(149473));
        assert_eq!(entry.name, "POPUPLOG.OS2");
    }

    #[test]
    fn test_plain_file() {
        let entry = parser()
            .parse_line("   5000                 12-05-96   05:03  saga.txt")
            .unwrap();
        assert!(entry.is_file());
        assert_eq!(entry.name, "saga.txt");
    }

    #[test]
    fn test_unparseable_date_drops_line() {
        assert!(parser().parse_line("    0           DIR   someday   09:42  PC").is_none());
    }

    #[test]
    fn test_non_numeric_size_does_not_match() {
        assert!(parser().parse_line("   size      A          11-17-98   16:07  x").is_none());
    }
}
