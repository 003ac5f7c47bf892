use std::sync::LazyLock;

use regex::Regex;

use crate::conf::{ConfigError, DialectConfig, SystemType};
use crate::parser::model::{Entry, EntryKind};
use crate::parser::timestamp::TimestampParser;
use crate::parser::traits::{EntryParser, FromConfig};

/// `11-09-01  12:30PM       <DIR>          Logs`
static NT_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\S+)\s+(\S+)\s+(?:(<DIR>)|([0-9]+))\s+(\S.*)$").expect("static regex must compile")
});

pub const DEFAULT_DATE_FORMAT: &str = "MM-dd-yy hh:mma";
/// 24-hour clock, tried when the primary format fails
pub const SECONDARY_DATE_FORMAT: &str = "MM-dd-yy kk:mm";

pub struct NtParser {
    timestamps: TimestampParser,
    secondary: TimestampParser,
}

impl NtParser {
    pub fn default_config() -> DialectConfig {
        DialectConfig::with_formats(SystemType::WindowsNt, DEFAULT_DATE_FORMAT, None)
    }
}

impl FromConfig for NtParser {
    fn from_config(config: Option<&DialectConfig>) -> Result<Self, ConfigError> {
        let primary = match config {
            Some(config) => config.merged_with(&Self::default_config()),
            None => Self::default_config(),
        };
        // Same zone and months, 24-hour format only.
        let secondary = DialectConfig {
            default_date_format: Some(SECONDARY_DATE_FORMAT.to_string()),
            recent_date_format: None,
            ..primary.clone()
        };
        Ok(Self {
            timestamps: TimestampParser::new(&primary)?,
            secondary: TimestampParser::new(&secondary)?,
        })
    }
}

impl EntryParser for NtParser {
    fn parse_line(&self, line: &str) -> Option<Entry> {
        let caps = NT_LINE.captures(line)?;

        let name = &caps[5];
        if name == "." || name == ".." {
            return None;
        }

        let date = format!("{} {}", &caps[1], &caps[2]);
        let timestamp = match self.timestamps.parse(&date) {
            Ok(ts) => ts,
            Err(_) => match self.secondary.parse(&date) {
                Ok(ts) => ts,
                Err(err) => {
                    tracing::trace!(error = %err, "dropping NT line with unparseable date");
                    return None;
                }
            },
        };

        let mut entry = if caps.get(3).is_some() {
            let mut entry = Entry::new(line, EntryKind::Directory);
            entry.size = Some(0);
            entry
        } else {
            let mut entry = Entry::new(line, EntryKind::File);
            entry.size = caps.get(4).and_then(|m| m.as_str().parse().ok());
            entry
        };
        entry.name = name.to_string();
        entry.timestamp = Some(timestamp);
        Some(entry)
    }

    fn name(&self) -> &'static str {
        "windows_nt"
    }
}
