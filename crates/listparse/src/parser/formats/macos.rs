use std::sync::LazyLock;

use regex::Regex;

use super::unix::{permission_triplets, set_name_and_target, UnixParser};
use crate::conf::{ConfigError, DialectConfig, SystemType};
use crate::parser::model::{Entry, EntryKind};
use crate::parser::timestamp::TimestampParser;
use crate::parser::traits::{EntryParser, FromConfig};

/// Peter's Server for classic Mac OS. Like `ls -l`, but with either `folder`
/// or two fork sizes where Unix prints links, owner and group.
///
/// Groups: 1 type, 4-14 permissions, 20 size, 21 date, 22 time or year,
/// 23 name, 24 name tail.
static MACOS_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^([bcdelfmpSs-])",
        r"(((r|-)(w|-)([xsStTL-]))((r|-)(w|-)([xsStTL-]))((r|-)(w|-)([xsStTL-])))\+?\s+",
        r"((folder\s+)|((\d+)\s+(\d+)\s+))",
        r"(\d+)\s+",
        r"((?:\d+[-/]\d+[-/]\d+)|(?:\S{3}\s+\d{1,2})|(?:\d{1,2}\s+\S{3}))\s+",
        r"(\d+(?::\d+)?)\s+",
        r"(\S*)(\s*.*)$",
    ))
    .expect("static regex must compile")
});

pub struct MacOsPeterParser {
    timestamps: TimestampParser,
}

impl MacOsPeterParser {
    pub fn default_config() -> DialectConfig {
        DialectConfig {
            system: SystemType::Macos,
            ..UnixParser::default_config()
        }
    }
}

impl FromConfig for MacOsPeterParser {
    fn from_config(config: Option<&DialectConfig>) -> Result<Self, ConfigError> {
        let timestamps = TimestampParser::configured(config, Self::default_config())?;
        Ok(Self { timestamps })
    }
}

impl EntryParser for MacOsPeterParser {
    fn parse_line(&self, line: &str) -> Option<Entry> {
        let caps = MACOS_LINE.captures(line)?;

        let kind = match caps[1].chars().next()? {
            'd' => EntryKind::Directory,
            'l' | 'e' => EntryKind::SymbolicLink,
            'b' | 'c' | 'f' | '-' => EntryKind::File,
            _ => EntryKind::Unknown,
        };

        let mut entry = Entry::new(line, kind);
        entry.permissions = permission_triplets(&caps, 4);
        entry.hard_link_count = Some(0);
        entry.size = caps[20].parse().ok();
        entry.timestamp = self.timestamps.parse(&format!("{} {}", &caps[21], &caps[22])).ok();
        set_name_and_target(&mut entry, &caps[23], caps.get(24).map(|m| m.as_str()));
        Some(entry)
    }

    fn name(&self) -> &'static str {
        "macos_peter"
    }
}
