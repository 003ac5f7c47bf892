use std::sync::LazyLock;

use regex::Regex;

use crate::conf::{ConfigError, DialectConfig, SystemType};
use crate::parser::model::{Access, Entry, EntryKind, Permission};
use crate::parser::timestamp::TimestampParser;
use crate::parser::traits::{EntryParser, FromConfig};

/// `d [-RWCE-F--] owner 512 Jun 03 10:56 PUBLIC`
///
/// Groups: 1 type, 2 attributes, 3 owner, 4 size, 5 date, 9 name.
static NETWARE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(d|-){1}\s+\[([-A-Z]+)\]\s+(\S+)\s+(\d+)\s+(\S+\s+\S+\s+((\d+:\d+)|(\d{4})))\s+(.*)$")
        .expect("static regex must compile")
});

pub const DEFAULT_DATE_FORMAT: &str = "MMM dd yyyy";
pub const DEFAULT_RECENT_DATE_FORMAT: &str = "MMM dd HH:mm";

pub struct NetwareParser {
    timestamps: TimestampParser,
}

impl NetwareParser {
    pub fn default_config() -> DialectConfig {
        DialectConfig::with_formats(SystemType::Netware, DEFAULT_DATE_FORMAT, Some(DEFAULT_RECENT_DATE_FORMAT))
    }
}

impl FromConfig for NetwareParser {
    fn from_config(config: Option<&DialectConfig>) -> Result<Self, ConfigError> {
        let timestamps = TimestampParser::configured(config, Self::default_config())?;
        Ok(Self { timestamps })
    }
}

impl EntryParser for NetwareParser {
    fn parse_line(&self, line: &str) -> Option<Entry> {
        let caps = NETWARE_LINE.captures(line)?;

        let kind = if &caps[1] == "d" { EntryKind::Directory } else { EntryKind::File };
        let mut entry = Entry::new(line, kind);
        entry.owner = Some(caps[3].to_string());
        entry.size = caps[4].parse().ok();
        entry.timestamp = self.timestamps.parse(&caps[5]).ok();
        entry.name = caps[9].to_string();

        // Only the trustee rights map onto owner permissions; the rest
        // (Create, Erase, Access control, File scan, Modify, Supervisor) do not.
        let attributes = &caps[2];
        entry.permissions.set(Access::Owner, Permission::Read, attributes.contains('R'));
        entry.permissions.set(Access::Owner, Permission::Write, attributes.contains('W'));
        Some(entry)
    }

    fn name(&self) -> &'static str {
        "netware"
    }
}
