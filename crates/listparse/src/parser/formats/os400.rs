use std::sync::LazyLock;

use regex::Regex;

use crate::conf::{ConfigError, DialectConfig, SystemType};
use crate::parser::model::{Entry, EntryKind};
use crate::parser::timestamp::TimestampParser;
use crate::parser::traits::{EntryParser, FromConfig};

/// Groups: 1 owner, 2 size, 3 date, 4 time, 5 object type, 6 path.
static OS400_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\S+)\s+(\d+)\s+(\S+)\s+(\S+)\s+(\*\S+)\s+(\S+/?)\s*$").expect("static regex must compile")
});

pub const DEFAULT_DATE_FORMAT: &str = "yy/MM/dd HH:mm:ss";

pub struct Os400Parser {
    timestamps: TimestampParser,
}

impl Os400Parser {
    pub fn default_config() -> DialectConfig {
        DialectConfig::with_formats(SystemType::Os400, DEFAULT_DATE_FORMAT, None)
    }
}

impl FromConfig for Os400Parser {
    fn from_config(config: Option<&DialectConfig>) -> Result<Self, ConfigError> {
        let timestamps = TimestampParser::configured(config, Self::default_config())?;
        Ok(Self { timestamps })
    }
}

impl EntryParser for Os400Parser {
    fn parse_line(&self, line: &str) -> Option<Entry> {
        let caps = OS400_LINE.captures(line)?;

        let object_type = &caps[5];
        let kind = if object_type.eq_ignore_ascii_case("*STMF") {
            EntryKind::File
        } else if object_type.eq_ignore_ascii_case("*DIR") {
            EntryKind::Directory
        } else {
            EntryKind::Unknown
        };

        let mut entry = Entry::new(line, kind);
        entry.owner = Some(caps[1].to_string());
        entry.size = caps[2].parse().ok();
        entry.timestamp = self.timestamps.parse(&format!("{} {}", &caps[3], &caps[4])).ok();
        entry.name = bare_name(&caps[6]).to_string();
        Some(entry)
    }

    fn name(&self) -> &'static str {
        "os400"
    }
}

/// `/QSYS.LIB/MYLIB.LIB/` -> `MYLIB.LIB`
fn bare_name(path: &str) -> &str {
    let path = path.strip_suffix('/').unwrap_or(path);
    match path.rfind('/') {
        Some(pos) => &path[pos + 1..],
        None => path,
    }
}
