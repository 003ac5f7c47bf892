use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::conf::{ConfigError, DialectConfig, SystemType};
use crate::parser::model::{Access, Entry, EntryKind, Permission, Permissions};
use crate::parser::timestamp::TimestampParser;
use crate::parser::traits::{EntryParser, FromConfig};

/// `ls -l` output.
///
/// Groups: 1 type, 4-14 permission triplets, 15 links, 16 owner, 17 group,
/// 18 size, 19 date, 20 time or year, 21 name, 22 name tail.
static UNIX_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^([bcdelfmpSs-])",
        r"(((r|-)(w|-)([xsStTL-]))((r|-)(w|-)([xsStTL-]))((r|-)(w|-)([xsStTL-])))\+?\s*",
        r"(\d+)\s+",
        r"(?:(\S+(?:\s\S+)*?)\s+)?",
        r"(?:(\S+(?:\s\S+)*)\s+)?",
        r"(\d+(?:,\s*\d+)?)\s+",
        r"((?:\d+[-/]\d+[-/]\d+)|(?:\S{3}\s+\d{1,2})|(?:\d{1,2}\s+\S{3}))\s+",
        r"(\d+(?::\d+)?)\s+",
        r"(\S*)(\s*.*)$",
    ))
    .expect("static regex must compile")
});

static TOTAL_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^total \d+$").expect("static regex must compile"));

pub const DEFAULT_DATE_FORMAT: &str = "MMM d yyyy";
pub const DEFAULT_RECENT_DATE_FORMAT: &str = "MMM d HH:mm";
pub const NUMERIC_DATE_FORMAT: &str = "yyyy-MM-dd HH:mm";

pub struct UnixParser {
    timestamps: TimestampParser,
}

impl UnixParser {
    pub fn default_config() -> DialectConfig {
        DialectConfig::with_formats(SystemType::Unix, DEFAULT_DATE_FORMAT, Some(DEFAULT_RECENT_DATE_FORMAT))
    }

    /// For servers that print `2001-11-09 20:06` instead of month names.
    pub fn numeric_date_config() -> DialectConfig {
        DialectConfig::with_formats(SystemType::Unix, NUMERIC_DATE_FORMAT, None)
    }

    pub fn new(timestamps: TimestampParser) -> Self {
        Self { timestamps }
    }
}

impl FromConfig for UnixParser {
    fn from_config(config: Option<&DialectConfig>) -> Result<Self, ConfigError> {
        TimestampParser::configured(config, Self::default_config()).map(Self::new)
    }
}

impl EntryParser for UnixParser {
    fn parse_line(&self, line: &str) -> Option<Entry> {
        let caps = UNIX_LINE.captures(line)?;

        let type_char = caps[1].chars().next()?;
        let (kind, is_device) = match type_char {
            'd' => (EntryKind::Directory, false),
            // `e` is a z/OS external link
            'l' | 'e' => (EntryKind::SymbolicLink, false),
            'b' | 'c' => (EntryKind::File, true),
            'f' | '-' => (EntryKind::File, false),
            _ => (EntryKind::Unknown, false),
        };

        let mut entry = Entry::new(line, kind);
        entry.permissions = permission_triplets(&caps, 4);
        if !is_device {
            entry.hard_link_count = caps[15].parse().ok();
        }
        entry.owner = caps.get(16).map(|m| m.as_str().to_string());
        entry.group = caps.get(17).map(|m| m.as_str().to_string());
        entry.size = caps[18].parse().ok();

        let date = format!("{} {}", &caps[19], &caps[20]);
        entry.timestamp = self.timestamps.parse(&date).ok();

        set_name_and_target(&mut entry, &caps[21], caps.get(22).map(|m| m.as_str()));
        Some(entry)
    }

    fn pre_process(&mut self, lines: Vec<String>) -> Vec<String> {
        strip_total_lines(lines)
    }

    fn name(&self) -> &'static str {
        "unix"
    }
}

/// Decode three `rwx` triplets starting at capture group `first`.
///
/// Read and write are set for anything but `-`. Execute is set for lowercase
/// markers only: `S`, `T` and `L` mean the plain execute bit is off.
pub(crate) fn permission_triplets(caps: &Captures<'_>, first: usize) -> Permissions {
    let mut perms = Permissions::default();
    for (i, access) in Access::ALL.into_iter().enumerate() {
        let group = first + i * 4;
        let flag = |offset: usize| caps.get(group + offset).map_or("-", |m| m.as_str());

        perms.set(access, Permission::Read, flag(0) != "-");
        perms.set(access, Permission::Write, flag(1) != "-");
        let exec = flag(2);
        let executable = exec != "-" && !exec.starts_with(|c: char| c.is_uppercase());
        perms.set(access, Permission::Execute, executable);
    }
    perms
}

/// Join the name with its tail and split symlinks at the first ` -> `.
pub(crate) fn set_name_and_target(entry: &mut Entry, name: &str, tail: Option<&str>) {
    let full = match tail {
        Some(tail) => format!("{name}{tail}"),
        None => name.to_string(),
    };
    if entry.kind == EntryKind::SymbolicLink {
        if let Some((link, target)) = full.split_once(" -> ") {
            entry.name = link.to_string();
            entry.link_target = Some(target.to_string());
            return;
        }
    }
    entry.name = full;
}

pub(crate) fn strip_total_lines(lines: Vec<String>) -> Vec<String> {
    let before = lines.len();
    let kept: Vec<String> = lines.into_iter().filter(|line| !TOTAL_LINE.is_match(line)).collect();
    if kept.len() != before {
        tracing::trace!(removed = before - kept.len(), "dropped total lines");
    }
    kept
}
