//! Machine-readable listings (`MLSD`/`MLST`, RFC 3659).
//!
//! `type=file;size=1024;modify=20100313224553; name with spaces.txt`

use chrono::{FixedOffset, TimeZone};

use crate::conf::{ConfigError, DialectConfig};
use crate::parser::datefmt::DatePattern;
use crate::parser::model::{Access, Entry, EntryKind, Permission};
use crate::parser::months::MonthNames;
use crate::parser::timestamp::Timestamp;
use crate::parser::traits::{EntryParser, FromConfig};

const MODIFY_FORMAT: &str = "yyyyMMddHHmmss";
const MODIFY_FORMAT_MILLIS: &str = "yyyyMMddHHmmss.SSS";

/// Facts carry their own fixed formats, so configuration is ignored.
pub struct MlsxParser {
    modify: DatePattern,
    modify_millis: DatePattern,
    months: MonthNames,
}

impl MlsxParser {
    pub fn new() -> Result<Self, ConfigError> {
        Ok(Self {
            modify: DatePattern::compile(MODIFY_FORMAT)?,
            modify_millis: DatePattern::compile(MODIFY_FORMAT_MILLIS)?,
            months: MonthNames::english(),
        })
    }

    /// `modify` values are always UTC.
    fn parse_modify(&self, value: &str) -> Option<Timestamp> {
        let pattern = if value.contains('.') { &self.modify_millis } else { &self.modify };
        let naive = pattern.parse(value, &self.months, 1970)?;
        FixedOffset::east_opt(0)?.from_local_datetime(&naive).single()
    }
}

impl FromConfig for MlsxParser {
    fn from_config(_config: Option<&DialectConfig>) -> Result<Self, ConfigError> {
        Self::new()
    }
}

impl EntryParser for MlsxParser {
    fn parse_line(&self, line: &str) -> Option<Entry> {
        let (facts, name) = line.split_once(' ')?;

        let mut entry = Entry::new(line, EntryKind::Unknown);
        entry.name = name.to_string();

        let facts: Vec<(String, &str)> = facts
            .split(';')
            .filter_map(|fact| fact.split_once('='))
            .filter(|(_, value)| !value.is_empty() && !value.contains('='))
            .map(|(key, value)| (key.to_ascii_lowercase(), value))
            .collect();
        let has_unix_mode = facts.iter().any(|(key, _)| key == "unix.mode");

        for (key, value) in &facts {
            match key.as_str() {
                "size" | "sizd" => entry.size = value.parse().ok(),
                "modify" => entry.timestamp = self.parse_modify(value),
                "type" => entry.kind = fact_kind(value),
                "unix.group" => entry.group = Some(value.to_string()),
                "unix.owner" => entry.owner = Some(value.to_string()),
                "unix.mode" => apply_unix_mode(&mut entry, value),
                "perm" if !has_unix_mode => apply_perm_flags(&mut entry, value),
                _ => {}
            }
        }

        Some(entry)
    }

    fn name(&self) -> &'static str {
        "mlsx"
    }
}

fn fact_kind(value: &str) -> EntryKind {
    match value.to_ascii_lowercase().as_str() {
        "file" => EntryKind::File,
        // listed dir, parent dir, subdirectory
        "cdir" | "pdir" | "dir" => EntryKind::Directory,
        _ => EntryKind::Unknown,
    }
}

/// Last three octal digits, e.g. `0755` or `100644`. Non-octal digits are skipped.
fn apply_unix_mode(entry: &mut Entry, mode: &str) {
    let Some(digits) = mode.len().checked_sub(3).and_then(|start| mode.get(start..)) else {
        return;
    };
    for (access, digit) in Access::ALL.into_iter().zip(digits.bytes()) {
        if (b'0'..=b'7').contains(&digit) {
            entry.permissions.set_octal(access, digit - b'0');
        }
    }
}

/// Approximate `perm` flags as owner rights. This is a guess at intent,
/// not a Unix mode.
fn apply_perm_flags(entry: &mut Entry, flags: &str) {
    for flag in flags.chars().map(|c| c.to_ascii_lowercase()) {
        let perm = match flag {
            // append, create, delete, mkdir, purge, store
            'a' | 'c' | 'd' | 'm' | 'p' | 'w' => Permission::Write,
            // enter, retrieve
            'e' | 'r' => Permission::Read,
            // list
            'l' => Permission::Execute,
            _ => continue,
        };
        entry.permissions.set(Access::Owner, perm, true);
    }
}
