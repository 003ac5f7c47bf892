//! OpenVMS `DIRECTORY/FULL`-style listings.
//!
//! A record can wrap over several physical lines, so this grammar supplies
//! its own [`EntryParser::read_entries`].

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::conf::{ConfigError, DialectConfig, SystemType};
use crate::parser::model::{Access, Entry, EntryKind, Permission};
use crate::parser::timestamp::TimestampParser;
use crate::parser::traits::{EntryParser, FromConfig};

/// Groups: 1 name;version, 2 blocks used, 3 date, 4 time, 5 owner spec,
/// 9-11 owner/group/world rights.
static VMS_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^(.*;[0-9]+)\s*",
        r"(\d+)/\d+\s*",
        r"(\S+)\s+(\S+)\s+",
        r"\[(([0-9$A-Za-z_]+)|([0-9$A-Za-z_]+),([0-9$a-zA-Z_]+))\]?\s*",
        r"\([a-zA-Z]*,([a-zA-Z]*),([a-zA-Z]*),([a-zA-Z]*)\)$",
    ))
    .expect("static regex must compile")
});

static VERSIONED_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.*);([0-9]+)\s*.*$").expect("static regex must compile"));

pub const DEFAULT_DATE_FORMAT: &str = "d-MMM-yyyy HH:mm:ss";

const BLOCK_SIZE: u64 = 512;

pub struct VmsParser {
    timestamps: TimestampParser,
    /// Keep the `;version` suffix in entry names
    versioning: bool,
}

impl VmsParser {
    pub fn default_config() -> DialectConfig {
        DialectConfig::with_formats(SystemType::Vms, DEFAULT_DATE_FORMAT, None)
    }

    fn configured(config: Option<&DialectConfig>, versioning: bool) -> Result<Self, ConfigError> {
        let timestamps = TimestampParser::configured(config, Self::default_config())?;
        Ok(Self { timestamps, versioning })
    }
}

impl FromConfig for VmsParser {
    fn from_config(config: Option<&DialectConfig>) -> Result<Self, ConfigError> {
        Self::configured(config, false)
    }
}

impl EntryParser for VmsParser {
    fn parse_line(&self, line: &str) -> Option<Entry> {
        let caps = VMS_LINE.captures(line.trim())?;

        let timestamp = match self.timestamps.parse(&format!("{} {}", &caps[3], &caps[4])) {
            Ok(ts) => ts,
            Err(err) => {
                tracing::trace!(error = %err, "dropping VMS record with unparseable date");
                return None;
            }
        };

        let versioned_name = &caps[1];
        let bare_name = versioned_name
            .rfind(';')
            .map_or(versioned_name, |pos| &versioned_name[..pos]);
        let kind = if bare_name.ends_with(".DIR") {
            EntryKind::Directory
        } else {
            EntryKind::File
        };

        let mut entry = Entry::new(line, kind);
        entry.name = if self.versioning { versioned_name } else { bare_name }.to_string();
        entry.size = caps[2].parse::<u64>().ok().and_then(|blocks| blocks.checked_mul(BLOCK_SIZE));
        entry.timestamp = Some(timestamp);

        // [GROUP,OWNER] or [OWNER]
        let owner_spec: Vec<&str> = caps[5].split(',').filter(|t| !t.is_empty()).collect();
        match owner_spec.as_slice() {
            [owner] => entry.owner = Some(owner.to_string()),
            [group, owner] => {
                entry.group = Some(group.to_string());
                entry.owner = Some(owner.to_string());
            }
            _ => {}
        }

        for (access, group) in Access::ALL.into_iter().zip(9..) {
            let rights = caps.get(group).map_or("", |m| m.as_str());
            entry.permissions.set(access, Permission::Read, rights.contains('R'));
            entry.permissions.set(access, Permission::Write, rights.contains('W'));
            entry.permissions.set(access, Permission::Execute, rights.contains('E'));
        }

        Some(entry)
    }

    /// Join wrapped records. A record ends with the line whose trimmed text
    /// ends in `)`; `Directory` and `Total` lines are skipped.
    fn read_entries(&self, raw: &str) -> Vec<String> {
        let mut records = Vec::new();
        let mut buffer = String::new();
        for line in raw.lines() {
            if line.starts_with("Directory") || line.starts_with("Total") {
                continue;
            }
            buffer.push_str(line);
            if line.trim().ends_with(')') {
                records.push(std::mem::take(&mut buffer));
            }
        }
        if !buffer.is_empty() {
            records.push(buffer);
        }
        records
    }

    fn name(&self) -> &'static str {
        "vms"
    }
}

/// VMS grammar that keeps only the highest `;version` of each file and
/// reports names with their version suffix.
pub struct VmsVersioningParser {
    inner: VmsParser,
}

impl FromConfig for VmsVersioningParser {
    fn from_config(config: Option<&DialectConfig>) -> Result<Self, ConfigError> {
        Ok(Self {
            inner: VmsParser::configured(config, true)?,
        })
    }
}

impl EntryParser for VmsVersioningParser {
    fn parse_line(&self, line: &str) -> Option<Entry> {
        self.inner.parse_line(line)
    }

    fn pre_process(&mut self, lines: Vec<String>) -> Vec<String> {
        keep_highest_versions(lines)
    }

    fn read_entries(&self, raw: &str) -> Vec<String> {
        self.inner.read_entries(raw)
    }

    fn name(&self) -> &'static str {
        "vms_versioning"
    }
}

fn split_version(line: &str) -> Option<(&str, u64)> {
    let caps = VERSIONED_NAME.captures(line.trim())?;
    let name = caps.get(1)?.as_str();
    let version = caps.get(2)?.as_str().parse().ok()?;
    Some((name, version))
}

/// Remove every record whose version is lower than the highest seen for its name.
///
/// The forward pass drops older versions listed after a newer one and
/// records the maximum. The second pass drops older versions listed before it.
fn keep_highest_versions(lines: Vec<String>) -> Vec<String> {
    let before = lines.len();
    let mut highest: HashMap<String, u64> = HashMap::new();

    let mut kept = Vec::with_capacity(lines.len());
    for line in lines {
        if let Some((name, version)) = split_version(&line) {
            if highest.get(name).is_some_and(|&max| version < max) {
                continue;
            }
            highest.insert(name.to_string(), version);
        }
        kept.push(line);
    }

    kept.retain(|line| match split_version(line) {
        Some((name, version)) => !highest.get(name).is_some_and(|&max| version < max),
        None => true,
    });

    if kept.len() != before {
        tracing::debug!(removed = before - kept.len(), "dropped superseded VMS file versions");
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    fn config() -> DialectConfig {
        DialectConfig::new(SystemType::Vms).with_timezone("UTC")
    }

    fn parser() -> VmsParser {
        VmsParser::from_config(Some(&config())).unwrap()
    }

    #[test]
    fn test_file_record() {
        let entry = parser()
            .parse_line("1-JUN.LIS;1              9/9           2-JUN-1998 07:32:04  [GROUP,OWNER]    (RWED,RWED,RW,R)")
            .unwrap();
        assert!(entry.is_file());
        assert_eq!(entry.name, "1-JUN.LIS");
        assert_eq!(entry.size, Some(9 * 512));
        assert_eq!(entry.group.as_deref(), Some("GROUP"));
        assert_eq!(entry.owner.as_deref(), Some("OWNER"));

        let ts = entry.timestamp.unwrap();
        assert_eq!((ts.year(), ts.month(), ts.day()), (1998, 6, 2));
        assert_eq!((ts.hour(), ts.minute(), ts.second()), (7, 32, 4));

        assert!(entry.has_permission(Access::Owner, Permission::Execute));
        assert!(entry.has_permission(Access::Group, Permission::Write));
        assert!(!entry.has_permission(Access::Group, Permission::Execute));
        assert!(entry.has_permission(Access::World, Permission::Read));
        assert!(!entry.has_permission(Access::World, Permission::Write));
    }

    #[test]
    fn test_directory_record_with_single_owner() {
        let entry = parser()
            .parse_line("DATA.DIR;1                1/9           2-JUN-1998 07:32:04  [TRANSLATED]    (RWED,RWED,RWED,RE)")
            .unwrap();
        assert!(entry.is_directory());
        assert_eq!(entry.name, "DATA.DIR");
        assert_eq!(entry.owner.as_deref(), Some("TRANSLATED"));
        assert_eq!(entry.group, None);
    }

    #[test]
    fn test_unparseable_date_drops_record() {
        assert!(parser()
            .parse_line("X.LIS;1   9/9   someday 07:32:04  [GROUP,OWNER]    (RWED,RWED,RW,R)")
            .is_none());
    }

    #[test]
    fn test_read_entries_joins_wrapped_records() {
        let raw = "Directory USER1:[TEMP]\n\
                   \n\
                   A_VERY_LONG_FILE_NAME.TXT;2\n\
                   \x20                   9/9           2-JUN-1998 07:32:04  [GROUP,OWNER]    (RWED,RWED,RW,R)\n\
                   B.TXT;1   1/9   2-JUN-1998 07:32:04  [GROUP,OWNER]    (RWED,RWED,RW,R)\n\
                   \n\
                   Total of 2 files, 10/18 blocks.";
        let records = parser().read_entries(raw);
        assert_eq!(records.len(), 2);
        assert!(records[0].starts_with("A_VERY_LONG_FILE_NAME.TXT;2"));

        let entry = parser().parse_line(&records[0]).unwrap();
        assert_eq!(entry.name, "A_VERY_LONG_FILE_NAME.TXT");
    }

    #[test]
    fn test_versioning_keeps_suffix() {
        let parser = VmsVersioningParser::from_config(Some(&config())).unwrap();
        let entry = parser
            .parse_line("1-JUN.LIS;3              9/9           2-JUN-1998 07:32:04  [GROUP,OWNER]    (RWED,RWED,RW,R)")
            .unwrap();
        assert_eq!(entry.name, "1-JUN.LIS;3");
    }

    #[test]
    fn test_versioning_keeps_highest_version_in_any_order() {
        let record = |name: &str| format!("{name}   9/9   2-JUN-1998 07:32:04  [GROUP,OWNER]    (RWED,RWED,RW,R)");
        let orders = [
            vec!["A.TXT;1", "A.TXT;3", "B.TXT;1", "A.TXT;2"],
            vec!["A.TXT;3", "A.TXT;2", "B.TXT;1", "A.TXT;1"],
            vec!["A.TXT;2", "B.TXT;1", "A.TXT;1", "A.TXT;3"],
        ];

        for order in orders {
            let mut parser = VmsVersioningParser::from_config(Some(&config())).unwrap();
            let lines = order.iter().map(|n| record(n)).collect();
            let kept = parser.pre_process(lines);
            assert_eq!(kept.len(), 2, "order {order:?}");
            assert!(kept.iter().any(|l| l.starts_with("A.TXT;3")));
            assert!(kept.iter().any(|l| l.starts_with("B.TXT;1")));
        }
    }

    #[test]
    fn test_version_dedup_is_idempotent() {
        let lines = vec!["A.TXT;1 x".to_string(), "A.TXT;2 x".to_string()];
        let once = keep_highest_versions(lines);
        assert_eq!(once, vec!["A.TXT;2 x".to_string()]);
        assert_eq!(keep_highest_versions(once.clone()), once);
    }
}
