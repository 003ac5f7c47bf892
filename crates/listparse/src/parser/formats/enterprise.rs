use std::sync::LazyLock;

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc};
use regex::{Captures, Regex};

use crate::conf::{ConfigError, DialectConfig};
use crate::parser::model::{Entry, EntryKind};
use crate::parser::timestamp::{ServerZone, Timestamp};
use crate::parser::traits::{EntryParser, FromConfig};

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Stratus/Enterprise Unix listing.
///
/// Groups: 14 owner, 15 group, 16 size, 17 month, 18 day, 20 year,
/// 21 hour, 22 minute, 23 name.
static ENTERPRISE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^(([\-]|[A-Z])([\-]|[A-Z])([\-]|[A-Z])([\-]|[A-Z])([\-]|[A-Z])",
        r"([\-]|[A-Z])([\-]|[A-Z])([\-]|[A-Z])([\-]|[A-Z])([\-]|[A-Z]))",
        r"(\S*)\s*",
        r"(\S+)\s*",
        r"(\S*)\s*",
        r"(\d*)\s*",
        r"(\d*)\s*",
        r"(Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec)\s*",
        r"((?:[012]\d*)|(?:3[01]))\s*",
        r"((\d\d\d\d)|((?:[01]\d)|(?:2[0123])):([012345]\d))\s",
        r"(\S*)(\s*.*)$",
    ))
    .expect("static regex must compile")
});

/// Dates are month/day plus either a year or `HH:mm`; there is no
/// configurable pattern, only the zone.
pub struct EnterpriseUnixParser {
    zone: ServerZone,
}

impl FromConfig for EnterpriseUnixParser {
    fn from_config(config: Option<&DialectConfig>) -> Result<Self, ConfigError> {
        let zone = match config {
            Some(config) => config.server_zone()?,
            None => ServerZone::Local,
        };
        Ok(Self { zone })
    }
}

impl EnterpriseUnixParser {
    fn parse_at(&self, line: &str, now: DateTime<Utc>) -> Option<Entry> {
        let caps = ENTERPRISE_LINE.captures(line)?;

        let mut entry = Entry::new(line, EntryKind::File);
        entry.owner = Some(caps[14].to_string());
        entry.group = Some(caps[15].to_string());
        entry.size = caps[16].parse().ok();
        entry.timestamp = self.timestamp(&caps, now);
        entry.name = caps[23].to_string();
        Some(entry)
    }

    /// With a year the time is midnight. Without one the entry is recent:
    /// this year, or last year when the month is still ahead of now.
    fn timestamp(&self, caps: &Captures<'_>, now: DateTime<Utc>) -> Option<Timestamp> {
        let month = MONTHS.iter().position(|m| *m == &caps[17])? as u32 + 1;
        let day: u32 = caps[18].parse().ok()?;

        let (year, time) = match caps.get(20) {
            Some(year) => (year.as_str().parse().ok()?, NaiveTime::MIN),
            None => {
                let today = self.zone.local_time(now);
                let year = if month > today.month() { today.year() - 1 } else { today.year() };
                let hour = caps.get(21)?.as_str().parse().ok()?;
                let minute = caps.get(22)?.as_str().parse().ok()?;
                (year, NaiveTime::from_hms_opt(hour, minute, 0)?)
            }
        };

        let date = NaiveDate::from_ymd_opt(year, month, day)?;
        self.zone.localize(date.and_time(time))
    }
}

impl EntryParser for EnterpriseUnixParser {
    fn parse_line(&self, line: &str) -> Option<Entry> {
        self.parse_at(line, Utc::now())
    }

    fn name(&self) -> &'static str {
        "enterprise_unix"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};
    use crate::conf::SystemType;

    fn parser() -> EnterpriseUnixParser {
        let config = DialectConfig::new(SystemType::Unix).with_timezone("UTC");
        EnterpriseUnixParser::from_config(Some(&config)).unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_recent_entry_this_year() {
        let entry = parser()
            .parse_at("-C--E-----FTP B QUA1I1      18128       41 Aug 12 13:56 QUADTEST", now())
            .unwrap();
        assert!(entry.is_file());
        assert_eq!(entry.name, "QUADTEST");
        assert_eq!(entry.owner.as_deref(), Some("QUA1I1"));
        assert_eq!(entry.group.as_deref(), Some("18128"));
        assert_eq!(entry.size, Some(41));

        // August is after June, so last year
        let ts = entry.timestamp.unwrap();
        assert_eq!((ts.year(), ts.month(), ts.day()), (2023, 8, 12));
        assert_eq!((ts.hour(), ts.minute()), (13, 56));
    }

    #[test]
    fn test_recent_entry_earlier_month() {
        let entry = parser()
            .parse_at("-C--E-----FTP B QUA1I1      18128       41 Mar 12 13:56 QUADTEST", now())
            .unwrap();
        assert_eq!(entry.timestamp.unwrap().year(), 2024);
    }

    #[test]
    fn test_entry_with_year() {
        let entry = parser()
            .parse_at("-C--E-----FTP A QUA0I1      18128       41 Oct 29 1998 QUADTEST2", now())
            .unwrap();
        let ts = entry.timestamp.unwrap();
        assert_eq!((ts.year(), ts.month(), ts.day()), (1998, 10, 29));
        assert_eq!((ts.hour(), ts.minute()), (0, 0));
        assert_eq!(entry.name, "QUADTEST2");
    }

    #[test]
    fn test_invalid_day_leaves_timestamp_empty() {
        let entry = parser()
            .parse_at("-C--E-----FTP A QUA0I1      18128       41 Feb 30 1998 BADDAY", now())
            .unwrap();
        assert_eq!(entry.timestamp, None);
        assert_eq!(entry.name, "BADDAY");
    }

    #[test]
    fn test_lowercase_prefix_does_not_match() {
        assert!(parser().parse_line("-rw-r--r--   1 user  group  41 Aug 12 13:56 x").is_none());
    }
}
