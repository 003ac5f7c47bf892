//! Timestamp disambiguation for listing dates.
//!
//! Listings print either a full date (`Jan 15 2020`) or, for recently
//! modified files, a year-less one (`Jan 15 14:30`). [`TimestampParser`]
//! tries the recent format first and infers the year from "now", then falls
//! back to the full format.

use chrono::{DateTime, Datelike, Duration, FixedOffset, Local, NaiveDateTime, Offset, TimeZone, Utc};
use chrono_tz::Tz;

use super::datefmt::DatePattern;
use super::model::TimestampError;
use super::months::MonthNames;
use crate::conf::{ConfigError, DialectConfig};

/// Resolved absolute time of a listing entry, in the server's offset.
pub type Timestamp = DateTime<FixedOffset>;

/// Time zone the server prints its dates in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerZone {
    /// Zone of the host running the parser
    Local,
    Fixed(FixedOffset),
    Named(Tz),
}

impl ServerZone {
    /// Accepts `UTC`, `GMT`, `Z`, offsets (`+05:30`, `-0800`, `+02`) and IANA names.
    pub fn parse(id: &str) -> Result<Self, ConfigError> {
        let id = id.trim();
        if ["UTC", "GMT", "Z"].iter().any(|u| id.eq_ignore_ascii_case(u)) {
            return Ok(ServerZone::Fixed(Utc.fix()));
        }
        if let Some(offset) = parse_offset(id) {
            return Ok(ServerZone::Fixed(offset));
        }
        id.parse::<Tz>()
            .map(ServerZone::Named)
            .map_err(|_| ConfigError::TimeZone(id.to_string()))
    }

    /// Wall-clock time in this zone at instant `now`.
    pub fn local_time(&self, now: DateTime<Utc>) -> NaiveDateTime {
        match self {
            ServerZone::Local => now.with_timezone(&Local).naive_local(),
            ServerZone::Fixed(offset) => now.with_timezone(offset).naive_local(),
            ServerZone::Named(tz) => now.with_timezone(tz).naive_local(),
        }
    }

    /// Attach this zone to a wall-clock time.
    ///
    /// Ambiguous times (DST fall-back) take the earlier instant. Times inside
    /// a DST gap are shifted forward by one hour.
    pub fn localize(&self, naive: NaiveDateTime) -> Option<Timestamp> {
        self.localize_exact(naive)
            .or_else(|| self.localize_exact(naive + Duration::hours(1)))
    }

    fn localize_exact(&self, naive: NaiveDateTime) -> Option<Timestamp> {
        match self {
            ServerZone::Local => Local.from_local_datetime(&naive).earliest().map(|dt| dt.fixed_offset()),
            ServerZone::Fixed(offset) => offset.from_local_datetime(&naive).single(),
            ServerZone::Named(tz) => tz.from_local_datetime(&naive).earliest().map(|dt| dt.fixed_offset()),
        }
    }
}

fn parse_offset(id: &str) -> Option<FixedOffset> {
    let (sign, rest) = match id.as_bytes().first()? {
        b'+' => (1, &id[1..]),
        b'-' => (-1, &id[1..]),
        _ => return None,
    };
    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let (hours, minutes) = match digits.len() {
        2 => (digits.parse::<i32>().ok()?, 0),
        4 => (digits[..2].parse::<i32>().ok()?, digits[2..].parse::<i32>().ok()?),
        _ => return None,
    };
    if minutes >= 60 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

/// Compiled timestamp state for one dialect configuration.
#[derive(Debug, Clone)]
pub struct TimestampParser {
    default_format: DatePattern,
    recent_format: Option<DatePattern>,
    /// `recent_format` with ` yyyy` appended, for the leap-day retry
    recent_with_year: Option<DatePattern>,
    months: MonthNames,
    zone: ServerZone,
    lenient_future_dates: bool,
}

impl TimestampParser {
    pub fn new(config: &DialectConfig) -> Result<Self, ConfigError> {
        let default_format = config
            .default_date_format
            .as_deref()
            .ok_or(ConfigError::MissingDefaultFormat)
            .and_then(DatePattern::compile)?;
        if !default_format.has_year() {
            return Err(ConfigError::DefaultFormatWithoutYear(default_format.as_str().to_string()));
        }
        let recent_format = config
            .recent_date_format
            .as_deref()
            .map(DatePattern::compile)
            .transpose()?;
        let recent_with_year = recent_format.as_ref().map(DatePattern::with_year_suffix);

        Ok(Self {
            default_format,
            recent_format,
            recent_with_year,
            months: config.month_names()?,
            zone: config.server_zone()?,
            lenient_future_dates: config.lenient_future_dates,
        })
    }

    /// Build from an optional caller config, filling unset formats from `defaults`.
    pub fn configured(config: Option<&DialectConfig>, defaults: DialectConfig) -> Result<Self, ConfigError> {
        match config {
            Some(config) => Self::new(&config.merged_with(&defaults)),
            None => Self::new(&defaults),
        }
    }

    pub fn zone(&self) -> ServerZone {
        self.zone
    }

    pub fn parse(&self, text: &str) -> Result<Timestamp, TimestampError> {
        self.resolve(text, Utc::now())
    }

    /// Resolve `text` relative to the instant `now`.
    pub fn resolve(&self, text: &str, now: DateTime<Utc>) -> Result<Timestamp, TimestampError> {
        let mut server_now = self.zone.local_time(now);

        if let (Some(recent), Some(recent_with_year)) = (&self.recent_format, &self.recent_with_year) {
            if self.lenient_future_dates {
                server_now += Duration::days(1);
            }

            if let Some(parsed) = recent.parse(text, &self.months, server_now.year()) {
                if let Some(resolved) = self.assign_recent_year(parsed, server_now) {
                    return Ok(resolved);
                }
            }

            // Feb 29 is rejected against the 1970 placeholder year.
            let with_year = format!("{text} {}", server_now.year());
            if let Some(parsed) = recent_with_year.parse(&with_year, &self.months, server_now.year()) {
                if let Some(resolved) = self.zone.localize(parsed) {
                    return Ok(resolved);
                }
            }
        }

        self.default_format
            .parse(text, &self.months, server_now.year())
            .and_then(|parsed| self.zone.localize(parsed))
            .ok_or_else(|| TimestampError::Unparseable {
                text: text.to_string(),
            })
    }

    fn assign_recent_year(&self, parsed: NaiveDateTime, server_now: NaiveDateTime) -> Option<Timestamp> {
        let this_year = parsed.with_year(server_now.year())?;
        let naive = if this_year > server_now {
            parsed.with_year(server_now.year() - 1)?
        } else {
            this_year
        };
        self.zone.localize(naive)
    }
}
