use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::parser::datefmt::DatePattern;
use crate::parser::months::MonthNames;
use crate::parser::timestamp::ServerZone;

/// Remote operating system family, as reported by `SYST` or chosen by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SystemType {
    Unix,
    WindowsNt,
    Os2,
    Os400,
    As400,
    Vms,
    Mvs,
    Netware,
    /// "MACOS Peter's Server"
    Macos,
    /// `TYPE: L8`, usually a Unix host
    L8,
}

impl SystemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SystemType::Unix => "UNIX",
            SystemType::WindowsNt => "WINDOWS_NT",
            SystemType::Os2 => "OS2",
            SystemType::Os400 => "OS400",
            SystemType::As400 => "AS400",
            SystemType::Vms => "VMS",
            SystemType::Mvs => "MVS",
            SystemType::Netware => "NETWARE",
            SystemType::Macos => "MACOS",
            SystemType::L8 => "L8",
        }
    }

    /// Substrings that identify this system inside an upper-cased key or `SYST` banner.
    pub fn banner_tokens(&self) -> &'static [&'static str] {
        match self {
            SystemType::Unix => &["UNIX"],
            SystemType::WindowsNt => &["WINDOWS"],
            SystemType::Os2 => &["OS/2", "OS2"],
            SystemType::Os400 => &["OS/400", "OS400"],
            SystemType::As400 => &["AS/400", "AS400"],
            SystemType::Vms => &["VMS"],
            SystemType::Mvs => &["MVS"],
            SystemType::Netware => &["NETWARE"],
            SystemType::Macos => &["MACOS PETER", "MACOS"],
            SystemType::L8 => &["TYPE: L8", "L8"],
        }
    }

    /// Find the system named by `key`, testing tokens in fixed priority order.
    ///
    /// `L8` is checked last: it shows up inside banners of hosts that are not Unix.
    pub fn detect(key: &str) -> Option<SystemType> {
        const ORDER: [SystemType; 10] = [
            SystemType::Unix,
            SystemType::Vms,
            SystemType::WindowsNt,
            SystemType::Os2,
            SystemType::Os400,
            SystemType::As400,
            SystemType::Mvs,
            SystemType::Netware,
            SystemType::Macos,
            SystemType::L8,
        ];

        let upper = key.to_uppercase();
        ORDER
            .into_iter()
            .find(|system| system.banner_tokens().iter().any(|token| upper.contains(token)))
    }
}

impl std::fmt::Display for SystemType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("default date format is required")]
    MissingDefaultFormat,

    #[error("default date format {0:?} has no year field")]
    DefaultFormatWithoutYear(String),

    #[error("invalid date pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("expected 12 pipe-delimited month names, got {0}")]
    MonthNames(usize),

    #[error("unknown time zone: {0}")]
    TimeZone(String),

    #[error("invalid TOML configuration: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Per-dialect parsing configuration.
///
/// Unset date formats are filled from the selected grammar's defaults when
/// the grammar is built, so a config only needs to name what differs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DialectConfig {
    pub system: SystemType,
    /// Pattern for dates that carry a year, e.g. `MMM d yyyy`
    pub default_date_format: Option<String>,
    /// Pattern for year-less dates of recently modified files, e.g. `MMM d HH:mm`
    pub recent_date_format: Option<String>,
    /// Two-letter language code selecting a month-name table
    pub server_language: Option<String>,
    /// Explicit `jan|feb|...|dec` table; wins over `server_language`
    pub short_month_names: Option<String>,
    /// IANA zone, `UTC`/`GMT`, or a fixed offset like `+05:30`; local zone when unset
    pub server_timezone: Option<String>,
    /// Treat dates up to one day in the future as this year's
    pub lenient_future_dates: bool,
}

impl Default for DialectConfig {
    fn default() -> Self {
        Self::new(SystemType::Unix)
    }
}

impl DialectConfig {
    pub fn new(system: SystemType) -> Self {
        Self {
            system,
            default_date_format: None,
            recent_date_format: None,
            server_language: None,
            short_month_names: None,
            server_timezone: None,
            lenient_future_dates: false,
        }
    }

    pub fn with_formats(system: SystemType, default_format: &str, recent_format: Option<&str>) -> Self {
        Self {
            default_date_format: Some(default_format.to_string()),
            recent_date_format: recent_format.map(str::to_string),
            ..Self::new(system)
        }
    }

    pub fn with_timezone(mut self, zone: &str) -> Self {
        self.server_timezone = Some(zone.to_string());
        self
    }

    pub fn with_language(mut self, code: &str) -> Self {
        self.server_language = Some(code.to_string());
        self
    }

    pub fn with_short_month_names(mut self, months: &str) -> Self {
        self.short_month_names = Some(months.to_string());
        self
    }

    pub fn with_lenient_future_dates(mut self, lenient: bool) -> Self {
        self.lenient_future_dates = lenient;
        self
    }

    /// Fill unset date formats from a grammar's default configuration.
    pub fn merged_with(&self, defaults: &DialectConfig) -> DialectConfig {
        let mut merged = self.clone();
        if merged.default_date_format.is_none() {
            merged.default_date_format = defaults.default_date_format.clone();
        }
        if merged.recent_date_format.is_none() {
            merged.recent_date_format = defaults.recent_date_format.clone();
        }
        merged
    }

    /// Resolve the month-name table: explicit table, then language, then English.
    pub fn month_names(&self) -> Result<MonthNames, ConfigError> {
        match (&self.short_month_names, &self.server_language) {
            (Some(table), _) => MonthNames::from_pipe_list(table),
            (None, Some(code)) => Ok(MonthNames::for_language(code)),
            (None, None) => Ok(MonthNames::english()),
        }
    }

    pub fn server_zone(&self) -> Result<ServerZone, ConfigError> {
        match &self.server_timezone {
            Some(id) => ServerZone::parse(id),
            None => Ok(ServerZone::Local),
        }
    }

    /// Check every field that can be malformed. A missing default format is
    /// only an error once the config is used without grammar defaults.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(pattern) = &self.default_date_format {
            if !DatePattern::compile(pattern)?.has_year() {
                return Err(ConfigError::DefaultFormatWithoutYear(pattern.clone()));
            }
        }
        if let Some(pattern) = &self.recent_date_format {
            DatePattern::compile(pattern)?;
        }
        self.month_names()?;
        self.server_zone()?;
        Ok(())
    }
}
