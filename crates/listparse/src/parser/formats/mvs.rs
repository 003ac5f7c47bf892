//! z/OS (MVS) listings.
//!
//! One server answers `LIST` in five layouts depending on what was listed:
//! datasets, members of a partitioned dataset, a Unix System Services
//! directory, or the JES spool at interface level 1 or 2. The header line
//! identifies the layout, so [`MvsParser`] decides its mode in `pre_process`.

use std::sync::LazyLock;

use regex::Regex;

use super::unix::UnixParser;
use crate::conf::{ConfigError, DialectConfig, SystemType};
use crate::parser::model::{Entry, EntryKind};
use crate::parser::timestamp::TimestampParser;
use crate::parser::traits::{EntryParser, FromConfig};

/// Volume Unit Referred Ext Used Recfm Lrecl BlkSz Dsorg Dsname
static FILE_LIST_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\S+\s+\S+\s+\S+\s+\S+\s+\S+\s+[FV]\S*\s+\S+\s+\S+\s+(PS|PO|PO-E)\s+(\S+)\s*$")
        .expect("static regex must compile")
});

/// Name VV.MM Created Changed Size Init Mod Id
static MEMBER_LIST_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\S+)\s+\S+\s+\S+\s+(\S+)\s+(\S+)\s+\S+\s+\S+\s+\S+\s+\S+\s*$").expect("static regex must compile")
});

/// JOBNAME JOBID STATUS nn Spool Files
static JES_LEVEL_1_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\S+)\s+(\S+)\s+(\S+)\s+(\S+)\s+(\S+)\s+(\S+)\s*$").expect("static regex must compile")
});

/// JOBNAME JOBID OWNER STATUS CLASS ...
static JES_LEVEL_2_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\S+)\s+(\S+)\s+(\S+)\s+(\S+)\s+(\S+)\s+(\S+).*$").expect("static regex must compile")
});

pub const DEFAULT_DATE_FORMAT: &str = "yyyy/MM/dd HH:mm";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MvsListing {
    Unknown,
    FileList,
    MemberList,
    Unix,
    JesLevel1,
    JesLevel2,
}

impl MvsListing {
    /// Classify a listing by its header line.
    pub fn sniff(header: &str) -> MvsListing {
        if header.contains("Volume") && header.contains("Dsname") {
            MvsListing::FileList
        } else if header.contains("Name") && header.contains("Id") {
            MvsListing::MemberList
        } else if header.starts_with("total") {
            MvsListing::Unix
        } else if header.find("Spool Files").is_some_and(|pos| pos >= 30) {
            MvsListing::JesLevel1
        } else if header.starts_with("JOBNAME") && header.find("JOBID").is_some_and(|pos| pos > 8) {
            MvsListing::JesLevel2
        } else {
            MvsListing::Unknown
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MvsListing::Unknown => "unknown",
            MvsListing::FileList => "file_list",
            MvsListing::MemberList => "member_list",
            MvsListing::Unix => "unix",
            MvsListing::JesLevel1 => "jes_level_1",
            MvsListing::JesLevel2 => "jes_level_2",
        }
    }
}

pub struct MvsParser {
    /// `None` until a header has been seen
    mode: Option<MvsListing>,
    /// Records returned by the last `pre_process` call
    processed: Vec<String>,
    timestamps: TimestampParser,
    unix: UnixParser,
}

impl MvsParser {
    pub fn default_config() -> DialectConfig {
        DialectConfig::with_formats(SystemType::Mvs, DEFAULT_DATE_FORMAT, None)
    }

    pub fn mode(&self) -> Option<MvsListing> {
        self.mode
    }

    fn parse_file_list(line: &str) -> Option<Entry> {
        let caps = FILE_LIST_LINE.captures(line)?;
        let kind = match &caps[1] {
            "PS" => EntryKind::File,
            "PO" | "PO-E" => EntryKind::Directory,
            _ => return None,
        };
        let mut entry = Entry::new(line, kind);
        entry.name = caps[2].to_string();
        Some(entry)
    }

    fn parse_member_list(&self, line: &str) -> Option<Entry> {
        let caps = MEMBER_LIST_LINE.captures(line)?;
        let timestamp = self.timestamps.parse(&format!("{} {}", &caps[2], &caps[3])).ok()?;
        let mut entry = Entry::new(line, EntryKind::File);
        entry.name = caps[1].to_string();
        entry.timestamp = Some(timestamp);
        Some(entry)
    }

    /// Best effort: the first space-separated token is the member name.
    fn parse_simple_entry(line: &str) -> Option<Entry> {
        if line.is_empty() {
            return None;
        }
        let mut entry = Entry::new(line, EntryKind::File);
        entry.name = line.split(' ').next().unwrap_or_default().to_string();
        Some(entry)
    }

    /// Spool entries are named by job id and kept only when their output is ready.
    fn parse_jes(line: &str, pattern: &Regex, status_group: usize) -> Option<Entry> {
        let caps = pattern.captures(line)?;
        if !caps[status_group].eq_ignore_ascii_case("OUTPUT") {
            return None;
        }
        let mut entry = Entry::new(line, EntryKind::File);
        entry.name = caps[2].to_string();
        Some(entry)
    }
}

impl FromConfig for MvsParser {
    fn from_config(config: Option<&DialectConfig>) -> Result<Self, ConfigError> {
        let timestamps = TimestampParser::configured(config, Self::default_config())?;
        // USS directories use Unix date formats with the caller's zone and months.
        let unix_config = config.map(|config| DialectConfig {
            system: SystemType::Unix,
            default_date_format: None,
            recent_date_format: None,
            ..config.clone()
        });
        Ok(Self {
            mode: None,
            processed: Vec::new(),
            timestamps,
            unix: UnixParser::from_config(unix_config.as_ref())?,
        })
    }
}

impl EntryParser for MvsParser {
    fn parse_line(&self, line: &str) -> Option<Entry> {
        match self.mode? {
            MvsListing::FileList => Self::parse_file_list(line),
            MvsListing::MemberList => self
                .parse_member_list(line)
                .or_else(|| Self::parse_simple_entry(line)),
            MvsListing::Unix => self.unix.parse_line(line),
            MvsListing::JesLevel1 => Self::parse_jes(line, &JES_LEVEL_1_LINE, 3),
            MvsListing::JesLevel2 => Self::parse_jes(line, &JES_LEVEL_2_LINE, 4),
            MvsListing::Unknown => None,
        }
    }

    /// Pick the mode from the header and drop the header, except for JES
    /// level 1 whose first line is itself a job.
    /// The output of the previous call is passed through unchanged; any
    /// other input is a new listing and its header is checked again.
    fn pre_process(&mut self, mut lines: Vec<String>) -> Vec<String> {
        if self.mode.is_some() && lines == self.processed {
            return lines;
        }
        let Some(header) = lines.first() else {
            return lines;
        };

        let detected = MvsListing::sniff(header);
        tracing::debug!(mode = detected.as_str(), "detected MVS listing layout");
        self.mode = Some(detected);
        if detected != MvsListing::JesLevel1 {
            lines.remove(0);
        }
        self.processed = lines.clone();
        lines
    }

    fn name(&self) -> &'static str {
        "mvs"
    }
}
