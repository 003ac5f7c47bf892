use super::model::Entry;
use super::traits::EntryParser;

/// Tries each grammar in order and returns the first match.
///
/// Used where one system token covers more than one layout, e.g. NT servers
/// that emit Unix-style lines.
pub struct CompositeParser {
    parsers: Vec<Box<dyn EntryParser>>,
}

impl CompositeParser {
    pub fn new(parsers: Vec<Box<dyn EntryParser>>) -> Self {
        Self { parsers }
    }

    pub fn len(&self) -> usize {
        self.parsers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parsers.is_empty()
    }

    /// Names of the wrapped grammars, in trial order.
    pub fn parser_names(&self) -> Vec<&'static str> {
        self.parsers.iter().map(|p| p.name()).collect()
    }
}

impl EntryParser for CompositeParser {
    fn parse_line(&self, line: &str) -> Option<Entry> {
        self.parsers.iter().find_map(|parser| parser.parse_line(line))
    }

    /// Runs every member's pre-processing in order.
    fn pre_process(&mut self, lines: Vec<String>) -> Vec<String> {
        self.parsers
            .iter_mut()
            .fold(lines, |lines, parser| parser.pre_process(lines))
    }

    fn name(&self) -> &'static str {
        "composite"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conf::{DialectConfig, SystemType};
    use crate::parser::formats::{NtParser, UnixParser};
    use crate::parser::traits::FromConfig;

    fn nt_or_unix() -> CompositeParser {
        let config = DialectConfig::new(SystemType::WindowsNt).with_timezone("UTC");
        let unix_config = DialectConfig::new(SystemType::Unix).with_timezone("UTC");
        CompositeParser::new(vec![
            Box::new(NtParser::from_config(Some(&config)).unwrap()),
            Box::new(UnixParser::from_config(Some(&unix_config)).unwrap()),
        ])
    }

    #[test]
    fn test_first_match_wins() {
        let parser = nt_or_unix();
        let nt = parser.parse_line("11-09-01  12:30PM       <DIR>          Logs").unwrap();
        assert!(nt.is_directory());
        assert_eq!(nt.name, "Logs");

        let unix = parser
            .parse_line("-rw-r--r--   1 user     group        4096 Jan 15 2020 file.txt")
            .unwrap();
        assert_eq!(unix.owner.as_deref(), Some("user"));
    }

    #[test]
    fn test_no_member_matches() {
        assert!(nt_or_unix().parse_line("not a listing line").is_none());
    }

    #[test]
    fn test_pre_process_chains_members() {
        let mut parser = nt_or_unix();
        let lines = vec![
            "total 8".to_string(),
            "11-09-01  12:30PM       <DIR>          Logs".to_string(),
        ];
        assert_eq!(parser.pre_process(lines).len(), 1);
    }

    #[test]
    fn test_parser_names() {
        let parser = nt_or_unix();
        assert_eq!(parser.parser_names(), vec!["windows_nt", "unix"]);
        assert_eq!(parser.len(), 2);
        assert!(!parser.is_empty());
    }

    #[test]
    fn test_empty_composite() {
        let parser = CompositeParser::new(Vec::new());
        assert!(parser.is_empty());
        assert!(parser.parse_line("anything").is_none());
    }
}
