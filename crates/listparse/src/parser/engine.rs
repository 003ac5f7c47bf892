use std::sync::Arc;
use std::time::Instant;

use super::metrics::ListingMetrics;
use super::model::Entry;
use super::traits::EntryParser;

/// Drives one grammar over a whole listing.
///
/// The listing is split into records with the grammar's reader and
/// pre-processed once. Records are then parsed on demand, either all at once
/// with [`entries`](Self::entries) or a page at a time.
pub struct ListParseEngine {
    parser: Box<dyn EntryParser>,
    records: Vec<String>,
    cursor: usize,
    metrics: Arc<ListingMetrics>,
}

impl ListParseEngine {
    pub fn new(parser: Box<dyn EntryParser>) -> Self {
        Self::with_metrics(parser, Arc::new(ListingMetrics::new()))
    }

    /// Share one set of counters between engines.
    pub fn with_metrics(parser: Box<dyn EntryParser>, metrics: Arc<ListingMetrics>) -> Self {
        Self {
            parser,
            records: Vec::new(),
            cursor: 0,
            metrics,
        }
    }

    /// Replace the current listing with `raw` and rewind.
    pub fn read_listing(&mut self, raw: &str) {
        let records = self.parser.read_entries(raw);
        let read = records.len();
        self.records = self.parser.pre_process(records);
        self.cursor = 0;

        self.metrics.record_listing(read, self.records.len());
        tracing::debug!(
            parser = self.parser.name(),
            read,
            kept = self.records.len(),
            "read listing"
        );
    }

    /// Like [`read_listing`](Self::read_listing) for input already split into lines.
    pub fn read_lines<I, S>(&mut self, lines: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let raw = lines.into_iter().fold(String::new(), |mut raw, line| {
            if !raw.is_empty() {
                raw.push('\n');
            }
            raw.push_str(line.as_ref());
            raw
        });
        self.read_listing(&raw);
    }

    pub fn parser(&self) -> &dyn EntryParser {
        self.parser.as_ref()
    }

    /// Records after pre-processing, before parsing.
    pub fn records(&self) -> &[String] {
        &self.records
    }

    /// Every recognized entry in listing order.
    pub fn entries(&self) -> Vec<Entry> {
        self.parse_range(0, self.records.len())
    }

    /// Parse the next `count` records (all remaining when `count` is 0) and
    /// advance past them. Unrecognized records are dropped, so a page may
    /// hold fewer than `count` entries.
    pub fn next_page(&mut self, count: usize) -> Vec<Entry> {
        let start = self.cursor;
        let end = if count == 0 {
            self.records.len()
        } else {
            start.saturating_add(count).min(self.records.len())
        };
        self.cursor = end;
        self.parse_range(start, end)
    }

    /// Step back over the previous `count` records (all of them when
    /// `count` is 0) and parse them, in listing order.
    pub fn previous_page(&mut self, count: usize) -> Vec<Entry> {
        let end = self.cursor;
        let start = if count == 0 { 0 } else { end.saturating_sub(count) };
        self.cursor = start;
        self.parse_range(start, end)
    }

    pub fn has_next(&self) -> bool {
        self.cursor < self.records.len()
    }

    pub fn has_previous(&self) -> bool {
        self.cursor > 0
    }

    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    pub fn metrics(&self) -> &ListingMetrics {
        &self.metrics
    }

    fn parse_range(&self, start: usize, end: usize) -> Vec<Entry> {
        self.records[start..end]
            .iter()
            .filter_map(|record| self.parse_record(record))
            .collect()
    }

    fn parse_record(&self, record: &str) -> Option<Entry> {
        let started = Instant::now();
        let entry = self.parser.parse_line(record);
        let elapsed = started.elapsed().as_nanos() as u64;

        match &entry {
            Some(entry) => self.metrics.record_parse(entry.kind, elapsed),
            None => {
                self.metrics.record_skip(elapsed);
                tracing::trace!(parser = self.parser.name(), record, "skipped unrecognized record");
            }
        }
        entry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conf::{DialectConfig, SystemType};
    use crate::parser::formats::{MvsParser, UnixParser, VmsParser};
    use crate::parser::traits::FromConfig;

    const UNIX_LISTING: &str = "total 16\n\
        drwxr-xr-x   2 user     group        4096 Jan 15 2020 bin\n\
        this line is noise\n\
        -rw-r--r--   1 user     group         120 Jan 15 2020 a.txt\n\
        -rw-r--r--   1 user     group         240 Jan 15 2020 b.txt\n\
        lrwxrwxrwx   1 user     group           5 Jan 15 2020 c -> a.txt";

    fn unix_engine() -> ListParseEngine {
        let config = DialectConfig::new(SystemType::Unix).with_timezone("UTC");
        ListParseEngine::new(Box::new(UnixParser::from_config(Some(&config)).unwrap()))
    }

    #[test]
    fn test_entries_in_order_without_noise() {
        let mut engine = unix_engine();
        engine.read_listing(UNIX_LISTING);

        assert_eq!(engine.records().len(), 5);
        let names: Vec<String> = engine.entries().into_iter().map(|e| e.name).collect();
        assert_eq!(names, vec!["bin", "a.txt", "b.txt", "c"]);
    }

    #[test]
    fn test_raw_line_preserved() {
        let mut engine = unix_engine();
        engine.read_listing(UNIX_LISTING);
        let entries = engine.entries();
        assert_eq!(
            entries[1].raw_line,
            "-rw-r--r--   1 user     group         120 Jan 15 2020 a.txt"
        );
    }

    #[test]
    fn test_paging_forward_and_back() {
        let mut engine = unix_engine();
        engine.read_listing(UNIX_LISTING);

        assert!(!engine.has_previous());
        let first = engine.next_page(2);
        assert_eq!(first.len(), 1); // bin + noise
        let second = engine.next_page(2);
        assert_eq!(second.len(), 2);
        let rest = engine.next_page(0);
        assert_eq!(rest.len(), 1);
        assert!(!engine.has_next());
        assert!(engine.next_page(3).is_empty());

        let back = engine.previous_page(2);
        let names: Vec<&str> = back.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["b.txt", "c"]);
        assert!(engine.has_previous());

        engine.reset();
        assert!(!engine.has_previous());
        assert_eq!(engine.next_page(0).len(), 4);
    }

    #[test]
    fn test_metrics_updated() {
        let mut engine = unix_engine();
        engine.read_listing(UNIX_LISTING);
        engine.entries();

        let snap = engine.metrics().snapshot();
        assert_eq!(snap.records_read, 6);
        assert_eq!(snap.removed_by_pre_process, 1);
        assert_eq!(snap.parsed, 4);
        assert_eq!(snap.skipped, 1);
        assert_eq!(snap.directories, 1);
        assert_eq!(snap.symbolic_links, 1);
    }

    #[test]
    fn test_read_lines_uses_record_reader() {
        let config = DialectConfig::new(SystemType::Vms).with_timezone("UTC");
        let mut engine = ListParseEngine::new(Box::new(VmsParser::from_config(Some(&config)).unwrap()));
        engine.read_lines([
            "Directory DISK$USER:[ME]",
            "LONG_NAME_THAT_WRAPS.TXT;1",
            "        9/9    2-JUN-1998 07:32:04  [GROUP,OWNER]    (RWED,RWED,RW,R)",
            "Total of 1 file, 9/9 blocks.",
        ]);
        let entries = engine.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "LONG_NAME_THAT_WRAPS.TXT");
    }

    #[test]
    fn test_reused_engine_rechecks_mvs_header() {
        let config = DialectConfig::new(SystemType::Mvs).with_timezone("UTC");
        let mut engine = ListParseEngine::new(Box::new(MvsParser::from_config(Some(&config)).unwrap()));

        engine.read_listing(
            "Volume Unit    Referred Ext Used Recfm Lrecl BlkSz Dsorg Dsname\n\
             SAVE00 3390   2004/06/23  1    1  FB     128  6144  PS  A.B",
        );
        assert_eq!(engine.entries().len(), 1);

        engine.read_listing(
            "SAVE00 3390   2004/06/23  1    1  FB     128  6144  PS  HEADERISH\n\
             SAVE01 3390   2004/06/23  1    1  FB     128  6144  PS  C.D",
        );
        assert!(engine.entries().is_empty());
    }

    #[test]
    fn test_empty_listing() {
        let mut engine = unix_engine();
        engine.read_listing("");
        assert!(engine.entries().is_empty());
        assert!(!engine.has_next());
    }
}
