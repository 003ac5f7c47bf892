use std::sync::atomic::{AtomicU64, Ordering};
use serde::Serialize;

use super::model::EntryKind;

/// Forces the wrapped counters onto their own 64-byte cache line so
/// engines on different threads sharing one `ListingMetrics` do not
/// invalidate each other's lines.
#[repr(align(64))]
#[derive(Debug, Default)]
pub struct CacheAligned<T>(pub T);

/// Records read and removed before per-line parsing
#[derive(Debug, Default)]
pub struct RecordMetrics {
    pub read: AtomicU64,
    pub removed_by_pre_process: AtomicU64,
}

/// Parsed entries by kind (updated per record)
#[derive(Debug, Default)]
pub struct KindMetrics {
    pub files: AtomicU64,
    pub directories: AtomicU64,
    pub symbolic_links: AtomicU64,
    pub unknown: AtomicU64,
}

/// Per-record outcome totals
#[derive(Debug, Default)]
pub struct OutcomeMetrics {
    pub parsed: AtomicU64,
    pub skipped: AtomicU64,
    pub time_nanos: AtomicU64,
}

/// Counters for listing parses.
///
/// All operations use `Ordering::Relaxed`; a snapshot may be slightly torn
/// across fields, which is fine for observability.
#[derive(Debug, Default)]
pub struct ListingMetrics {
    pub records: CacheAligned<RecordMetrics>,
    pub kinds: CacheAligned<KindMetrics>,
    pub outcomes: CacheAligned<OutcomeMetrics>,
}

impl ListingMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a listing read: `read` records went in, `kept` survived pre-processing.
    #[inline]
    pub fn record_listing(&self, read: usize, kept: usize) {
        self.records.0.read.fetch_add(read as u64, Ordering::Relaxed);
        self.records
            .0
            .removed_by_pre_process
            .fetch_add(read.saturating_sub(kept) as u64, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_parse(&self, kind: EntryKind, time_nanos: u64) {
        self.outcomes.0.parsed.fetch_add(1, Ordering::Relaxed);
        self.outcomes.0.time_nanos.fetch_add(time_nanos, Ordering::Relaxed);

        match kind {
            EntryKind::File => self.kinds.0.files.fetch_add(1, Ordering::Relaxed),
            EntryKind::Directory => self.kinds.0.directories.fetch_add(1, Ordering::Relaxed),
            EntryKind::SymbolicLink => self.kinds.0.symbolic_links.fetch_add(1, Ordering::Relaxed),
            EntryKind::Unknown => self.kinds.0.unknown.fetch_add(1, Ordering::Relaxed),
        };
    }

    /// A record no grammar recognized
    #[inline]
    pub fn record_skip(&self, time_nanos: u64) {
        self.outcomes.0.skipped.fetch_add(1, Ordering::Relaxed);
        self.outcomes.0.time_nanos.fetch_add(time_nanos, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let parsed = self.outcomes.0.parsed.load(Ordering::Relaxed);
        let skipped = self.outcomes.0.skipped.load(Ordering::Relaxed);
        let time_nanos = self.outcomes.0.time_nanos.load(Ordering::Relaxed);
        let attempts = parsed + skipped;

        MetricsSnapshot {
            records_read: self.records.0.read.load(Ordering::Relaxed),
            removed_by_pre_process: self.records.0.removed_by_pre_process.load(Ordering::Relaxed),

            files: self.kinds.0.files.load(Ordering::Relaxed),
            directories: self.kinds.0.directories.load(Ordering::Relaxed),
            symbolic_links: self.kinds.0.symbolic_links.load(Ordering::Relaxed),
            unknown: self.kinds.0.unknown.load(Ordering::Relaxed),

            parsed,
            skipped,
            avg_parse_time_us: if attempts > 0 {
                (time_nanos as f64 / attempts as f64) / 1000.0
            } else {
                0.0
            },
            match_rate: if attempts > 0 {
                parsed as f64 / attempts as f64
            } else {
                1.0
            },
        }
    }
}

/// Read-only, serializable copy of [`ListingMetrics`].
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub records_read: u64,
    pub removed_by_pre_process: u64,

    pub files: u64,
    pub directories: u64,
    pub symbolic_links: u64,
    pub unknown: u64,

    pub parsed: u64,
    pub skipped: u64,
    pub avg_parse_time_us: f64,
    pub match_rate: f64,
}
