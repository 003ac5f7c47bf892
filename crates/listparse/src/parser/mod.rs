/// Directory-listing parsing
///
/// Turns the text answer to a `LIST`/`MLSD` command into structured
/// entries. Servers disagree on layout, date format and permission encoding,
/// so each dialect has its own grammar and a factory picks one from a
/// system-type hint.
///
/// # Architecture
///
/// - `traits.rs`: `EntryParser` and `FromConfig`
/// - `model.rs`: `Entry`, permissions, error types
/// - `timestamp.rs`: year inference for recent and full dates
/// - `datefmt.rs` / `months.rs`: date patterns and month-name tables
/// - `formats/`: one grammar per dialect
/// - `composite.rs`: ordered fallback across grammars
/// - `registry.rs` / `factory.rs`: dialect selection
/// - `engine.rs`: whole-listing driver with paging
/// - `metrics.rs`: parse counters
///
/// # Guarantees
///
/// - Unrecognized lines are skipped, never errors
/// - `raw_line` is kept on every entry
/// - No I/O; raw text comes from the caller

pub mod traits;
pub mod model;
pub mod timestamp;
pub mod datefmt;
pub mod months;
pub mod formats;
pub mod composite;
pub mod registry;
pub mod factory;
pub mod engine;
pub mod metrics;

// Re-export commonly used types
pub use traits::{EntryParser, FromConfig};
pub use model::{Access, Entry, EntryKind, FactoryError, Permission, Permissions, TimestampError};
pub use timestamp::{ServerZone, Timestamp, TimestampParser};
pub use composite::CompositeParser;
pub use registry::{ParserBuilder, ParserRegistry};
pub use factory::DialectFactory;
pub use engine::ListParseEngine;
pub use metrics::{ListingMetrics, MetricsSnapshot};
