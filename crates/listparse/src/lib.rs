// Module layout for the listing parser.

pub mod conf;
pub mod parser;

pub use conf::{ConfigError, DialectConfig, SystemType};
pub use parser::{
    DialectFactory, Entry, EntryKind, EntryParser, FactoryError, ListParseEngine, ParserRegistry,
};

/// Parse a whole listing with the grammar `key` selects, using default settings.
///
/// ```
/// let entries = listparse::parse_listing(
///     "UNIX",
///     "total 8\n-rw-r--r--   1 user     group        4096 Jan 15 2020 file.txt",
/// )
/// .unwrap();
/// assert_eq!(entries[0].name, "file.txt");
/// ```
pub fn parse_listing(key: &str, raw: &str) -> Result<Vec<Entry>, FactoryError> {
    let mut engine = ListParseEngine::new(DialectFactory::new().create(key)?);
    engine.read_listing(raw);
    Ok(engine.entries())
}

/// Like [`parse_listing`], with the grammar chosen and configured by `config`.
pub fn parse_listing_with(config: &DialectConfig, raw: &str) -> Result<Vec<Entry>, FactoryError> {
    let mut engine = ListParseEngine::new(DialectFactory::new().from_config(config)?);
    engine.read_listing(raw);
    Ok(engine.entries())
}
