//! Dialect configuration.
//!
//! - `model.rs`: `DialectConfig`, `SystemType`, `ConfigError`
//! - `load.rs`: TOML decoding

pub mod model;
mod load;

pub use model::{ConfigError, DialectConfig, SystemType};
