//! Build a [`DialectConfig`] from TOML text.
//!
//! Reading the text (file, database, RPC) is the host's business; this only
//! decodes and validates it.

use super::model::{ConfigError, DialectConfig};

impl DialectConfig {
    /// Decode a TOML table and validate it.
    ///
    /// ```toml
    /// system = "UNIX"
    /// default_date_format = "yyyy-MM-dd HH:mm"
    /// server_timezone = "Europe/Berlin"
    /// ```
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: DialectConfig = toml::from_str(contents)?;
        config.validate()?;
        tracing::debug!(system = %config.system, "loaded dialect configuration");
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string(self)
    }
}
