//! Dialect selection.
//!
//! A key is either a dotted parser name looked up in a [`ParserRegistry`],
//! or any text containing a system token (`UNIX`, `WINDOWS`, a full `SYST`
//! banner, ...).

use std::sync::{Arc, LazyLock};

use regex::Regex;

use super::composite::CompositeParser;
use super::formats::{
    MacOsPeterParser, MvsParser, NetwareParser, NtParser, Os2Parser, Os400Parser, UnixParser, VmsVersioningParser,
};
use super::model::FactoryError;
use super::registry::{build, ParserRegistry};
use super::traits::EntryParser;
use crate::conf::{DialectConfig, SystemType};

/// `segment.segment.Name`, each segment an identifier
static QUALIFIED_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z_$][A-Za-z0-9_$]*\.)+[A-Za-z_$][A-Za-z0-9_$]*$").expect("static regex must compile")
});

pub struct DialectFactory {
    registry: Arc<ParserRegistry>,
}

impl Default for DialectFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl DialectFactory {
    /// Factory over the built-in registry.
    pub fn new() -> Self {
        Self::with_registry(Arc::new(ParserRegistry::with_builtins()))
    }

    pub fn with_registry(registry: Arc<ParserRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &ParserRegistry {
        &self.registry
    }

    /// Grammar for `key` with its default configuration.
    pub fn create(&self, key: &str) -> Result<Box<dyn EntryParser>, FactoryError> {
        self.resolve(key, None)
    }

    /// Grammar for the config's own system type.
    pub fn from_config(&self, config: &DialectConfig) -> Result<Box<dyn EntryParser>, FactoryError> {
        self.resolve(config.system.as_str(), Some(config))
    }

    /// Resolve `key` to a configured grammar.
    ///
    /// 1. A dotted name registered in the registry wins. Unregistered dotted
    ///    names fall through; a registered constructor's failure does not.
    /// 2. Otherwise the upper-cased key is scanned for system tokens in
    ///    [`SystemType::detect`] order.
    pub fn resolve(&self, key: &str, config: Option<&DialectConfig>) -> Result<Box<dyn EntryParser>, FactoryError> {
        if key.is_empty() {
            return Err(FactoryError::EmptyKey);
        }

        if QUALIFIED_NAME.is_match(key) {
            if let Some(result) = self.registry.create(key, config) {
                tracing::debug!(key, "resolved listing parser from registry");
                return result.map_err(|err| FactoryError::Construction {
                    key: key.to_string(),
                    reason: err.to_string(),
                });
            }
            tracing::debug!(key, "dotted parser name not registered, trying system tokens");
        }

        let system = SystemType::detect(key).ok_or_else(|| FactoryError::UnknownKey(key.to_string()))?;
        let parser = Self::for_system(system, config)?;
        tracing::debug!(key, system = %system, parser = parser.name(), "resolved listing parser");
        Ok(parser)
    }

    fn for_system(system: SystemType, config: Option<&DialectConfig>) -> Result<Box<dyn EntryParser>, FactoryError> {
        let exact = |expected: SystemType| config.is_some_and(|c| c.system == expected);

        match system {
            SystemType::Unix | SystemType::L8 => build::<UnixParser>(config),
            SystemType::Vms => build::<VmsVersioningParser>(config),
            SystemType::WindowsNt if exact(SystemType::WindowsNt) => build::<NtParser>(config),
            SystemType::WindowsNt => Self::with_unix_fallback(build::<NtParser>(config)?, config),
            SystemType::Os2 => build::<Os2Parser>(config),
            SystemType::Os400 | SystemType::As400 if exact(SystemType::Os400) => build::<Os400Parser>(config),
            SystemType::Os400 | SystemType::As400 => Self::with_unix_fallback(build::<Os400Parser>(config)?, config),
            SystemType::Mvs => build::<MvsParser>(config),
            SystemType::Netware => build::<NetwareParser>(config),
            SystemType::Macos => build::<MacOsPeterParser>(config),
        }
    }

    /// Pair a grammar with a Unix fallback for servers that claim one system
    /// but print `ls -l` lines.
    fn with_unix_fallback(
        primary: Box<dyn EntryParser>,
        config: Option<&DialectConfig>,
    ) -> Result<Box<dyn EntryParser>, FactoryError> {
        // The caller's formats belong to the primary grammar; the Unix member
        // keeps its own (see "Unix fallback config" in DESIGN.md).
        let unix_config = config.map(|c| DialectConfig {
            system: SystemType::Unix,
            default_date_format: None,
            recent_date_format: None,
            ..c.clone()
        });
        let unix = build::<UnixParser>(unix_config.as_ref())?;
        Ok(Box::new(CompositeParser::new(vec![primary, unix])))
    }
}
