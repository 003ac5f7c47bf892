use dashmap::DashMap;

use super::formats::{
    EnterpriseUnixParser, MacOsPeterParser, MlsxParser, MvsParser, NetwareParser, NtParser, Os2Parser, Os400Parser,
    UnixParser, VmsParser, VmsVersioningParser,
};
use super::model::FactoryError;
use super::traits::{EntryParser, FromConfig};
use crate::conf::DialectConfig;

/// Prefix of the dotted names built-in grammars are registered under.
pub const BUILTIN_PREFIX: &str = "listparse.parser.";

/// Grammar constructor stored in a [`ParserRegistry`]
pub type ParserBuilder = fn(Option<&DialectConfig>) -> Result<Box<dyn EntryParser>, FactoryError>;

/// Adapts any configurable grammar to a [`ParserBuilder`].
pub fn build<P>(config: Option<&DialectConfig>) -> Result<Box<dyn EntryParser>, FactoryError>
where
    P: EntryParser + FromConfig + 'static,
{
    Ok(Box::new(P::from_config(config)?))
}

/// Dotted-name → constructor map consulted before system-token detection.
///
/// Names are matched exactly. Registration takes `&self` so a shared registry
/// can be extended while in use.
#[derive(Default)]
pub struct ParserRegistry {
    builders: DashMap<String, ParserBuilder>,
}

impl ParserRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            builders: DashMap::new(),
        }
    }

    /// A registry holding every built-in grammar under `listparse.parser.<Name>`.
    pub fn with_builtins() -> Self {
        let builtins: [(&str, ParserBuilder); 11] = [
            ("UnixParser", build::<UnixParser>),
            ("NtParser", build::<NtParser>),
            ("Os2Parser", build::<Os2Parser>),
            ("Os400Parser", build::<Os400Parser>),
            ("VmsParser", build::<VmsParser>),
            ("VmsVersioningParser", build::<VmsVersioningParser>),
            ("EnterpriseUnixParser", build::<EnterpriseUnixParser>),
            ("MvsParser", build::<MvsParser>),
            ("MlsxParser", build::<MlsxParser>),
            ("NetwareParser", build::<NetwareParser>),
            ("MacOsPeterParser", build::<MacOsPeterParser>),
        ];

        let registry = Self::new();
        registry.register_all(builtins.map(|(name, builder)| (format!("{BUILTIN_PREFIX}{name}"), builder)));
        registry
    }

    pub fn register(&self, name: impl Into<String>, builder: ParserBuilder) {
        let name = name.into();
        tracing::trace!(name = %name, "registered listing parser");
        self.builders.insert(name, builder);
    }

    pub fn register_all<I, S>(&self, builders: I)
    where
        I: IntoIterator<Item = (S, ParserBuilder)>,
        S: Into<String>,
    {
        for (name, builder) in builders {
            self.register(name, builder);
        }
    }

    /// `None` when `name` is not registered; otherwise the constructor's result.
    pub fn create(
        &self,
        name: &str,
        config: Option<&DialectConfig>,
    ) -> Option<Result<Box<dyn EntryParser>, FactoryError>> {
        // Copy the fn pointer out so the shard lock is released before building.
        let builder = *self.builders.get(name)?;
        Some(builder(config))
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.builders.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.builders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.builders.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conf::{ConfigError, SystemType};
    use crate::parser::model::Entry;

    struct EverythingIsAFile;

    impl EntryParser for EverythingIsAFile {
        fn parse_line(&self, line: &str) -> Option<Entry> {
            let mut entry = Entry::new(line, crate::parser::model::EntryKind::File);
            entry.name = line.to_string();
            Some(entry)
        }

        fn name(&self) -> &'static str {
            "everything"
        }
    }

    impl FromConfig for EverythingIsAFile {
        fn from_config(_config: Option<&DialectConfig>) -> Result<Self, ConfigError> {
            Ok(Self)
        }
    }

    #[test]
    fn test_builtins_registered() {
        let registry = ParserRegistry::with_builtins();
        assert_eq!(registry.len(), 11);
        let names = registry.names();
        assert!(names.iter().any(|n| n == "listparse.parser.UnixParser"));
        assert!(names.iter().any(|n| n == "listparse.parser.VmsVersioningParser"));
        assert!(registry.create("listparse.parser.unixparser", None).is_none());
    }

    #[test]
    fn test_create_builtin() {
        let registry = ParserRegistry::with_builtins();
        let parser = registry.create("listparse.parser.NtParser", None).unwrap().unwrap();
        assert_eq!(parser.name(), "windows_nt");
    }

    #[test]
    fn test_create_unknown_is_none() {
        assert!(ParserRegistry::new().create("com.example.Missing", None).is_none());
    }

    #[test]
    fn test_runtime_registration() {
        let registry = ParserRegistry::new();
        registry.register("com.example.Everything", build::<EverythingIsAFile>);
        let parser = registry.create("com.example.Everything", None).unwrap().unwrap();
        assert_eq!(parser.parse_line("anything").unwrap().name, "anything");
        assert_eq!(registry.names(), vec!["com.example.Everything".to_string()]);
    }

    #[test]
    fn test_builder_errors_are_returned() {
        let registry = ParserRegistry::with_builtins();
        let bad = DialectConfig::new(SystemType::Unix).with_timezone("Nowhere/Land");
        let result = registry.create("listparse.parser.UnixParser", Some(&bad)).unwrap();
        assert!(matches!(result, Err(FactoryError::Config(ConfigError::TimeZone(_)))));
    }
}
