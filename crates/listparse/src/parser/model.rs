use serde::Serialize;
use thiserror::Error;

use super::timestamp::Timestamp;
use crate::conf::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    File,
    Directory,
    SymbolicLink,
    /// Recognized line, unrecognized type marker
    Unknown,
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::File => "file",
            EntryKind::Directory => "directory",
            EntryKind::SymbolicLink => "symbolic_link",
            EntryKind::Unknown => "unknown",
        }
    }

    /// First column of an `ls -l` rendering.
    fn type_char(&self) -> char {
        match self {
            EntryKind::File => '-',
            EntryKind::Directory => 'd',
            EntryKind::SymbolicLink => 'l',
            EntryKind::Unknown => '?',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Access {
    Owner,
    Group,
    World,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    Read,
    Write,
    Execute,
}

impl Access {
    pub const ALL: [Access; 3] = [Access::Owner, Access::Group, Access::World];
}

impl Permission {
    pub const ALL: [Permission; 3] = [Permission::Read, Permission::Write, Permission::Execute];
}

/// 3×3 matrix of {Owner, Group, World} × {Read, Write, Execute}.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Permissions([[bool; 3]; 3]);

impl Permissions {
    pub fn get(&self, access: Access, perm: Permission) -> bool {
        self.0[access as usize][perm as usize]
    }

    pub fn set(&mut self, access: Access, perm: Permission, value: bool) {
        self.0[access as usize][perm as usize] = value;
    }

    /// Apply one octal digit (`rwx` bits) to `access`.
    pub fn set_octal(&mut self, access: Access, digit: u8) {
        self.set(access, Permission::Read, digit & 0b100 != 0);
        self.set(access, Permission::Write, digit & 0b010 != 0);
        self.set(access, Permission::Execute, digit & 0b001 != 0);
    }

    /// `rwxr-x---`
    pub fn to_mode_string(&self) -> String {
        let mut out = String::with_capacity(9);
        for access in Access::ALL {
            for (perm, c) in Permission::ALL.into_iter().zip(['r', 'w', 'x']) {
                out.push(if self.get(access, perm) { c } else { '-' });
            }
        }
        out
    }
}

/// One parsed row of a directory listing.
///
/// `kind` and `raw_line` are always set. Every other field is whatever the
/// dialect's line layout could provide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    pub raw_line: String,
    pub name: String,
    pub link_target: Option<String>,
    pub kind: EntryKind,
    pub size: Option<u64>,
    pub owner: Option<String>,
    pub group: Option<String>,
    pub hard_link_count: Option<u32>,
    pub permissions: Permissions,
    pub timestamp: Option<Timestamp>,
}

impl Entry {
    pub fn new(raw_line: impl Into<String>, kind: EntryKind) -> Self {
        Self {
            raw_line: raw_line.into(),
            name: String::new(),
            link_target: None,
            kind,
            size: None,
            owner: None,
            group: None,
            hard_link_count: None,
            permissions: Permissions::default(),
            timestamp: None,
        }
    }

    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }

    pub fn is_directory(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    pub fn is_symbolic_link(&self) -> bool {
        self.kind == EntryKind::SymbolicLink
    }

    pub fn is_unknown(&self) -> bool {
        self.kind == EntryKind::Unknown
    }

    pub fn has_permission(&self, access: Access, perm: Permission) -> bool {
        self.permissions.get(access, perm)
    }

    /// Render the entry like `ls -l`. Absent fields print as blanks.
    pub fn to_formatted_string(&self) -> String {
        let timestamp = self
            .timestamp
            .map(|ts| ts.format("%Y-%m-%d %H:%M %:z").to_string())
            .unwrap_or_default();
        let mut line = format!(
            "{}{} {:>4} {:<8} {:<8} {:>8} {} {}",
            self.kind.type_char(),
            self.permissions.to_mode_string(),
            self.hard_link_count.map(|n| n.to_string()).unwrap_or_default(),
            self.owner.as_deref().unwrap_or(""),
            self.group.as_deref().unwrap_or(""),
            self.size.map(|n| n.to_string()).unwrap_or_default(),
            timestamp,
            self.name,
        );
        if let Some(target) = &self.link_target {
            line.push_str(" -> ");
            line.push_str(target);
        }
        line
    }
}

impl std::fmt::Display for Entry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw_line)
    }
}

/// Recoverable: grammars treat this as "no timestamp" unless they reject the line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimestampError {
    #[error("unparseable timestamp: {text:?}")]
    Unparseable { text: String },
}

/// Construction-time failure while choosing or building a grammar.
#[derive(Debug, Error)]
pub enum FactoryError {
    #[error("parser key is empty")]
    EmptyKey,

    #[error("no listing parser for key {0:?}")]
    UnknownKey(String),

    #[error("registered parser {key} failed to build: {reason}")]
    Construction { key: String, reason: String },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permissions_matrix() {
        let mut perms = Permissions::default();
        perms.set(Access::Group, Permission::Write, true);
        assert!(perms.get(Access::Group, Permission::Write));
        assert!(!perms.get(Access::Owner, Permission::Write));
        assert!(!perms.get(Access::Group, Permission::Read));
    }

    #[test]
    fn test_octal_digits() {
        let mut perms = Permissions::default();
        perms.set_octal(Access::Owner, 7);
        perms.set_octal(Access::Group, 5);
        perms.set_octal(Access::World, 0);
        assert_eq!(perms.to_mode_string(), "rwxr-x---");
    }

    #[test]
    fn test_new_entry_has_no_optional_fields() {
        let entry = Entry::new("raw", EntryKind::Unknown);
        assert!(entry.is_unknown());
        assert_eq!(entry.raw_line, "raw");
        assert_eq!(entry.size, None);
        assert_eq!(entry.owner, None);
        assert_eq!(entry.hard_link_count, None);
        assert_eq!(entry.timestamp, None);
    }

    #[test]
    fn test_formatted_string() {
        let mut entry = Entry::new("raw", EntryKind::SymbolicLink);
        entry.name = "current".to_string();
        entry.link_target = Some("releases/42".to_string());
        entry.owner = Some("deploy".to_string());
        entry.group = Some("www".to_string());
        entry.size = Some(11);
        entry.hard_link_count = Some(1);
        entry.permissions.set_octal(Access::Owner, 7);
        entry.permissions.set_octal(Access::Group, 7);
        entry.permissions.set_octal(Access::World, 7);

        let line = entry.to_formatted_string();
        assert!(line.starts_with("lrwxrwxrwx"));
        assert!(line.contains("deploy"));
        assert!(line.ends_with("current -> releases/42"));
    }

    #[test]
    fn test_entry_serializes_kind_as_snake_case() {
        let entry = Entry::new("d", EntryKind::SymbolicLink);
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["kind"], "symbolic_link");
        assert_eq!(json["size"], serde_json::Value::Null);
    }
}
