/// Listing grammars, one per server dialect

pub mod unix;
pub mod nt;
pub mod os2;
pub mod os400;
pub mod vms;
pub mod enterprise;
pub mod mvs;
pub mod mlsx;
pub mod netware;
pub mod macos;

// Re-export parser implementations
pub use unix::UnixParser;
pub use nt::NtParser;
pub use os2::Os2Parser;
pub use os400::Os400Parser;
pub use vms::{VmsParser, VmsVersioningParser};
pub use enterprise::EnterpriseUnixParser;
pub use mvs::{MvsListing, MvsParser};
pub use mlsx::MlsxParser;
pub use netware::NetwareParser;
pub use macos::MacOsPeterParser;
