//! Reading LDIF exports (as produced by `ldifde` or `ldapsearch`) into records.
//!
//! Only content records are understood: `attr: value`, `attr:: base64` and
//! `attr:< url` lines, folded continuation lines, `#` comments and an
//! optional leading `version:` line. The `dn` of every record is parsed into
//! a [`DistinguishedName`](adtree_dn::DistinguishedName).

mod reader;

pub use reader::{LdifReader, ReadContext, parse_ldif};

use adtree_dn::DnError;

/// Knobs for how attribute values are exposed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReaderOptions {
    /// Keep only the last value seen for each attribute.
    pub scalar: bool,
    /// Leave `objectGUID` as its base64 text instead of decoding a GUID.
    pub raw_guid: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum LdifError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Line {line}: expected `attribute: value`")]
    InvalidLine { line: usize },
    #[error("Line {line}: invalid base64 in attribute {attribute}: {source}")]
    Base64 {
        line: usize,
        attribute: String,
        source: base64::DecodeError,
    },
    #[error("Line {line}: {source}")]
    InvalidDn { line: usize, source: DnError },
    #[error("Line {line}: a dn cannot be read from a URL")]
    DnUrl { line: usize },
    #[error("Line {line}: base64 dn is not valid UTF-8")]
    DnEncoding { line: usize },
    #[error("Line {line}: record does not start with a dn")]
    MissingDn { line: usize },
    #[error("Line {line}: objectGUID must be 16 bytes, got {len}")]
    InvalidGuid { line: usize, len: usize },
}
