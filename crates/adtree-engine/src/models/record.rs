use std::fmt;

use adtree_dn::DistinguishedName;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use uuid::Uuid;

/// A single attribute value read from an LDIF record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeValue {
    Text(String),
    /// A base64 payload that was not valid UTF-8.
    Binary(Vec<u8>),
    /// A decoded `objectGUID`.
    Guid(Uuid),
}

impl AttributeValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_guid(&self) -> Option<Uuid> {
        match self {
            Self::Guid(guid) => Some(*guid),
            _ => None,
        }
    }
}

/// Binary values are shown base64-encoded, the way LDIF carries them.
impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Binary(bytes) => f.write_str(&STANDARD.encode(bytes)),
            Self::Guid(guid) => write!(f, "{}", guid.hyphenated()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub values: Vec<AttributeValue>,
}

/// One directory entry: its DN plus attributes in the order they were read.
///
/// Attribute names are matched case-insensitively, as LDAP does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LdifRecord {
    dn: DistinguishedName,
    attributes: Vec<Attribute>,
}

impl LdifRecord {
    pub fn new(dn: DistinguishedName) -> Self {
        Self {
            dn,
            attributes: Vec::new(),
        }
    }

    pub fn dn(&self) -> &DistinguishedName {
        &self.dn
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    pub fn get(&self, name: &str) -> Option<&Attribute> {
        self.attributes
            .iter()
            .find(|attr| attr.name.eq_ignore_ascii_case(name))
    }

    /// All values of an attribute, empty if absent.
    pub fn values(&self, name: &str) -> &[AttributeValue] {
        self.get(name).map(|attr| attr.values.as_slice()).unwrap_or(&[])
    }

    pub fn first(&self, name: &str) -> Option<&AttributeValue> {
        self.values(name).first()
    }

    pub fn object_guid(&self) -> Option<Uuid> {
        self.first("objectGUID").and_then(AttributeValue::as_guid)
    }

    /// Adds a value. In scalar mode the attribute keeps only the latest value.
    pub fn push(&mut self, name: &str, value: AttributeValue, scalar: bool) {
        if let Some(attr) = self
            .attributes
            .iter_mut()
            .find(|attr| attr.name.eq_ignore_ascii_case(name))
        {
            if scalar {
                attr.values = vec![value];
            } else {
                attr.values.push(value);
            }
            return;
        }

        self.attributes.push(Attribute {
            name: name.to_string(),
            values: vec![value],
        });
    }
}
