use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::cursor::Cursor;
use crate::error::{DnError, Problem};
use crate::rdn::{Rdn, is_reserved};

/// A parsed distinguished name such as `CN=Sam Baxter,OU=Staging,DC=example,DC=com`.
///
/// Keeps the input text verbatim alongside the segments scanned from it.
/// Index 0 of [`rdns`](Self::rdns) is the leaf, the last index is the
/// root-most component. Instances never change after construction, and
/// cloning shares the segment sequence.
///
/// Equality, ordering and hashing use the verbatim text only, compared
/// ordinally. `cn=a,dc=b` and `CN=a, DC=b` name the same directory object but
/// are *not* equal here; sorting and deduplication downstream rely on that.
#[derive(Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DistinguishedName {
    text: String,
    rdns: Arc<[Rdn]>,
}

impl DistinguishedName {
    /// Parses `input` in a single left-to-right scan.
    ///
    /// An empty string is valid and has depth 0.
    pub fn parse(input: &str) -> Result<Self, DnError> {
        Ok(Self {
            text: input.to_owned(),
            rdns: scan_rdns(input)?.into(),
        })
    }

    /// Builds a DN from already-scanned segments, re-escaping the values so
    /// the text scans back to the same segments.
    fn from_rdns(rdns: &[Rdn]) -> Self {
        let text = rdns
            .iter()
            .map(Rdn::to_escaped_string)
            .collect::<Vec<_>>()
            .join(",");
        Self {
            text,
            rdns: rdns.into(),
        }
    }

    /// The verbatim input text.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_string(self) -> String {
        self.text
    }

    pub fn rdns(&self) -> &[Rdn] {
        &self.rdns
    }

    /// Number of segments.
    pub fn depth(&self) -> usize {
        self.rdns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rdns.is_empty()
    }

    /// The leaf segment as `type=value`, or `""` for the empty DN.
    pub fn rdn(&self) -> String {
        self.rdns.first().map(Rdn::to_string).unwrap_or_default()
    }

    /// Attribute type of the leaf segment (`CN`, `OU`, ...).
    pub fn name_type(&self) -> &str {
        self.rdns.first().map(Rdn::attribute_type).unwrap_or("")
    }

    /// Attribute value of the leaf segment.
    pub fn name(&self) -> &str {
        self.rdns.first().map(Rdn::attribute_value).unwrap_or("")
    }

    /// Everything but the leaf. The parent of a depth 0 or 1 DN is the empty DN.
    pub fn parent(&self) -> Self {
        self.rdns
            .get(1..)
            .map(Self::from_rdns)
            .unwrap_or_default()
    }

    /// Ancestors from the immediate parent up to the root-most component.
    ///
    /// The empty DN is never yielded.
    pub fn ancestors(&self) -> impl DoubleEndedIterator<Item = Self> + '_ {
        (1..self.depth()).map(|start| Self::from_rdns(&self.rdns[start..]))
    }

    /// Ancestors ordered root-most first, immediate parent last.
    ///
    /// Creating containers in this order guarantees every parent exists
    /// before its children.
    pub fn parent_hierarchy(&self) -> Vec<Self> {
        self.ancestors().rev().collect()
    }

    /// True if `other` lives strictly below this DN.
    ///
    /// Segments are compared exactly; the empty DN is an ancestor of every
    /// non-empty DN.
    pub fn is_ancestor_of(&self, other: &Self) -> bool {
        self.depth() < other.depth() && other.rdns[other.depth() - self.depth()..] == *self.rdns
    }
}

fn scan_rdns(input: &str) -> Result<Vec<Rdn>, DnError> {
    let mut cur = Cursor::new(input);
    let mut rdns = Vec::new();

    while !cur.eof() {
        let attribute_type = scan_attribute_type(&mut cur)
            .map_err(|(position, problem)| DnError::malformed(input, position, problem))?;
        let attribute_value = scan_attribute_value(&mut cur);
        rdns.push(Rdn::new(attribute_type.trim(), attribute_value.trim()));
    }

    Ok(rdns)
}

/// Copies characters up to and past the first `=`. Types are never escaped.
fn scan_attribute_type(cur: &mut Cursor<'_>) -> Result<String, (usize, Problem)> {
    let mut out = String::new();
    loop {
        let at = cur.pos();
        match cur.bump() {
            None => return Err((at, Problem::MissingEquals)),
            Some('=') => return Ok(out),
            Some(c) if is_reserved(c) => return Err((at, Problem::ReservedCharacter(c))),
            Some(c) => out.push(c),
        }
    }
}

/// Copies characters up to and past the next unescaped `,`, decoding escapes.
///
/// A `\XX` hex escape becomes the single character with code point `0xXX`;
/// multi-byte UTF-8 sequences are not reassembled. A trailing lone
/// backslash ends the value.
fn scan_attribute_value(cur: &mut Cursor<'_>) -> String {
    let mut out = String::new();
    while let Some(c) = cur.bump() {
        match c {
            ',' => break,
            '\\' => {
                if let Some(byte) = cur.hex_byte() {
                    out.push(char::from(byte));
                } else if let Some(escaped) = cur.bump() {
                    out.push(escaped);
                }
            }
            c => out.push(c),
        }
    }
    out
}

impl Default for DistinguishedName {
    fn default() -> Self {
        Self {
            text: String::new(),
            rdns: Arc::from(Vec::new()),
        }
    }
}

impl fmt::Display for DistinguishedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl fmt::Debug for DistinguishedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("DistinguishedName").field(&self.text).finish()
    }
}

impl PartialEq for DistinguishedName {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
    }
}

impl Eq for DistinguishedName {}

impl PartialOrd for DistinguishedName {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DistinguishedName {
    fn cmp(&self, other: &Self) -> Ordering {
        self.text.cmp(&other.text)
    }
}

impl Hash for DistinguishedName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.text.hash(state);
    }
}

impl AsRef<str> for DistinguishedName {
    fn as_ref(&self) -> &str {
        &self.text
    }
}

impl FromStr for DistinguishedName {
    type Err = DnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for DistinguishedName {
    type Error = DnError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl TryFrom<String> for DistinguishedName {
    type Error = DnError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let rdns = scan_rdns(&value)?;
        Ok(Self {
            text: value,
            rdns: rdns.into(),
        })
    }
}

impl From<DistinguishedName> for String {
    fn from(dn: DistinguishedName) -> Self {
        dn.text
    }
}
