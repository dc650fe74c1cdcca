//! # adtree-dn
//!
//! Parsing of LDAP / Active Directory distinguished names into an ordered
//! list of `type=value` segments, plus the navigation queries needed to
//! rebuild a container tree: leaf name, parent, ancestor chain and depth.
//!
//! ```
//! use adtree_dn::DistinguishedName;
//!
//! let dn = DistinguishedName::parse("CN=Sam Baxter,OU=Staging,DC=example,DC=com")?;
//!
//! assert_eq!(dn.rdn(), "CN=Sam Baxter");
//! assert_eq!(dn.name_type(), "CN");
//! assert_eq!(dn.depth(), 4);
//! assert_eq!(dn.parent().as_str(), "OU=Staging,DC=example,DC=com");
//!
//! let chain: Vec<String> = dn.parent_hierarchy().iter().map(|a| a.to_string()).collect();
//! assert_eq!(chain, ["DC=com", "DC=example,DC=com", "OU=Staging,DC=example,DC=com"]);
//! # Ok::<(), adtree_dn::DnError>(())
//! ```
//!
//! ## Grammar
//!
//! Segments are separated by unescaped commas and split on the first `=`.
//! Attribute values may use backslash escapes: `\,` (or any other character)
//! stands for itself and `\XX` decodes two hex digits to one character.
//! Whitespace around `=` and `,` is trimmed. Attribute types may not contain
//! any of `, + " < > ; =` or CR/LF.
//!
//! Multi-valued RDNs (`cn=a+ou=b`) are not split: the `+` simply stays in the
//! value.

mod cursor;
mod dn;
mod error;
mod rdn;

pub use dn::DistinguishedName;
pub use error::{DnError, Problem};
pub use rdn::Rdn;
