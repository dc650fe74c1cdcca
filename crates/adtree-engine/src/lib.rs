pub mod io;
pub mod ldif;
pub mod models;

#[cfg(test)]
pub mod tests;

// Re-export key types for easier usage
pub use adtree_dn::{DistinguishedName, DnError};
pub use io::*;
pub use ldif::{LdifError, LdifReader, ReaderOptions, parse_ldif};
pub use models::{directory_tree::*, record::*};
