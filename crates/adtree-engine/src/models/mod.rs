pub mod directory_tree;
pub mod record;

pub use directory_tree::*;
pub use record::{Attribute, AttributeValue, LdifRecord};
