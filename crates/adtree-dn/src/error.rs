use std::fmt;

use thiserror::Error;

/// The structural violation that stopped a DN scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Problem {
    ReservedCharacter(char),
    MissingEquals,
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReservedCharacter(c) => {
                write!(f, "attribute type contains reserved character {c:?}")
            }
            Self::MissingEquals => f.write_str("attribute type is not followed by '='"),
        }
    }
}

/// Failure to parse a distinguished name.
///
/// There is exactly one kind of failure; [`Problem`] only says where the
/// grammar broke down.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DnError {
    #[error("Malformed distinguished name {dn:?} at byte {position}: {problem}")]
    Malformed {
        dn: String,
        position: usize,
        problem: Problem,
    },
}

impl DnError {
    pub(crate) fn malformed(dn: &str, position: usize, problem: Problem) -> Self {
        Self::Malformed {
            dn: dn.to_owned(),
            position,
            problem,
        }
    }

    pub fn problem(&self) -> Problem {
        match self {
            Self::Malformed { problem, .. } => *problem,
        }
    }

    pub fn position(&self) -> usize {
        match self {
            Self::Malformed { position, .. } => *position,
        }
    }
}
