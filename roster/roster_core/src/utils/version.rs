//! Revision counters.
//!
//! Persisted role and dashboard definitions are never changed in place; every
//! save writes a new revision. Revisions start at 1 and only ever increase.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Error parsing a revision string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevisionParseError {
    /// The invalid revision string.
    pub input: String,

    /// The reason for the error.
    pub reason: &'static str,
}

impl fmt::Display for RevisionParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid revision '{}': {}", self.input, self.reason)
    }
}

impl std::error::Error for RevisionParseError {}

/// A monotonically increasing definition revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Revision(u32);

impl Revision {
    /// The revision assigned to a newly created definition.
    pub const FIRST: Revision = Revision(1);

    /// Create a revision from its number.
    ///
    /// # Returns
    ///
    /// `None` if `number` is zero; revisions start at 1.
    pub fn new(number: u32) -> Option<Self> {
        if number == 0 {
            None
        } else {
            Some(Self(number))
        }
    }

    /// The revision number.
    pub fn get(&self) -> u32 {
        self.0
    }

    /// The revision following this one, `None` once the counter is spent.
    pub fn next(&self) -> Option<Self> {
        self.0.checked_add(1).map(Self)
    }
}

impl Default for Revision {
    fn default() -> Self {
        Self::FIRST
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

impl FromStr for Revision {
    type Err = RevisionParseError;

    /// Accepts both `3` and `v3`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix('v')
            .or_else(|| trimmed.strip_prefix('V'))
            .unwrap_or(trimmed);

        let number: u32 = digits.parse().map_err(|_| RevisionParseError {
            input: s.to_string(),
            reason: "expected a positive integer",
        })?;

        Self::new(number).ok_or(RevisionParseError {
            input: s.to_string(),
            reason: "revisions start at 1",
        })
    }
}

impl TryFrom<u32> for Revision {
    type Error = RevisionParseError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(RevisionParseError {
            input: value.to_string(),
            reason: "revisions start at 1",
        })
    }
}

impl From<Revision> for u32 {
    fn from(value: Revision) -> Self {
        value.0
    }
}
