//! Type-safe identifiers for social-graph accounts

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Type-safe wrapper for a social-graph account identifier (FID)
///
/// FIDs are opaque integers, globally unique across the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fid(u64);

impl Fid {
    /// Create a new Fid from its numeric value
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the underlying numeric value
    pub const fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for Fid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Fid {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Error returned when a caller-supplied FID string is not an integer
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid fid: {0:?}")]
pub struct ParseFidError(String);

impl FromStr for Fid {
    type Err = ParseFidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(Self)
            .map_err(|_| ParseFidError(s.to_string()))
    }
}

/// Which side of a subject's follow graph to list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Accounts the subject follows
    Following,
    /// Accounts that follow the subject
    Followers,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Following => "following",
            Direction::Followers => "followers",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
