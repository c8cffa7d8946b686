//! Closed selector types accepted at the HTTP boundary.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Rejected selector value
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorError {
    #[error("unrecognized {kind}: '{value}'")]
    Unrecognized { kind: &'static str, value: String },
}

impl SelectorError {
    fn unrecognized(kind: &'static str, value: &str) -> Self {
        Self::Unrecognized {
            kind,
            value: value.to_string(),
        }
    }
}

/// Which stored list an edge list is derived from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    Followers,
    Following,
}

impl Relation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Relation::Followers => "followers",
            Relation::Following => "following",
        }
    }
}

impl FromStr for Relation {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "followers" => Ok(Relation::Followers),
            "following" => Ok(Relation::Following),
            other => Err(SelectorError::unrecognized("relation", other)),
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Frequency filter mode
///
/// `Common` keeps destinations seen more often than the threshold,
/// `Unique` keeps the rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterMode {
    Common,
    Unique,
}

impl FilterMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterMode::Common => "common",
            FilterMode::Unique => "unique",
        }
    }

    /// Whether a destination seen `count` times survives the filter.
    pub fn keeps(&self, count: usize, threshold: usize) -> bool {
        match self {
            FilterMode::Common => count > threshold,
            FilterMode::Unique => count <= threshold,
        }
    }
}

impl FromStr for FilterMode {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "common" => Ok(FilterMode::Common),
            "unique" | "uncommon" => Ok(FilterMode::Unique),
            other => Err(SelectorError::unrecognized("filter mode", other)),
        }
    }
}

impl fmt::Display for FilterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Node placement algorithm for the rendered network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layout {
    Circular,
    Spring,
    Spectral,
}

impl Layout {
    pub fn as_str(&self) -> &'static str {
        match self {
            Layout::Circular => "circular",
            Layout::Spring => "spring",
            Layout::Spectral => "spectral",
        }
    }
}

impl FromStr for Layout {
    type Err = SelectorError;

    /// Accepts the short names, the `*_layout` names and the legacy
    /// numeric form submitted by older pages.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "circular" | "circular_layout" | "1" => Ok(Layout::Circular),
            "spring" | "spring_layout" | "2" => Ok(Layout::Spring),
            "spectral" | "spectral_layout" | "3" => Ok(Layout::Spectral),
            other => Err(SelectorError::unrecognized("layout", other)),
        }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
