//! Domain types for the show catalog with strong typing.
//!
//! This module provides type-safe wrappers and domain primitives for the search
//! subsystem. It follows the Newtype pattern so that show identifiers and
//! normalized queries cannot be mixed up with arbitrary integers or strings.

pub mod state;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unique identifier for a show in the remote catalog.
///
/// Zero is never assigned by the catalog, so it is treated as an invalid
/// identifier and rejected before any network access.
///
/// # Examples
///
/// ```rust
/// use tvapi::domain::ShowId;
///
/// let id = ShowId::new(169);
/// assert_eq!(id.value(), 169);
/// assert_eq!(id.to_string(), "169");
/// assert!(!ShowId::new(0).is_valid());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ShowId(u32);

impl ShowId {
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the underlying u32 value.
    #[must_use]
    pub const fn value(&self) -> u32 {
        self.0
    }

    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.0 > 0
    }
}

impl fmt::Display for ShowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for ShowId {
    fn from(id: u32) -> Self {
        Self::new(id)
    }
}

impl From<ShowId> for u32 {
    fn from(id: ShowId) -> Self {
        id.0
    }
}

impl FromStr for ShowId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u32>()
            .map(Self::new)
            .map_err(|_| format!("'{s}' is not a valid show id"))
    }
}

impl Serialize for ShowId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_u32(self.0)
    }
}

impl<'de> Deserialize<'de> for ShowId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let id = u32::deserialize(deserializer)?;
        Ok(Self::new(id))
    }
}

/// Trims and lower-cases a query. Two queries are equivalent iff their
/// normalized forms are equal.
#[must_use]
pub fn normalize_query(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// A query that has been normalized and is long enough to be executed.
///
/// Construction is the only place the minimum length is checked, so holding a
/// `NormalizedQuery` is proof that the query may reach the network.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NormalizedQuery(String);

impl NormalizedQuery {
    /// Normalizes `raw` and returns `None` when it has fewer than
    /// `min_length` characters.
    #[must_use]
    pub fn parse(raw: &str, min_length: usize) -> Option<Self> {
        let normalized = normalize_query(raw);
        if normalized.is_empty() || normalized.chars().count() < min_length {
            return None;
        }
        Some(Self(normalized))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for NormalizedQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NormalizedQuery {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Ordering applied to a result list.
///
/// `Relevance` keeps the order returned by the catalog (score descending).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortBy {
    #[default]
    Relevance,
    Name,
    Rating,
    Premiered,
}

impl FromStr for SortBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "relevance" => Ok(Self::Relevance),
            "name" => Ok(Self::Name),
            "rating" => Ok(Self::Rating),
            "premiered" => Ok(Self::Premiered),
            other => Err(format!(
                "unknown sort order '{other}' (expected relevance, name, rating or premiered)"
            )),
        }
    }
}

impl fmt::Display for SortBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Relevance => "relevance",
            Self::Name => "name",
            Self::Rating => "rating",
            Self::Premiered => "premiered",
        };
        f.write_str(s)
    }
}
