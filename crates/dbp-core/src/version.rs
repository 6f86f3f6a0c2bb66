//! Dotted numeric versions and their ordering.
//!
//! A [`Version`] keeps the text it was parsed from so that it can be written
//! back to the version log unchanged, while equality and ordering only look at
//! the numeric components.

use crate::error::{CoreError, CoreResult};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// A dot-delimited version such as `1.2.10`.
///
/// Components are compared numerically, so `1.9 < 1.10`. When one version is
/// a prefix of the other, the one with more components is greater
/// (`1.2 < 1.2.0`).
#[derive(Debug, Clone)]
pub struct Version {
    raw: String,
    parts: Vec<u64>,
}

impl Version {
    /// Parse a version string, trimming surrounding whitespace.
    pub fn parse(input: &str) -> CoreResult<Self> {
        let raw = input.trim();
        if raw.is_empty() {
            return Err(malformed(input, "version is empty"));
        }

        let parts = raw
            .split('.')
            .map(|component| parse_component(raw, component))
            .collect::<CoreResult<Vec<_>>>()?;

        Ok(Self {
            raw: raw.to_string(),
            parts,
        })
    }

    /// The version assumed when the version log has no rows.
    pub fn initial() -> Self {
        Self {
            raw: "0".to_string(),
            parts: vec![0],
        }
    }

    /// The version text as written in the patch file or version log.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Numeric components, most significant first.
    pub fn components(&self) -> &[u64] {
        &self.parts
    }
}

fn parse_component(raw: &str, component: &str) -> CoreResult<u64> {
    if component.is_empty() {
        return Err(malformed(raw, "empty component"));
    }
    if !component.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed(
            raw,
            &format!("component '{component}' is not a non-negative integer"),
        ));
    }
    component
        .parse::<u64>()
        .map_err(|_| malformed(raw, &format!("component '{component}' is out of range")))
}

fn malformed(version: &str, reason: &str) -> CoreError {
    CoreError::MalformedVersion {
        version: version.to_string(),
        reason: reason.to_string(),
    }
}

/// Compare two version strings.
///
/// Fails with [`CoreError::MalformedVersion`] if either side does not parse.
pub fn compare(a: &str, b: &str) -> CoreResult<Ordering> {
    Ok(Version::parse(a)?.cmp(&Version::parse(b)?))
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        for (left, right) in self.parts.iter().zip(&other.parts) {
            match left.cmp(right) {
                Ordering::Equal => continue,
                unequal => return unequal,
            }
        }
        self.parts.len().cmp(&other.parts.len())
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.parts == other.parts
    }
}

impl Eq for Version {}

impl FromStr for Version {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

#[cfg(test)]
#[path = "version_test.rs"]
mod tests;
