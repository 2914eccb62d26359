//! Version comparison capability and constraint-string parsing.
//!
//! The engine never orders versions itself. It asks a [`VersionComparator`]
//! injected into the catalog, which keeps the search independent of any one
//! versioning scheme. [`SemverComparator`] is the default.

use std::cmp::Ordering;
use std::fmt;

use semver::Version;

/// A total order over version strings.
pub trait VersionComparator: fmt::Debug + Send + Sync {
    /// Compare two version strings. Must be a total order.
    fn compare(&self, a: &str, b: &str) -> Ordering;

    /// Reject version strings this comparator cannot order meaningfully.
    fn validate(&self, _version: &str) -> Result<(), String> {
        Ok(())
    }

    /// `a <= b`
    fn lte(&self, a: &str, b: &str) -> bool {
        self.compare(a, b) != Ordering::Greater
    }

    /// `a < b`
    fn lt(&self, a: &str, b: &str) -> bool {
        self.compare(a, b) == Ordering::Less
    }
}

/// Semantic-version ordering backed by the `semver` crate.
///
/// Strings that do not parse sort after every valid version and compare
/// lexically among themselves.
#[derive(Debug, Clone, Copy, Default)]
pub struct SemverComparator;

impl VersionComparator for SemverComparator {
    fn compare(&self, a: &str, b: &str) -> Ordering {
        match (Version::parse(a), Version::parse(b)) {
            (Ok(a), Ok(b)) => a.cmp(&b),
            (Ok(_), Err(_)) => Ordering::Less,
            (Err(_), Ok(_)) => Ordering::Greater,
            (Err(_), Err(_)) => a.cmp(b),
        }
    }

    fn validate(&self, version: &str) -> Result<(), String> {
        Version::parse(version).map(|_| ()).map_err(|e| e.to_string())
    }
}

/// A parsed constraint string: `"=1.2.3"` (exact) or `"1.2.3"` (range floor).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionConstraint {
    pub version: String,
    pub exact: bool,
}

impl VersionConstraint {
    pub fn parse(spec: &str) -> Result<Self, String> {
        let s = spec.trim();
        let (version, exact) = match s.strip_prefix('=') {
            Some(rest) => (rest.trim(), true),
            None => (s, false),
        };
        if version.is_empty() {
            return Err("missing version".to_string());
        }
        if version.starts_with('=') {
            return Err("more than one '=' prefix".to_string());
        }
        Ok(Self {
            version: version.to_string(),
            exact,
        })
    }
}

impl fmt::Display for VersionConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.exact {
            write!(f, "={}", self.version)
        } else {
            f.write_str(&self.version)
        }
    }
}
