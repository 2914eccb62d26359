//! Interned version constraints.
//!
//! A [`Constraint`] is a cheap handle to an immutable record owned by the
//! catalog's interning table. Equality, ordering and hashing use only the
//! interned id, so two handles are equal exactly when the catalog handed out
//! the same entry for them.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::catalog::{Catalog, UnitVersionId};
use crate::unit_version::UnitVersion;
use crate::version::VersionComparator;

/// Identifier assigned by the catalog when a constraint is first interned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConstraintId(pub(crate) u32);

impl ConstraintId {
    pub fn index(self) -> u32 {
        self.0
    }
}

#[derive(Debug)]
struct ConstraintData {
    id: ConstraintId,
    name: String,
    version: String,
    exact: bool,
}

/// A predicate over `(package name, version)`: an exact pin or a range floor.
#[derive(Debug, Clone)]
pub struct Constraint(Arc<ConstraintData>);

impl Constraint {
    pub(crate) fn new(id: ConstraintId, name: &str, version: &str, exact: bool) -> Self {
        Self(Arc::new(ConstraintData {
            id,
            name: name.to_string(),
            version: version.to_string(),
            exact,
        }))
    }

    pub fn id(&self) -> ConstraintId {
        self.0.id
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// The pinned version for exact constraints, the floor for ranges.
    pub fn version(&self) -> &str {
        &self.0.version
    }

    pub fn is_exact(&self) -> bool {
        self.0.exact
    }

    /// Does `unit` satisfy this constraint?
    ///
    /// Exact constraints accept only the identical version string. Range
    /// constraints accept a unit whose version is at least the floor and
    /// whose earliest compatible version is at most the floor. A unit with a
    /// different name is never satisfying; callers filter by name first.
    pub fn is_satisfied(&self, unit: &UnitVersion, comparator: &dyn VersionComparator) -> bool {
        if unit.name() != self.name() {
            return false;
        }
        if self.is_exact() {
            return unit.version() == self.version();
        }
        comparator.lte(self.version(), unit.version()) && comparator.lte(unit.ecv(), self.version())
    }

    /// Any registered unit version satisfying this constraint.
    ///
    /// Returns the first match in registration order. Exact constraints have
    /// at most one match in a well-formed catalog.
    pub fn satisfying_unit_version(&self, catalog: &Catalog) -> Option<UnitVersionId> {
        catalog
            .unit_version_ids(self.name())
            .iter()
            .copied()
            .find(|&id| self.is_satisfied(catalog.unit(id), catalog.comparator()))
    }
}

impl PartialEq for Constraint {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for Constraint {}

impl Hash for Constraint {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}

impl Ord for Constraint {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id().cmp(&other.id())
    }
}

impl PartialOrd for Constraint {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = if self.is_exact() { "=" } else { "" };
        write!(f, "{}@{}{}", self.name(), prefix, self.version())
    }
}
