//! The registry of known unit versions and the constraint interning table.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use depsolve_util::errors::{SolveError, SolveResult};

use crate::constraint::{Constraint, ConstraintId};
use crate::graph::ExactPinGraph;
use crate::unit_version::UnitVersion;
use crate::version::{SemverComparator, VersionComparator, VersionConstraint};

/// Index of a registered unit version inside its catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UnitVersionId(pub(crate) usize);

impl UnitVersionId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// All known unit versions, indexed by package name.
///
/// The catalog must be fully populated before resolution starts. Every
/// constraint used by registered units should come from
/// [`Catalog::get_constraint`] so that equal constraints share one entry.
pub struct Catalog {
    comparator: Arc<dyn VersionComparator>,
    units: Vec<UnitVersion>,
    by_name: BTreeMap<String, Vec<UnitVersionId>>,
    latest: BTreeMap<String, UnitVersionId>,
    by_coordinate: BTreeMap<(String, String), UnitVersionId>,
    constraints: BTreeMap<(String, String), Constraint>,
}

impl Catalog {
    /// An empty catalog ordering versions with [`SemverComparator`].
    pub fn new() -> Self {
        Self::with_comparator(Arc::new(SemverComparator))
    }

    pub fn with_comparator(comparator: Arc<dyn VersionComparator>) -> Self {
        Self {
            comparator,
            units: Vec::new(),
            by_name: BTreeMap::new(),
            latest: BTreeMap::new(),
            by_coordinate: BTreeMap::new(),
            constraints: BTreeMap::new(),
        }
    }

    pub fn comparator(&self) -> &dyn VersionComparator {
        self.comparator.as_ref()
    }

    /// Register a unit version. Fails if `(name, version)` is already known.
    pub fn add_unit_version(&mut self, unit: UnitVersion) -> SolveResult<UnitVersionId> {
        let coordinate = (unit.name().to_string(), unit.version().to_string());
        if self.by_coordinate.contains_key(&coordinate) {
            return Err(SolveError::DuplicateUnitVersion {
                name: coordinate.0,
                version: coordinate.1,
            });
        }
        for version in [unit.version(), unit.ecv()] {
            self.comparator
                .validate(version)
                .map_err(|reason| SolveError::InvalidVersion {
                    version: version.to_string(),
                    reason,
                })?;
        }

        let id = UnitVersionId(self.units.len());
        let newer = match self.latest.get(unit.name()) {
            Some(&current) => self
                .comparator
                .lt(self.units[current.0].version(), unit.version()),
            None => true,
        };
        if newer {
            self.latest.insert(unit.name().to_string(), id);
        }
        self.by_name
            .entry(unit.name().to_string())
            .or_default()
            .push(id);
        self.by_coordinate.insert(coordinate, id);
        tracing::trace!("registered {unit}");
        self.units.push(unit);
        Ok(id)
    }

    /// The interned constraint for `name` and a constraint string.
    ///
    /// `spec` is `"=X.Y.Z"` for an exact pin or `"X.Y.Z"` for a range floor.
    /// Repeated calls with equal arguments return the same entry; the key is
    /// the normalized spec, so `" =1.0.0"` and `"=1.0.0"` share one entry.
    pub fn get_constraint(&mut self, name: &str, spec: &str) -> SolveResult<Constraint> {
        let invalid = |reason: String| SolveError::InvalidConstraint {
            name: name.to_string(),
            constraint: spec.to_string(),
            reason,
        };
        if name.is_empty() {
            return Err(invalid("empty package name".to_string()));
        }
        let parsed = VersionConstraint::parse(spec).map_err(invalid)?;

        let key = (name.to_string(), parsed.to_string());
        if let Some(existing) = self.constraints.get(&key) {
            return Ok(existing.clone());
        }
        self.comparator.validate(&parsed.version).map_err(invalid)?;

        let id = ConstraintId(self.constraints.len() as u32);
        let constraint = Constraint::new(id, name, &parsed.version, parsed.exact);
        self.constraints.insert(key, constraint.clone());
        Ok(constraint)
    }

    pub fn unit(&self, id: UnitVersionId) -> &UnitVersion {
        &self.units[id.0]
    }

    /// Like [`Catalog::unit`], for ids that may come from another catalog.
    pub fn get(&self, id: UnitVersionId) -> SolveResult<&UnitVersion> {
        self.units
            .get(id.0)
            .ok_or(SolveError::UnknownUnitVersionId { index: id.0 })
    }

    /// Registered versions of `name`, in registration order.
    pub fn unit_version_ids(&self, name: &str) -> &[UnitVersionId] {
        self.by_name.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn unit_versions(&self, name: &str) -> impl Iterator<Item = &UnitVersion> {
        self.unit_version_ids(name).iter().map(|&id| self.unit(id))
    }

    /// The greatest registered version of `name`.
    pub fn latest_version(&self, name: &str) -> Option<&str> {
        self.latest.get(name).map(|&id| self.unit(id).version())
    }

    pub fn latest_unit_version(&self, name: &str) -> Option<UnitVersionId> {
        self.latest.get(name).copied()
    }

    pub fn lookup(&self, name: &str, version: &str) -> Option<UnitVersionId> {
        self.by_coordinate
            .get(&(name.to_string(), version.to_string()))
            .copied()
    }

    /// Like [`Catalog::lookup`] but failing with a descriptive error.
    pub fn require(&self, name: &str, version: &str) -> SolveResult<UnitVersionId> {
        self.lookup(name, version)
            .ok_or_else(|| SolveError::UnknownUnitVersion {
                name: name.to_string(),
                version: version.to_string(),
            })
    }

    pub fn satisfies(&self, constraint: &Constraint, id: UnitVersionId) -> bool {
        constraint.is_satisfied(self.unit(id), self.comparator())
    }

    /// All package names with at least one registered version, sorted.
    pub fn package_names(&self) -> impl Iterator<Item = &str> {
        self.by_name.keys().map(String::as_str)
    }

    pub fn ids(&self) -> impl Iterator<Item = UnitVersionId> {
        (0..self.units.len()).map(UnitVersionId)
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    /// Reject catalogs whose exact pins form a cycle.
    pub fn validate_exact_pins(&self) -> SolveResult<()> {
        let graph = ExactPinGraph::build(self);
        match graph.find_cycle() {
            Some(cycle) => Err(SolveError::ExactPinCycle {
                cycle: cycle.iter().map(|&id| self.unit(id).to_string()).collect(),
            }),
            None => Ok(()),
        }
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Catalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Catalog")
            .field("comparator", &self.comparator)
            .field("units", &self.units.len())
            .field("packages", &self.by_name.len())
            .field("constraints", &self.constraints.len())
            .finish()
    }
}
