//! Catalog entries: one concrete version of one package.

use std::collections::BTreeSet;
use std::fmt;

use depsolve_util::errors::{SolveError, SolveResult};

use crate::catalog::{Catalog, UnitVersionId};
use crate::constraint::{Constraint, ConstraintId};

/// One version of one package with its declared dependencies and constraints.
///
/// Dependencies and constraints are appended before the unit is registered
/// with a [`Catalog`]; after registration the catalog only hands out shared
/// references, so a registered unit is read-only.
#[derive(Debug, Clone)]
pub struct UnitVersion {
    name: String,
    version: String,
    ecv: String,
    dependencies: Vec<String>,
    constraints: Vec<Constraint>,
}

/// Everything reachable from a unit by following exact pins on its dependencies.
#[derive(Debug, Clone, Default)]
pub struct ExactClosure {
    /// Exact constraints in discovery order, each listed once.
    pub constraints: Vec<Constraint>,
    /// The witness of each entry in `constraints`, in the same order.
    pub versions: Vec<UnitVersionId>,
    /// Dependency names left undecided by the closure.
    pub inexact_dependencies: Vec<String>,
}

impl UnitVersion {
    /// `ecv` is the earliest version this release stays compatible with.
    pub fn new(name: &str, version: &str, ecv: &str) -> Self {
        Self {
            name: name.to_string(),
            version: version.to_string(),
            ecv: ecv.to_string(),
            dependencies: Vec::new(),
            constraints: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn ecv(&self) -> &str {
        &self.ecv
    }

    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn depends_on(&self, name: &str) -> bool {
        self.dependencies.iter().any(|d| d == name)
    }

    pub fn add_dependency(&mut self, name: &str) -> SolveResult<()> {
        if self.depends_on(name) {
            return Err(SolveError::DuplicateDependency {
                unit: self.to_string(),
                dependency: name.to_string(),
            });
        }
        self.dependencies.push(name.to_string());
        Ok(())
    }

    pub fn add_constraint(&mut self, constraint: Constraint) -> SolveResult<()> {
        if self.constraints.contains(&constraint) {
            return Err(SolveError::DuplicateConstraint {
                unit: self.to_string(),
                constraint: constraint.to_string(),
            });
        }
        self.constraints.push(constraint);
        Ok(())
    }

    pub fn exact_constraints(&self) -> impl Iterator<Item = &Constraint> {
        self.constraints.iter().filter(|c| c.is_exact())
    }

    pub fn loose_constraints(&self) -> impl Iterator<Item = &Constraint> {
        self.constraints.iter().filter(|c| !c.is_exact())
    }

    /// Exact constraints that also name one of this unit's dependencies.
    pub fn pinned_dependencies(&self) -> impl Iterator<Item = &Constraint> {
        self.exact_constraints().filter(|c| self.depends_on(c.name()))
    }

    /// Depth-first closure over pinned dependencies.
    ///
    /// Starts from this unit's pinned dependencies and follows the pinned
    /// dependencies of each pin's witness. Fails with
    /// [`SolveError::MissingExactWitness`] when a pin names a version the
    /// catalog does not have.
    pub fn exact_closure(&self, catalog: &Catalog) -> SolveResult<ExactClosure> {
        let mut closure = ExactClosure::default();
        let mut seen = BTreeSet::new();
        self.collect_exact(catalog, &mut closure, &mut seen)?;

        let pinned_names: BTreeSet<&str> = closure.constraints.iter().map(|c| c.name()).collect();
        let mut pending = BTreeSet::new();
        let witness_deps = closure
            .versions
            .iter()
            .flat_map(|&id| catalog.unit(id).dependencies().iter());
        for dep in witness_deps.chain(self.dependencies.iter()) {
            if !pinned_names.contains(dep.as_str()) && pending.insert(dep.clone()) {
                closure.inexact_dependencies.push(dep.clone());
            }
        }
        Ok(closure)
    }

    fn collect_exact(
        &self,
        catalog: &Catalog,
        closure: &mut ExactClosure,
        seen: &mut BTreeSet<ConstraintId>,
    ) -> SolveResult<()> {
        let mut fresh = Vec::new();
        for c in self.pinned_dependencies() {
            if !seen.insert(c.id()) {
                continue;
            }
            let witness =
                c.satisfying_unit_version(catalog)
                    .ok_or_else(|| SolveError::MissingExactWitness {
                        package: c.name().to_string(),
                        constraint: c.to_string(),
                    })?;
            closure.constraints.push(c.clone());
            closure.versions.push(witness);
            fresh.push(witness);
        }
        for witness in fresh {
            catalog.unit(witness).collect_exact(catalog, closure, seen)?;
        }
        Ok(())
    }

    pub fn exact_transitive_constraints(&self, catalog: &Catalog) -> SolveResult<Vec<Constraint>> {
        Ok(self.exact_closure(catalog)?.constraints)
    }

    pub fn exact_transitive_dependency_versions(
        &self,
        catalog: &Catalog,
    ) -> SolveResult<Vec<UnitVersionId>> {
        Ok(self.exact_closure(catalog)?.versions)
    }

    /// Own dependencies plus those of every exact-closure witness, minus the
    /// packages the closure already pins.
    pub fn inexact_transitive_dependencies(&self, catalog: &Catalog) -> SolveResult<Vec<String>> {
        Ok(self.exact_closure(catalog)?.inexact_dependencies)
    }
}

impl fmt::Display for UnitVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.version)
    }
}
