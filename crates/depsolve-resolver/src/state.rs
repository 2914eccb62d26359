//! Search states: one node of the branch-and-bound tree.

use depsolve_core::catalog::Catalog;
use depsolve_core::unit_version::UnitVersion;

use crate::diagnostics::BranchFailure;
use crate::lists::{ChoiceSet, ConstraintList, DependencyList};

/// A snapshot of pending dependencies, constraints in force, and fixed choices.
///
/// States are never changed after creation. Cloning is cheap because the
/// three collections share storage.
#[derive(Debug, Clone, Default)]
pub struct SearchState {
    pub dependencies: DependencyList,
    pub constraints: ConstraintList,
    pub choices: ChoiceSet,
}

impl SearchState {
    pub fn new() -> Self {
        Self::default()
    }

    /// No dependency is left undecided.
    pub fn is_complete(&self) -> bool {
        self.dependencies.is_empty()
    }

    pub fn is_consistent(&self, catalog: &Catalog) -> bool {
        self.first_violation(catalog).is_none()
    }

    /// The first chosen unit, in name order, that violates a constraint naming it.
    pub fn first_violation(&self, catalog: &Catalog) -> Option<BranchFailure> {
        self.choices.iter().find_map(|(name, id)| {
            self.constraints
                .for_package(name)
                .find(|c| !catalog.satisfies(c, id))
                .map(|c| BranchFailure::Violation {
                    package: name.to_string(),
                    unit: catalog.unit(id).to_string(),
                    constraint: c.to_string(),
                })
        })
    }

    /// Chosen units in name order.
    pub fn chosen<'c>(&self, catalog: &'c Catalog) -> Vec<&'c UnitVersion> {
        self.choices.ids().map(|id| catalog.unit(id)).collect()
    }
}
