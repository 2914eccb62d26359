//! Exact-dependency propagation: everything forced before any branching.
//!
//! Starting from one unit, the engine walks a FIFO worklist. Each unit it
//! pops is chosen, its exact closure is chosen with it, and its undecided
//! dependencies become pending. Every exact pin the unit declares enqueues
//! that pin's witness, as does every pin in force that lands on a pending
//! package. The walk ends when nothing more is forced.

use std::collections::{BTreeSet, VecDeque};

use depsolve_core::catalog::{Catalog, UnitVersionId};
use depsolve_core::constraint::Constraint;
use depsolve_core::unit_version::UnitVersion;
use depsolve_util::errors::SolveError;

use crate::diagnostics::BranchFailure;
use crate::lists::ChoiceSet;
use crate::state::SearchState;

/// Where propagation starts.
#[derive(Debug, Clone, Copy)]
pub enum Start<'u> {
    /// A unit that is not in the catalog and never becomes a choice.
    Root(&'u UnitVersion),
    /// A registered unit, chosen as the first step.
    Unit(UnitVersionId),
}

/// Propagate forced choices from `start` on top of `state`.
///
/// Assumes `state` itself is already propagated, so only combinations
/// involving the newly added units are inspected.
pub fn propagate(
    catalog: &Catalog,
    start: Start<'_>,
    state: &SearchState,
) -> Result<SearchState, BranchFailure> {
    let mut dependencies = state.dependencies.clone();
    let mut constraints = state.constraints.clone();
    let mut choices = state.choices.clone();

    let mut queue: VecDeque<Start<'_>> = VecDeque::new();
    let mut seen: BTreeSet<&str> = BTreeSet::new();
    if let Start::Unit(id) = start {
        seen.insert(catalog.unit(id).name());
    }
    queue.push_back(start);

    while let Some(item) = queue.pop_front() {
        let unit = match item {
            Start::Root(unit) => unit,
            Start::Unit(id) => {
                choices = choose(catalog, &choices, id)?;
                catalog.unit(id)
            }
        };
        tracing::trace!("propagating {unit}");

        let closure = unit.exact_closure(catalog).map_err(|e| match e {
            SolveError::MissingExactWitness {
                package,
                constraint,
            } => BranchFailure::MissingWitness {
                package,
                constraint,
            },
            other => BranchFailure::Rejected {
                package: unit.name().to_string(),
                message: other.to_string(),
            },
        })?;

        let new_constraints: Vec<&Constraint> = closure
            .versions
            .iter()
            .flat_map(|&id| catalog.unit(id).constraints())
            .chain(unit.constraints())
            .collect();

        dependencies = dependencies.union(&closure.inexact_dependencies);
        constraints = constraints.union(new_constraints.iter().copied());
        for &id in &closure.versions {
            choices = choose(catalog, &choices, id)?;
        }
        dependencies = dependencies.retain(|name| !choices.contains_name(name));

        // Pins in force that land on something pending, then every pin the
        // unit itself declares, pending or not.
        let touched = unit
            .dependencies()
            .iter()
            .chain(closure.inexact_dependencies.iter());
        let pending_pins = touched
            .flat_map(|name| constraints.exact_for(name))
            .chain(new_constraints.iter().copied().filter(|c| c.is_exact()))
            .filter(|c| dependencies.contains(c.name()));
        let forced = pending_pins.chain(unit.exact_constraints());

        let mut enqueue = Vec::new();
        for pin in forced {
            let witness = pin.satisfying_unit_version(catalog).ok_or_else(|| {
                BranchFailure::MissingWitness {
                    package: pin.name().to_string(),
                    constraint: pin.to_string(),
                }
            })?;
            if !choices.contains(witness) {
                enqueue.push(witness);
            }
        }
        for witness in enqueue {
            let name = catalog.unit(witness).name();
            if seen.insert(name) {
                queue.push_back(Start::Unit(witness));
            }
        }
    }

    Ok(SearchState {
        dependencies,
        constraints,
        choices,
    })
}

fn choose(
    catalog: &Catalog,
    choices: &ChoiceSet,
    id: UnitVersionId,
) -> Result<ChoiceSet, BranchFailure> {
    let unit = catalog.unit(id);
    choices
        .insert(unit.name(), id)
        .map_err(|existing| BranchFailure::Conflict {
            package: unit.name().to_string(),
            chosen: catalog.unit(existing).to_string(),
            forced: unit.to_string(),
        })
}
