//! Cost inputs for the best-first search.
//!
//! The search orders states by `cost(choices) + estimate(state)`, lowest
//! first. Both functions are supplied by the caller; the helpers here cover
//! the common preferences.

use std::cmp::Ordering;

use depsolve_core::catalog::Catalog;
use depsolve_core::unit_version::UnitVersion;

use crate::state::SearchState;

/// Read-only context handed to cost and estimate functions.
#[derive(Debug, Clone, Copy)]
pub struct CostContext<'a> {
    pub catalog: &'a Catalog,
    /// The dependency names the caller asked to resolve, deduplicated.
    pub root_dependencies: &'a [String],
}

pub type CostFn<'a> = Box<dyn Fn(&[&UnitVersion], &CostContext<'_>) -> f64 + 'a>;
pub type EstimateFn<'a> = Box<dyn Fn(&SearchState, &CostContext<'_>) -> f64 + 'a>;

/// One point for every choice that is not the newest registered version.
pub fn prefer_latest(choices: &[&UnitVersion], ctx: &CostContext<'_>) -> f64 {
    choices
        .iter()
        .filter(|unit| ctx.catalog.latest_version(unit.name()) != Some(unit.version()))
        .count() as f64
}

/// One point for every choice that is not the oldest registered version.
pub fn prefer_oldest(choices: &[&UnitVersion], ctx: &CostContext<'_>) -> f64 {
    let comparator = ctx.catalog.comparator();
    choices
        .iter()
        .filter(|unit| {
            ctx.catalog
                .unit_versions(unit.name())
                .any(|other| comparator.compare(other.version(), unit.version()) == Ordering::Less)
        })
        .count() as f64
}

/// Estimate: one point per pending dependency.
pub fn pending_dependencies(state: &SearchState, _ctx: &CostContext<'_>) -> f64 {
    state.dependencies.len() as f64
}
