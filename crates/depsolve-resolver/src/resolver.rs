//! Best-first branch-and-bound search over partial assignments.
//!
//! The initial state is the propagation closure of a synthetic root unit
//! holding the caller's dependencies and constraints. The search then pops
//! the cheapest state, branches on its first pending dependency, propagates
//! each candidate, drops inconsistent results, and pushes the rest. The first
//! popped state with nothing pending is the solution.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::Arc;

use depsolve_core::catalog::{Catalog, UnitVersionId};
use depsolve_core::config::SolverConfig;
use depsolve_core::constraint::Constraint;
use depsolve_core::unit_version::UnitVersion;
use depsolve_util::errors::{SolveError, SolveResult};

use crate::cost::{CostContext, CostFn, EstimateFn};
use crate::diagnostics::{BranchFailure, DiagnosticReport};
use crate::lists::ChoiceSet;
use crate::propagate::{propagate, Start};
use crate::state::SearchState;

/// Name of the synthetic unit standing for the caller.
const ROOT_NAME: &str = "<root>";

/// Caller-supplied knobs for one resolution.
pub struct ResolveOptions<'a> {
    cost: Option<CostFn<'a>>,
    estimate: Option<EstimateFn<'a>>,
    /// Return the forced closure of the roots without branching.
    pub stop_after_first_propagation: bool,
    /// Fail with [`SolveError::StateLimitExceeded`] after this many pops.
    pub max_states: Option<u64>,
    /// Keep every branch failure in [`Resolution::diagnostics`].
    pub record_diagnostics: bool,
    interrupt: Option<Arc<AtomicBool>>,
}

impl Default for ResolveOptions<'_> {
    fn default() -> Self {
        Self {
            cost: None,
            estimate: None,
            stop_after_first_propagation: false,
            max_states: None,
            record_diagnostics: true,
            interrupt: None,
        }
    }
}

impl<'a> ResolveOptions<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &SolverConfig) -> Self {
        Self {
            stop_after_first_propagation: config.search.stop_after_first_propagation,
            max_states: config.search.max_states,
            record_diagnostics: config.search.record_diagnostics,
            ..Self::default()
        }
    }

    /// Cost of the choices made so far. Defaults to zero.
    pub fn with_cost<F>(mut self, cost: F) -> Self
    where
        F: Fn(&[&UnitVersion], &CostContext<'_>) -> f64 + 'a,
    {
        self.cost = Some(Box::new(cost));
        self
    }

    /// Estimated cost still ahead of a state. Defaults to zero.
    pub fn with_estimate<F>(mut self, estimate: F) -> Self
    where
        F: Fn(&SearchState, &CostContext<'_>) -> f64 + 'a,
    {
        self.estimate = Some(Box::new(estimate));
        self
    }

    pub fn stop_after_first_propagation(mut self, stop: bool) -> Self {
        self.stop_after_first_propagation = stop;
        self
    }

    pub fn max_states(mut self, limit: u64) -> Self {
        self.max_states = Some(limit);
        self
    }

    /// Stop the search once `flag` is set. Checked between queue pops.
    pub fn interrupt(mut self, flag: Arc<AtomicBool>) -> Self {
        self.interrupt = Some(flag);
        self
    }

    fn score(&self, state: &SearchState, ctx: &CostContext<'_>) -> f64 {
        let cost = match &self.cost {
            Some(cost) => cost(state.chosen(ctx.catalog).as_slice(), ctx),
            None => 0.0,
        };
        let estimate = match &self.estimate {
            Some(estimate) => estimate(state, ctx),
            None => 0.0,
        };
        cost + estimate
    }

    fn interrupted(&self) -> bool {
        self.interrupt
            .as_ref()
            .is_some_and(|flag| flag.load(AtomicOrdering::Relaxed))
    }
}

/// Counters describing one search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchStats {
    pub popped: u64,
    pub pushed: u64,
    pub branch_failures: u64,
    /// The package branched on at each expansion, in order.
    pub expansions: Vec<String>,
}

/// A successful resolution: one unit version per required package.
#[derive(Debug)]
pub struct Resolution<'r> {
    catalog: &'r Catalog,
    choices: ChoiceSet,
    pub stats: SearchStats,
    pub diagnostics: DiagnosticReport,
}

impl<'r> Resolution<'r> {
    /// Chosen units in package-name order.
    pub fn iter(&self) -> impl Iterator<Item = &'r UnitVersion> + '_ {
        let catalog = self.catalog;
        self.choices.ids().map(move |id| catalog.unit(id))
    }

    pub fn ids(&self) -> Vec<UnitVersionId> {
        self.choices.ids().collect()
    }

    pub fn get(&self, name: &str) -> Option<&'r UnitVersion> {
        self.choices.get(name).map(|id| self.catalog.unit(id))
    }

    pub fn contains(&self, name: &str, version: &str) -> bool {
        self.get(name).is_some_and(|unit| unit.version() == version)
    }

    /// `(name, version)` pairs in package-name order.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        self.iter()
            .map(|unit| (unit.name().to_string(), unit.version().to_string()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.choices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.choices.is_empty()
    }
}

/// Entry in the priority queue.
struct Queued {
    score: f64,
    depth: usize,
    seq: u64,
    state: SearchState,
}

impl PartialEq for Queued {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Queued {}

impl Ord for Queued {
    // `BinaryHeap` pops the greatest entry: lowest score, then most choices,
    // then earliest pushed.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .score
            .total_cmp(&self.score)
            .then_with(|| self.depth.cmp(&other.depth))
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Queued {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Mutable bookkeeping for one call to [`Resolver::resolve`].
struct Search {
    heap: BinaryHeap<Queued>,
    next_seq: u64,
    stats: SearchStats,
    diagnostics: DiagnosticReport,
    first_failure: Option<BranchFailure>,
    record_diagnostics: bool,
}

impl Search {
    fn new(record_diagnostics: bool) -> Self {
        Self {
            heap: BinaryHeap::new(),
            next_seq: 0,
            stats: SearchStats::default(),
            diagnostics: DiagnosticReport::new(),
            first_failure: None,
            record_diagnostics,
        }
    }

    fn push(&mut self, state: SearchState, score: f64) {
        let depth = state.choices.len();
        self.heap.push(Queued {
            score,
            depth,
            seq: self.next_seq,
            state,
        });
        self.next_seq += 1;
        self.stats.pushed += 1;
    }

    fn fail(&mut self, failure: BranchFailure) {
        tracing::debug!("branch failed: {failure}");
        self.stats.branch_failures += 1;
        if self.first_failure.is_none() {
            self.first_failure = Some(failure.clone());
        }
        if self.record_diagnostics {
            self.diagnostics.add(failure);
        }
    }
}

/// The search engine over a fully populated catalog.
#[derive(Debug)]
pub struct Resolver {
    catalog: Catalog,
}

impl Resolver {
    /// Take ownership of `catalog` and reject cyclic exact pins.
    pub fn new(catalog: Catalog) -> SolveResult<Self> {
        Self::with_config(catalog, &SolverConfig::default())
    }

    pub fn with_config(catalog: Catalog, config: &SolverConfig) -> SolveResult<Self> {
        if config.catalog.validate_exact_pins {
            catalog.validate_exact_pins()?;
        }
        tracing::debug!(
            "resolver ready: {} unit versions, {} constraints",
            catalog.len(),
            catalog.constraint_count()
        );
        Ok(Self { catalog })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Intern a constraint for use as a root constraint.
    ///
    /// Only constraints can be added once resolution is possible; the set of
    /// unit versions is fixed.
    pub fn get_constraint(&mut self, name: &str, spec: &str) -> SolveResult<Constraint> {
        self.catalog.get_constraint(name, spec)
    }

    /// Choose one version for every package reachable from `dependencies`.
    ///
    /// `seed_choices` are fixed before anything else and propagated like any
    /// other choice. The result is all-or-nothing: either every reachable
    /// dependency is decided consistently or an error is returned.
    pub fn resolve<S: AsRef<str>>(
        &self,
        dependencies: &[S],
        constraints: &[Constraint],
        seed_choices: &[UnitVersionId],
        options: &ResolveOptions<'_>,
    ) -> SolveResult<Resolution<'_>> {
        let catalog = &self.catalog;
        let root = root_unit(dependencies, constraints);
        let ctx = CostContext {
            catalog,
            root_dependencies: root.dependencies(),
        };
        tracing::debug!(
            "resolving {} root dependencies with {} root constraints",
            root.dependencies().len(),
            root.constraints().len()
        );

        let mut start = SearchState::new();
        for &seed in seed_choices {
            catalog.get(seed)?;
            start = propagate(catalog, Start::Unit(seed), &start)?;
        }
        start = propagate(catalog, Start::Root(&root), &start)?;
        if let Some(violation) = start.first_violation(catalog) {
            return Err(violation.into());
        }

        let mut search = Search::new(options.record_diagnostics);

        if options.stop_after_first_propagation {
            tracing::debug!("stopping after first propagation: {} choices", start.choices.len());
            return Ok(Resolution {
                catalog,
                choices: start.choices,
                stats: search.stats,
                diagnostics: search.diagnostics,
            });
        }

        let score = options.score(&start, &ctx);
        search.push(start, score);

        let mut cut_off: Option<SearchState> = None;
        let mut solution: Option<SearchState> = None;
        while !search.heap.is_empty() {
            if options.interrupted() {
                tracing::warn!("resolution interrupted after {} states", search.stats.popped);
                return Err(SolveError::Interrupted {
                    explored: search.stats.popped,
                });
            }
            if let Some(limit) = options.max_states {
                if search.stats.popped >= limit {
                    tracing::warn!("resolution hit the state limit of {limit}");
                    return Err(SolveError::StateLimitExceeded { limit });
                }
            }
            let Some(current) = search.heap.pop() else {
                break;
            };
            search.stats.popped += 1;
            tracing::trace!(
                "pop #{}: score {}, {} choices, {} pending",
                search.stats.popped,
                current.score,
                current.depth,
                current.state.dependencies.len()
            );

            if current.score == f64::INFINITY {
                cut_off = Some(current.state);
                break;
            }
            if current.state.is_complete() {
                solution = Some(current.state);
                break;
            }

            match self.neighbors(&current.state, &mut search.stats) {
                Ok(neighbors) => {
                    for next in neighbors {
                        let score = options.score(&next, &ctx);
                        search.push(next, score);
                    }
                }
                Err(failure) => search.fail(failure),
            }
        }

        if let Some(state) = solution {
            tracing::debug!(
                "resolved {} packages after {} states",
                state.choices.len(),
                search.stats.popped
            );
            return Ok(Resolution {
                catalog,
                choices: state.choices,
                stats: search.stats,
                diagnostics: search.diagnostics,
            });
        }

        if let Some(failure) = search.first_failure {
            return Err(failure.into());
        }
        let package = cut_off
            .as_ref()
            .and_then(|state| state.dependencies.peek())
            .or_else(|| root.dependencies().first().map(String::as_str))
            .unwrap_or(ROOT_NAME)
            .to_string();
        Err(SolveError::Unresolvable {
            package,
            message: "every remaining state has infinite cost".to_string(),
        })
    }

    /// Branch on the first pending dependency of `state`.
    fn neighbors(
        &self,
        state: &SearchState,
        stats: &mut SearchStats,
    ) -> Result<Vec<SearchState>, BranchFailure> {
        let catalog = &self.catalog;
        let Some(package) = state.dependencies.peek() else {
            return Ok(Vec::new());
        };
        stats.expansions.push(package.to_string());

        let candidates: Vec<UnitVersionId> = catalog
            .unit_version_ids(package)
            .iter()
            .copied()
            .filter(|&id| {
                state
                    .constraints
                    .for_package(package)
                    .all(|c| catalog.satisfies(c, id))
            })
            .collect();
        if candidates.is_empty() {
            return Err(BranchFailure::NoCandidates {
                package: package.to_string(),
            });
        }

        let base = SearchState {
            dependencies: state.dependencies.remove(package),
            constraints: state.constraints.clone(),
            choices: state.choices.clone(),
        };
        let mut neighbors = Vec::with_capacity(candidates.len());
        let mut last_failure = None;
        for &id in &candidates {
            let next = match propagate(catalog, Start::Unit(id), &base) {
                Ok(next) => next,
                Err(failure) => {
                    last_failure = Some(failure);
                    continue;
                }
            };
            match next.first_violation(catalog) {
                Some(violation) => last_failure = Some(violation),
                None => neighbors.push(next),
            }
        }

        if neighbors.is_empty() {
            return Err(BranchFailure::NoConsistentNeighbor {
                package: package.to_string(),
                tried: candidates.len(),
                last: last_failure.map(Box::new),
            });
        }
        Ok(neighbors)
    }
}

/// The synthetic unit holding the caller's dependencies and constraints.
fn root_unit<S: AsRef<str>>(dependencies: &[S], constraints: &[Constraint]) -> UnitVersion {
    let mut root = UnitVersion::new(ROOT_NAME, "1.0.0", "0.0.0");
    for dep in dependencies {
        // Repeats collapse into one dependency.
        let _ = root.add_dependency(dep.as_ref());
    }
    for c in constraints {
        let _ = root.add_constraint(c.clone());
    }
    root
}
