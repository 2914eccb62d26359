//! Persistent collections shared between search states.
//!
//! Every operation that changes a collection returns a new value and leaves
//! the receiver untouched. Values share their storage behind an [`Arc`] until
//! one of them is changed, at which point only that value copies. A state
//! held by the priority queue therefore stays valid no matter which sibling
//! branch is explored next.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use depsolve_core::catalog::UnitVersionId;
use depsolve_core::constraint::Constraint;

/// Pending dependency names, iterated in name order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DependencyList {
    names: Arc<BTreeSet<String>>,
}

impl DependencyList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    #[must_use]
    pub fn push(&self, name: &str) -> Self {
        if self.contains(name) {
            return self.clone();
        }
        let mut next = self.clone();
        Arc::make_mut(&mut next.names).insert(name.to_string());
        next
    }

    #[must_use]
    pub fn remove(&self, name: &str) -> Self {
        if !self.contains(name) {
            return self.clone();
        }
        let mut next = self.clone();
        Arc::make_mut(&mut next.names).remove(name);
        next
    }

    /// Add every name in `names`, copying the storage at most once.
    #[must_use]
    pub fn union<'n>(&self, names: impl IntoIterator<Item = &'n String>) -> Self {
        let fresh: Vec<&String> = names.into_iter().filter(|n| !self.contains(n)).collect();
        if fresh.is_empty() {
            return self.clone();
        }
        let mut next = self.clone();
        let set = Arc::make_mut(&mut next.names);
        set.extend(fresh.into_iter().cloned());
        next
    }

    /// Keep only the names for which `keep` holds.
    #[must_use]
    pub fn retain(&self, mut keep: impl FnMut(&str) -> bool) -> Self {
        if self.names.iter().all(|n| keep(n)) {
            return self.clone();
        }
        let kept: BTreeSet<String> = self.names.iter().filter(|n| keep(n)).cloned().collect();
        Self {
            names: Arc::new(kept),
        }
    }

    /// The next dependency to branch on.
    pub fn peek(&self) -> Option<&str> {
        self.names.first().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for DependencyList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            names: Arc::new(iter.into_iter().map(Into::into).collect()),
        }
    }
}

/// The constraints on one package, split by exactness and keyed by version.
#[derive(Debug, Clone, Default)]
struct PackageConstraints {
    exact: BTreeMap<String, Constraint>,
    inexact: BTreeMap<String, Constraint>,
}

impl PackageConstraints {
    fn slot(&self, c: &Constraint) -> &BTreeMap<String, Constraint> {
        if c.is_exact() {
            &self.exact
        } else {
            &self.inexact
        }
    }

    fn slot_mut(&mut self, c: &Constraint) -> &mut BTreeMap<String, Constraint> {
        if c.is_exact() {
            &mut self.exact
        } else {
            &mut self.inexact
        }
    }
}

/// Accumulated constraints, looked up by package name.
#[derive(Debug, Clone, Default)]
pub struct ConstraintList {
    by_name: Arc<BTreeMap<String, Arc<PackageConstraints>>>,
    len: usize,
}

impl ConstraintList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, c: &Constraint) -> bool {
        self.by_name
            .get(c.name())
            .is_some_and(|pkg| pkg.slot(c).contains_key(c.version()))
    }

    #[must_use]
    pub fn push(&self, c: &Constraint) -> Self {
        self.union(std::iter::once(c))
    }

    /// Add every constraint in `constraints`, copying the storage at most once.
    #[must_use]
    pub fn union<'c>(&self, constraints: impl IntoIterator<Item = &'c Constraint>) -> Self {
        let mut next: Option<Self> = None;
        for c in constraints {
            let current = next.as_ref().unwrap_or(self);
            if current.contains(c) {
                continue;
            }
            let target = next.get_or_insert_with(|| self.clone());
            let by_name = Arc::make_mut(&mut target.by_name);
            let pkg = by_name.entry(c.name().to_string()).or_default();
            Arc::make_mut(pkg)
                .slot_mut(c)
                .insert(c.version().to_string(), c.clone());
            target.len += 1;
        }
        next.unwrap_or_else(|| self.clone())
    }

    /// Constraints naming `name`: exact ones first, then ranges, each by version.
    pub fn for_package(&self, name: &str) -> impl Iterator<Item = &Constraint> {
        self.by_name
            .get(name)
            .into_iter()
            .flat_map(|pkg| pkg.exact.values().chain(pkg.inexact.values()))
    }

    pub fn exact_for(&self, name: &str) -> impl Iterator<Item = &Constraint> {
        self.by_name
            .get(name)
            .into_iter()
            .flat_map(|pkg| pkg.exact.values())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Constraint> {
        self.by_name.keys().flat_map(|name| self.for_package(name))
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Fixed choices, at most one unit version per package name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChoiceSet {
    by_name: Arc<BTreeMap<String, UnitVersionId>>,
}

impl ChoiceSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fix `id` as the choice for `name`.
    ///
    /// Choosing the same unit again is a no-op. Choosing a different unit for
    /// an already decided package fails with the existing choice.
    pub fn insert(&self, name: &str, id: UnitVersionId) -> Result<Self, UnitVersionId> {
        match self.by_name.get(name) {
            Some(&existing) if existing == id => Ok(self.clone()),
            Some(&existing) => Err(existing),
            None => {
                let mut next = self.clone();
                Arc::make_mut(&mut next.by_name).insert(name.to_string(), id);
                Ok(next)
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<UnitVersionId> {
        self.by_name.get(name).copied()
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn contains(&self, id: UnitVersionId) -> bool {
        self.by_name.values().any(|&chosen| chosen == id)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// `(name, id)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, UnitVersionId)> {
        self.by_name.iter().map(|(name, &id)| (name.as_str(), id))
    }

    pub fn ids(&self) -> impl Iterator<Item = UnitVersionId> + '_ {
        self.by_name.values().copied()
    }
}
