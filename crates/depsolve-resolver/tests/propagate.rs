use depsolve_core::catalog::{Catalog, UnitVersionId};
use depsolve_core::unit_version::UnitVersion;
use depsolve_resolver::diagnostics::BranchFailure;
use depsolve_resolver::propagate::{propagate, Start};
use depsolve_resolver::state::SearchState;

fn add(
    catalog: &mut Catalog,
    name: &str,
    version: &str,
    deps: &[&str],
    constraints: &[(&str, &str)],
) -> UnitVersionId {
    let mut unit = UnitVersion::new(name, version, version);
    for dep in deps {
        unit.add_dependency(dep).unwrap();
    }
    for (dep, spec) in constraints {
        unit.add_constraint(catalog.get_constraint(dep, spec).unwrap())
            .unwrap();
    }
    catalog.add_unit_version(unit).unwrap()
}

fn chosen(catalog: &Catalog, state: &SearchState) -> Vec<String> {
    state
        .chosen(catalog)
        .iter()
        .map(|unit| unit.to_string())
        .collect()
}

#[test]
fn test_unit_start_chooses_itself_and_closure() {
    let mut catalog = Catalog::new();
    let a = add(&mut catalog, "a", "1.0.0", &["b", "d"], &[("b", "=1.0.0")]);
    add(&mut catalog, "b", "1.0.0", &["c"], &[("c", "1.0.0")]);
    add(&mut catalog, "c", "1.0.0", &[], &[]);
    add(&mut catalog, "d", "1.0.0", &[], &[]);

    let state = propagate(&catalog, Start::Unit(a), &SearchState::new()).unwrap();
    assert_eq!(chosen(&catalog, &state), vec!["a@1.0.0", "b@1.0.0"]);
    let pending: Vec<&str> = state.dependencies.iter().collect();
    assert_eq!(pending, vec!["c", "d"]);
    // a's pin and b's floor are both in force.
    assert_eq!(state.constraints.len(), 2);
    assert!(state.is_consistent(&catalog));
    assert!(!state.is_complete());
}

#[test]
fn test_root_start_is_never_chosen() {
    let mut catalog = Catalog::new();
    add(&mut catalog, "a", "1.0.0", &[], &[]);
    let mut root = UnitVersion::new("root", "1.0.0", "0.0.0");
    root.add_dependency("a").unwrap();
    root.add_constraint(catalog.get_constraint("a", "=1.0.0").unwrap())
        .unwrap();

    let state = propagate(&catalog, Start::Root(&root), &SearchState::new()).unwrap();
    assert_eq!(chosen(&catalog, &state), vec!["a@1.0.0"]);
    assert!(state.is_complete());
}

#[test]
fn test_parent_state_is_untouched() {
    let mut catalog = Catalog::new();
    let a = add(&mut catalog, "a", "1.0.0", &["b"], &[]);
    add(&mut catalog, "b", "1.0.0", &[], &[]);

    let parent = SearchState::new();
    let child = propagate(&catalog, Start::Unit(a), &parent).unwrap();
    assert!(parent.choices.is_empty());
    assert!(parent.dependencies.is_empty());
    assert_eq!(child.choices.len(), 1);
    assert!(child.dependencies.contains("b"));
}

#[test]
fn test_pin_from_new_unit_forces_pending_dependency() {
    let mut catalog = Catalog::new();
    let a = add(&mut catalog, "a", "1.0.0", &[], &[]);
    // x pins c without depending on it; c is pending through a.
    let x = add(&mut catalog, "x", "1.0.0", &[], &[("c", "=2.0.0")]);
    add(&mut catalog, "c", "1.0.0", &[], &[]);
    add(&mut catalog, "c", "2.0.0", &[], &[]);

    let parent = propagate(&catalog, Start::Unit(a), &SearchState::new()).unwrap();
    let parent = SearchState {
        dependencies: parent.dependencies.push("c"),
        ..parent
    };
    let state = propagate(&catalog, Start::Unit(x), &parent).unwrap();
    assert_eq!(
        chosen(&catalog, &state),
        vec!["a@1.0.0", "c@2.0.0", "x@1.0.0"]
    );
    assert!(state.is_complete());
}

#[test]
fn test_own_pin_is_chosen_without_a_dependency() {
    let mut catalog = Catalog::new();
    let x = add(&mut catalog, "x", "1.0.0", &[], &[("c", "=1.0.0")]);
    add(&mut catalog, "c", "1.0.0", &[], &[]);

    let state = propagate(&catalog, Start::Unit(x), &SearchState::new()).unwrap();
    assert_eq!(chosen(&catalog, &state), vec!["c@1.0.0", "x@1.0.0"]);
    assert_eq!(state.constraints.exact_for("c").count(), 1);
    assert!(state.is_complete());
}

#[test]
fn test_own_pin_without_witness_fails() {
    let mut catalog = Catalog::new();
    let x = add(&mut catalog, "x", "1.0.0", &[], &[("c", "=3.0.0")]);
    add(&mut catalog, "c", "1.0.0", &[], &[]);

    let failure = propagate(&catalog, Start::Unit(x), &SearchState::new()).unwrap_err();
    assert_eq!(
        failure,
        BranchFailure::MissingWitness {
            package: "c".to_string(),
            constraint: "c@=3.0.0".to_string(),
        }
    );
}

#[test]
fn test_pin_of_closure_witness_waits_for_dependency() {
    let mut catalog = Catalog::new();
    let a = add(&mut catalog, "a", "1.0.0", &["w"], &[("w", "=1.0.0")]);
    // w pins c without depending on it; only pending names are forced.
    add(&mut catalog, "w", "1.0.0", &[], &[("c", "=1.0.0")]);
    add(&mut catalog, "c", "1.0.0", &[], &[]);

    let state = propagate(&catalog, Start::Unit(a), &SearchState::new()).unwrap();
    assert_eq!(chosen(&catalog, &state), vec!["a@1.0.0", "w@1.0.0"]);
    assert_eq!(state.constraints.exact_for("c").count(), 1);
}

#[test]
fn test_second_version_of_chosen_package_is_a_conflict() {
    let mut catalog = Catalog::new();
    let c1 = add(&mut catalog, "c", "1.0.0", &[], &[]);
    add(&mut catalog, "c", "2.0.0", &[], &[]);
    let a = add(&mut catalog, "a", "1.0.0", &["c"], &[("c", "=2.0.0")]);

    let seeded = propagate(&catalog, Start::Unit(c1), &SearchState::new()).unwrap();
    let failure = propagate(&catalog, Start::Unit(a), &seeded).unwrap_err();
    assert_eq!(
        failure,
        BranchFailure::Conflict {
            package: "c".to_string(),
            chosen: "c@1.0.0".to_string(),
            forced: "c@2.0.0".to_string(),
        }
    );
}

#[test]
fn test_missing_witness_fails_branch() {
    let mut catalog = Catalog::new();
    let a = add(&mut catalog, "a", "1.0.0", &["b"], &[("b", "=5.0.0")]);
    let failure = propagate(&catalog, Start::Unit(a), &SearchState::new()).unwrap_err();
    assert_eq!(
        failure,
        BranchFailure::MissingWitness {
            package: "b".to_string(),
            constraint: "b@=5.0.0".to_string(),
        }
    );
}

#[test]
fn test_first_violation_reports_unit_and_constraint() {
    let mut catalog = Catalog::new();
    let c1 = add(&mut catalog, "c", "1.0.0", &[], &[]);
    let a = add(&mut catalog, "a", "1.0.0", &[], &[("c", "2.0.0")]);

    let state = propagate(&catalog, Start::Unit(c1), &SearchState::new()).unwrap();
    let state = propagate(&catalog, Start::Unit(a), &state).unwrap();
    assert_eq!(
        state.first_violation(&catalog),
        Some(BranchFailure::Violation {
            package: "c".to_string(),
            unit: "c@1.0.0".to_string(),
            constraint: "c@2.0.0".to_string(),
        })
    );
}
