use depsolve_core::catalog::Catalog;
use depsolve_core::unit_version::UnitVersion;
use depsolve_util::errors::SolveError;

/// a pins b, b pins c, c depends loosely on d.
fn chain() -> Catalog {
    let mut catalog = Catalog::new();
    let pin_b = catalog.get_constraint("b", "=1.0.0").unwrap();
    let pin_c = catalog.get_constraint("c", "=2.0.0").unwrap();
    let floor_d = catalog.get_constraint("d", "1.0.0").unwrap();

    let mut a = UnitVersion::new("a", "1.0.0", "1.0.0");
    a.add_dependency("b").unwrap();
    a.add_dependency("e").unwrap();
    a.add_constraint(pin_b).unwrap();
    catalog.add_unit_version(a).unwrap();

    let mut b = UnitVersion::new("b", "1.0.0", "1.0.0");
    b.add_dependency("c").unwrap();
    b.add_constraint(pin_c).unwrap();
    catalog.add_unit_version(b).unwrap();
    catalog
        .add_unit_version(UnitVersion::new("b", "2.0.0", "2.0.0"))
        .unwrap();

    let mut c = UnitVersion::new("c", "2.0.0", "2.0.0");
    c.add_dependency("d").unwrap();
    c.add_constraint(floor_d).unwrap();
    catalog.add_unit_version(c).unwrap();

    catalog
        .add_unit_version(UnitVersion::new("d", "1.0.0", "1.0.0"))
        .unwrap();
    catalog
        .add_unit_version(UnitVersion::new("e", "1.0.0", "1.0.0"))
        .unwrap();
    catalog
}

#[test]
fn test_duplicate_dependency_rejected() {
    let mut unit = UnitVersion::new("a", "1.0.0", "1.0.0");
    unit.add_dependency("b").unwrap();
    let err = unit.add_dependency("b").unwrap_err();
    assert!(matches!(err, SolveError::DuplicateDependency { .. }));
    assert_eq!(unit.dependencies(), &["b".to_string()]);
}

#[test]
fn test_duplicate_constraint_rejected() {
    let mut catalog = Catalog::new();
    let c = catalog.get_constraint("b", "=1.0.0").unwrap();
    let again = catalog.get_constraint("b", "=1.0.0").unwrap();
    let mut unit = UnitVersion::new("a", "1.0.0", "1.0.0");
    unit.add_constraint(c).unwrap();
    let err = unit.add_constraint(again).unwrap_err();
    assert_eq!(err.to_string(), "Constraint already exists -- b@=1.0.0 (on a@1.0.0)");
}

#[test]
fn test_exact_and_loose_partition() {
    let mut catalog = Catalog::new();
    let mut unit = UnitVersion::new("a", "1.0.0", "1.0.0");
    unit.add_constraint(catalog.get_constraint("b", "=1.0.0").unwrap())
        .unwrap();
    unit.add_constraint(catalog.get_constraint("c", "1.0.0").unwrap())
        .unwrap();
    let exact: Vec<String> = unit.exact_constraints().map(|c| c.to_string()).collect();
    let loose: Vec<String> = unit.loose_constraints().map(|c| c.to_string()).collect();
    assert_eq!(exact, vec!["b@=1.0.0"]);
    assert_eq!(loose, vec!["c@1.0.0"]);
}

#[test]
fn test_exact_transitive_constraints_follow_chain() {
    let catalog = chain();
    let a = catalog.unit(catalog.lookup("a", "1.0.0").unwrap());
    let constraints: Vec<String> = a
        .exact_transitive_constraints(&catalog)
        .unwrap()
        .iter()
        .map(|c| c.to_string())
        .collect();
    assert_eq!(constraints, vec!["b@=1.0.0", "c@=2.0.0"]);
}

#[test]
fn test_exact_transitive_dependency_versions() {
    let catalog = chain();
    let a = catalog.unit(catalog.lookup("a", "1.0.0").unwrap());
    let versions: Vec<String> = a
        .exact_transitive_dependency_versions(&catalog)
        .unwrap()
        .into_iter()
        .map(|id| catalog.unit(id).to_string())
        .collect();
    assert_eq!(versions, vec!["b@1.0.0", "c@2.0.0"]);
}

#[test]
fn test_inexact_transitive_dependencies_exclude_pinned() {
    let catalog = chain();
    let a = catalog.unit(catalog.lookup("a", "1.0.0").unwrap());
    let pending = a.inexact_transitive_dependencies(&catalog).unwrap();
    assert_eq!(pending, vec!["d".to_string(), "e".to_string()]);
}

#[test]
fn test_exact_pin_on_non_dependency_not_followed() {
    let mut catalog = Catalog::new();
    let mut a = UnitVersion::new("a", "1.0.0", "1.0.0");
    a.add_constraint(catalog.get_constraint("b", "=1.0.0").unwrap())
        .unwrap();
    let id = catalog.add_unit_version(a).unwrap();
    let closure = catalog.unit(id).exact_closure(&catalog).unwrap();
    assert!(closure.constraints.is_empty());
}

#[test]
fn test_missing_witness_reported() {
    let mut catalog = Catalog::new();
    let mut a = UnitVersion::new("a", "1.0.0", "1.0.0");
    a.add_dependency("b").unwrap();
    a.add_constraint(catalog.get_constraint("b", "=9.0.0").unwrap())
        .unwrap();
    let id = catalog.add_unit_version(a).unwrap();
    let err = catalog.unit(id).exact_closure(&catalog).unwrap_err();
    match err {
        SolveError::MissingExactWitness {
            package,
            constraint,
        } => {
            assert_eq!(package, "b");
            assert_eq!(constraint, "b@=9.0.0");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_display() {
    assert_eq!(UnitVersion::new("a", "1.2.3", "1.0.0").to_string(), "a@1.2.3");
}
