use depsolve_util::errors::SolveError;

#[test]
fn test_io_error_display() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
    let err = SolveError::from(io_err);
    assert!(err.to_string().contains("I/O error"), "got: {err}");
}

#[test]
fn test_duplicate_unit_version_display() {
    let err = SolveError::DuplicateUnitVersion {
        name: "foo".to_string(),
        version: "1.0.0".to_string(),
    };
    assert_eq!(err.to_string(), "Unit version already registered -- foo@1.0.0");
}

#[test]
fn test_duplicate_dependency_display() {
    let err = SolveError::DuplicateDependency {
        unit: "foo@1.0.0".to_string(),
        dependency: "bar".to_string(),
    };
    assert_eq!(err.to_string(), "Dependency already exists -- bar (on foo@1.0.0)");
}

#[test]
fn test_unknown_unit_version_id_display() {
    let err = SolveError::UnknownUnitVersionId { index: 7 };
    assert_eq!(err.to_string(), "Unknown unit version id -- #7");
}

#[test]
fn test_exact_pin_cycle_display() {
    let err = SolveError::ExactPinCycle {
        cycle: vec!["a@1.0.0".to_string(), "b@1.0.0".to_string()],
    };
    assert_eq!(err.to_string(), "Exact pins form a cycle: a@1.0.0 -> b@1.0.0");
}

#[test]
fn test_missing_witness_display() {
    let err = SolveError::MissingExactWitness {
        package: "b".to_string(),
        constraint: "b@=9.9.9".to_string(),
    };
    assert_eq!(
        err.to_string(),
        "No unit version was found for the constraint -- b@=9.9.9"
    );
}

#[test]
fn test_unresolvable_display() {
    let err = SolveError::Unresolvable {
        package: "p".to_string(),
        message: "Cannot choose satisfying versions of package -- p".to_string(),
    };
    assert_eq!(
        err.to_string(),
        "Dependency resolution failed for p: Cannot choose satisfying versions of package -- p"
    );
}

#[test]
fn test_state_limit_display() {
    let err = SolveError::StateLimitExceeded { limit: 10 };
    assert_eq!(err.to_string(), "Resolution gave up after exploring 10 states");
}

#[test]
fn test_config_error_display() {
    let err = SolveError::Config {
        message: "bad key".to_string(),
    };
    assert_eq!(err.to_string(), "Config error: bad key");
}

#[test]
fn test_io_error_from_conversion() {
    let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
    let err: SolveError = io_err.into();
    assert!(matches!(err, SolveError::Io(_)));
}
