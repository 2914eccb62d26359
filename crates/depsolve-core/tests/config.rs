use depsolve_core::config::SolverConfig;

#[test]
fn test_solver_config_defaults() {
    let config = SolverConfig::default();
    assert!(config.search.max_states.is_none());
    assert!(!config.search.stop_after_first_propagation);
    assert!(config.search.record_diagnostics);
    assert!(config.catalog.validate_exact_pins);
}

#[test]
fn test_empty_toml_uses_serde_defaults() {
    let config = SolverConfig::parse("").unwrap();
    assert_eq!(config, SolverConfig::default());
}

#[test]
fn test_parse_from_toml() {
    let toml = r#"
[search]
max-states = 5000
stop-after-first-propagation = true
record-diagnostics = false

[catalog]
validate-exact-pins = false
"#;
    let config = SolverConfig::parse(toml).unwrap();
    assert_eq!(config.search.max_states, Some(5000));
    assert!(config.search.stop_after_first_propagation);
    assert!(!config.search.record_diagnostics);
    assert!(!config.catalog.validate_exact_pins);
}

#[test]
fn test_parse_rejects_wrong_type() {
    let err = SolverConfig::parse("[search]\nmax-states = \"many\"\n").unwrap_err();
    assert!(err.to_string().starts_with("Config error"), "got: {err}");
}

#[test]
fn test_load_missing_file_gives_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = SolverConfig::load(&dir.path().join("depsolve.toml")).unwrap();
    assert_eq!(config, SolverConfig::default());
}

#[test]
fn test_load_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("depsolve.toml");
    std::fs::write(&path, "[search]\nmax-states = 12\n").unwrap();
    let config = SolverConfig::load(&path).unwrap();
    assert_eq!(config.search.max_states, Some(12));
    assert!(config.search.record_diagnostics);
}

#[test]
fn test_round_trip_pretty() {
    let mut config = SolverConfig::default();
    config.search.max_states = Some(99);
    let text = config.to_string_pretty().unwrap();
    assert!(text.contains("max-states = 99"), "got: {text}");
    assert_eq!(SolverConfig::parse(&text).unwrap(), config);
}
