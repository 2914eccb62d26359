use miette::Diagnostic;
use thiserror::Error;

/// Unified error type for all depsolve operations.
#[derive(Debug, Error, Diagnostic)]
pub enum SolveError {
    /// I/O operation failed (reading a config file).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The same `(name, version)` pair was registered twice.
    #[error("Unit version already registered -- {name}@{version}")]
    #[diagnostic(help("Every unit version must be added to the catalog exactly once"))]
    DuplicateUnitVersion { name: String, version: String },

    /// A unit declared the same dependency name twice.
    #[error("Dependency already exists -- {dependency} (on {unit})")]
    DuplicateDependency { unit: String, dependency: String },

    /// A unit declared the same interned constraint twice.
    #[error("Constraint already exists -- {constraint} (on {unit})")]
    DuplicateConstraint { unit: String, constraint: String },

    /// A constraint string could not be parsed.
    #[error("Invalid constraint '{constraint}' for {name}: {reason}")]
    #[diagnostic(help("Use \"=X.Y.Z\" for an exact pin or \"X.Y.Z\" for a compatible floor"))]
    InvalidConstraint {
        name: String,
        constraint: String,
        reason: String,
    },

    /// A version string was rejected by the version comparator.
    #[error("Invalid version '{version}': {reason}")]
    InvalidVersion { version: String, reason: String },

    /// A unit version lookup by `(name, version)` found nothing.
    #[error("Unknown unit version -- {name}@{version}")]
    UnknownUnitVersion { name: String, version: String },

    /// A unit version id that does not belong to the catalog in use.
    #[error("Unknown unit version id -- #{index}")]
    #[diagnostic(help("Unit version ids are only valid for the catalog that issued them"))]
    UnknownUnitVersionId { index: usize },

    /// Exact pins form a cycle, so the exact closure would never terminate.
    #[error("Exact pins form a cycle: {}", cycle.join(" -> "))]
    #[diagnostic(help("Relax one of the exact constraints in the cycle to a range constraint"))]
    ExactPinCycle { cycle: Vec<String> },

    /// An exact constraint names a version that is not in the catalog.
    #[error("No unit version was found for the constraint -- {constraint}")]
    #[diagnostic(help("Register the pinned version in the catalog or relax the pin"))]
    MissingExactWitness { package: String, constraint: String },

    /// Every branch of the search failed.
    #[error("Dependency resolution failed for {package}: {message}")]
    Unresolvable { package: String, message: String },

    /// The caller requested the search to stop.
    #[error("Resolution interrupted after exploring {explored} states")]
    Interrupted { explored: u64 },

    /// The search popped more states than the configured limit.
    #[error("Resolution gave up after exploring {limit} states")]
    #[diagnostic(help("Raise `max-states` in the [search] config table"))]
    StateLimitExceeded { limit: u64 },

    /// Invalid or unreadable solver configuration.
    #[error("Config error: {message}")]
    Config { message: String },
}

/// Convenience alias for results carrying a [`SolveError`].
pub type SolveResult<T> = Result<T, SolveError>;
