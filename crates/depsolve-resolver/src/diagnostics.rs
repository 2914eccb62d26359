//! Branch failure records collected while searching.

use std::fmt;

use depsolve_util::errors::SolveError;

/// Why one search branch could not be expanded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BranchFailure {
    /// No registered version of `package` passes the constraints in force.
    NoCandidates { package: String },
    /// Every candidate of `package` led to an inconsistent state.
    NoConsistentNeighbor {
        package: String,
        tried: usize,
        last: Option<Box<BranchFailure>>,
    },
    /// An exact constraint names a version the catalog does not have.
    MissingWitness { package: String, constraint: String },
    /// Propagation forced a second version of an already decided package.
    Conflict {
        package: String,
        chosen: String,
        forced: String,
    },
    /// The catalog rejected a query made while propagating `package`.
    Rejected { package: String, message: String },
    /// A chosen unit violates a constraint naming it.
    Violation {
        package: String,
        unit: String,
        constraint: String,
    },
}

impl BranchFailure {
    /// The package this failure is about.
    pub fn package(&self) -> &str {
        match self {
            BranchFailure::NoCandidates { package }
            | BranchFailure::NoConsistentNeighbor { package, .. }
            | BranchFailure::MissingWitness { package, .. }
            | BranchFailure::Conflict { package, .. }
            | BranchFailure::Rejected { package, .. }
            | BranchFailure::Violation { package, .. } => package,
        }
    }

    /// The failure at the bottom of a chain of `NoConsistentNeighbor`s.
    pub fn root_cause(&self) -> &BranchFailure {
        match self {
            BranchFailure::NoConsistentNeighbor {
                last: Some(last), ..
            } => last.root_cause(),
            other => other,
        }
    }
}

impl fmt::Display for BranchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BranchFailure::NoCandidates { package } => {
                write!(f, "Cannot choose satisfying versions of package -- {package}")
            }
            BranchFailure::NoConsistentNeighbor { package, tried, .. } => write!(
                f,
                "None of the {tried} versions of package produces a sensible result -- {package}"
            ),
            BranchFailure::MissingWitness { constraint, .. } => {
                write!(f, "No unit version was found for the constraint -- {constraint}")
            }
            BranchFailure::Conflict {
                package,
                chosen,
                forced,
            } => write!(f, "{package}: {forced} is forced but {chosen} is already chosen"),
            BranchFailure::Rejected { package, message } => write!(f, "{package}: {message}"),
            BranchFailure::Violation {
                unit, constraint, ..
            } => {
                write!(f, "{unit} does not satisfy {constraint}")
            }
        }
    }
}

impl From<BranchFailure> for SolveError {
    fn from(failure: BranchFailure) -> Self {
        match failure.root_cause() {
            BranchFailure::MissingWitness {
                package,
                constraint,
            } => SolveError::MissingExactWitness {
                package: package.clone(),
                constraint: constraint.clone(),
            },
            _ => SolveError::Unresolvable {
                package: failure.package().to_string(),
                message: failure.to_string(),
            },
        }
    }
}

/// Every branch failure seen during one resolution, in the order encountered.
#[derive(Debug, Default, Clone)]
pub struct DiagnosticReport {
    pub failures: Vec<BranchFailure>,
}

impl DiagnosticReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, failure: BranchFailure) {
        self.failures.push(failure);
    }

    /// The failure reported to the caller when the whole search fails.
    pub fn representative(&self) -> Option<&BranchFailure> {
        self.failures.first()
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn len(&self) -> usize {
        self.failures.len()
    }
}

impl fmt::Display for DiagnosticReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.failures.is_empty() {
            return write!(f, "No branch failures.");
        }
        writeln!(f, "Branch failures ({}):", self.failures.len())?;
        for failure in &self.failures {
            writeln!(f, "  {failure}")?;
        }
        Ok(())
    }
}
