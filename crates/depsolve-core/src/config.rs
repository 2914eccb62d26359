use serde::{Deserialize, Serialize};
use std::path::Path;

use depsolve_util::errors::{SolveError, SolveResult};

/// Solver configuration, usually loaded from a `depsolve.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig {
    #[serde(default)]
    pub search: SearchConfig,

    #[serde(default)]
    pub catalog: CatalogConfig,
}

/// Search settings from `[search]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Stop with an error after popping this many states.
    #[serde(default, rename = "max-states")]
    pub max_states: Option<u64>,
    #[serde(default, rename = "stop-after-first-propagation")]
    pub stop_after_first_propagation: bool,
    #[serde(default = "default_true", rename = "record-diagnostics")]
    pub record_diagnostics: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_states: None,
            stop_after_first_propagation: false,
            record_diagnostics: true,
        }
    }
}

/// Catalog checks from `[catalog]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default = "default_true", rename = "validate-exact-pins")]
    pub validate_exact_pins: bool,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            validate_exact_pins: true,
        }
    }
}

fn default_true() -> bool {
    true
}

impl SolverConfig {
    pub fn parse(content: &str) -> SolveResult<Self> {
        toml::from_str(content).map_err(|e| SolveError::Config {
            message: format!("Failed to parse solver config: {e}"),
        })
    }

    /// Load the configuration at `path`, or return defaults if the file doesn't exist.
    pub fn load(path: &Path) -> SolveResult<Self> {
        if !path.is_file() {
            tracing::debug!("No solver config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|e| SolveError::Config {
            message: format!("Failed to read {}: {e}", path.display()),
        })?;
        Self::parse(&content)
    }

    pub fn to_string_pretty(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
