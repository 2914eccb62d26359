//! Resolution engine: exact-dependency propagation and best-first
//! branch-and-bound search over persistent search states.

pub mod cost;
pub mod diagnostics;
pub mod lists;
pub mod propagate;
pub mod resolver;
pub mod state;

pub use resolver::{Resolution, ResolveOptions, Resolver, SearchStats};
