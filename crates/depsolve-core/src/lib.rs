//! Core data types for the depsolve resolution engine.
//!
//! This crate defines the catalog side of resolution: the version comparator
//! capability, interned constraints, unit versions with their declared
//! dependencies, the catalog that owns them, validation of exact pins, and
//! solver configuration.
//!
//! This crate performs no search; see `depsolve-resolver` for that.

pub mod catalog;
pub mod config;
pub mod constraint;
pub mod graph;
pub mod unit_version;
pub mod version;
