//! Shared utilities for the depsolve resolution engine.
//!
//! This crate provides the cross-cutting concerns used by the other depsolve
//! crates. Today that is the unified error type returned by every fallible
//! catalog and resolver operation.

pub mod errors;
