//! benchload-core
//!
//! Core library for ingesting third-party C/C++ benchmark programs into a
//! source-to-source compilation harness.
//!
//! This crate defines the data model, the benchmark catalog, source discovery,
//! the retrying build loop, entry-point outlining, amalgamation, and the suite
//! runner. Compiler frontends plug in through the `ProgramStore` and
//! `Amalgamator` traits; a text-based frontend ships behind the
//! `text-frontend` feature.
//!
//! The goal is to keep all substantive logic here so it is fully testable and
//! reusable from multiple frontends (CLI, scripts, etc.).

pub mod catalog;
pub mod model;
pub mod services;
pub mod workspace;

/// Returns the library version as encoded at compile time.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
