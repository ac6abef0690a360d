//! Ingestion configuration and on-disk layout.
//!
//! - `IngestConfig`: serializable settings (benchmarks root, output dir,
//!   retry budget, optional syntax-check compiler, caching).
//! - `IngestLayout`: paths derived from a config, computed without IO.
//! - helpers to load a config file and resolve the catalog it points at.

pub mod config;
pub mod layout;
pub mod util;

pub use config::*;
pub use layout::*;
pub use util::*;
