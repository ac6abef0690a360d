//! Core data model for benchmark ingestion.
//!
//! These are plain value types handed between the scanner, the loader and
//! callers:
//! - `CatalogEntry`: a fully resolved description of one benchmark program.
//! - `SourceInventory`: the classified contents of a benchmark root.
//! - `LoadResult`: the outcome of one load attempt.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Rendering of a missing top function in logs and human-readable output.
pub const NO_TOP_FUNCTION: &str = "<none>";

/// Immutable description of one benchmark program, resolved from the catalog.
///
/// Built once per lookup by `Catalog::entry`; the loader only ever sees this
/// resolved form, never a bare app name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Name of the suite the app belongs to (e.g. `Rosetta`).
    pub suite: String,
    /// Key of the app within its suite (e.g. `vision-pca`).
    pub key: String,
    /// Canonical app name; also the directory name on disk.
    pub canonical_name: String,
    /// Path of the app root relative to the benchmarks root.
    pub subpath: PathBuf,
    /// Language standard token (e.g. `c11`, `c++17`).
    pub standard: String,
    /// Compiler flags shared by every app of the suite.
    pub flags: Vec<String>,
    /// Function the harness treats as the program's root of interest.
    pub top_function: String,
    /// Optional secondary entry function.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt_top_function: Option<String>,
    /// Merge the program into a single unit before entry resolution.
    #[serde(default)]
    pub amalgamate: bool,
}

impl CatalogEntry {
    /// Flags joined the way the frontend expects them.
    pub fn flags_string(&self) -> String {
        self.flags.join(" ")
    }
}

/// Classified immediate children of a benchmark root.
///
/// The three lists are disjoint and sorted by file name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceInventory {
    pub sources: Vec<PathBuf>,
    pub non_sources: Vec<PathBuf>,
    pub subdirs: Vec<PathBuf>,
}

impl SourceInventory {
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty() && self.non_sources.is_empty() && self.subdirs.is_empty()
    }

    /// Paths that must be copied verbatim next to any re-emitted program:
    /// non-source files followed by subdirectories.
    pub fn dirents_to_copy(&self) -> Vec<PathBuf> {
        self.non_sources.iter().chain(self.subdirs.iter()).cloned().collect()
    }
}

/// Outcome of loading one benchmark.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadResult {
    pub success: bool,
    /// Canonical app name.
    pub app: String,
    /// `None` whenever `success` is false.
    pub top_function: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt_top_function: Option<String>,
    /// Non-source files and subdirectories; only meaningful on success.
    pub dirents_to_copy: Vec<PathBuf>,
}

impl LoadResult {
    /// Result for a load that never produced a program.
    pub fn failed(app: impl Into<String>) -> Self {
        Self {
            success: false,
            app: app.into(),
            top_function: None,
            alt_top_function: None,
            dirents_to_copy: Vec::new(),
        }
    }

    /// Top function name, or `<none>`.
    pub fn top_function_display(&self) -> &str {
        self.top_function.as_deref().unwrap_or(NO_TOP_FUNCTION)
    }
}

impl fmt::Display for LoadResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (top function: {}", self.app, self.top_function_display())?;
        if let Some(alt) = &self.alt_top_function {
            write!(f, ", alt: {alt}")?;
        }
        write!(f, ")")
    }
}
