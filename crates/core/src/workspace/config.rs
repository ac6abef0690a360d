use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Build attempts per load before the app is given up on.
pub const DEFAULT_MAX_BUILD_ATTEMPTS: u32 = 5;

fn default_benchmarks_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("outputs")
}

fn default_max_build_attempts() -> u32 {
    DEFAULT_MAX_BUILD_ATTEMPTS
}

/// Settings for an ingestion run.
///
/// Lives in `benchload.yaml` (or `.json`) next to the benchmarks checkout;
/// every field has a default so an empty file is valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Directory containing the suite prefixes (`apps/`, `benchmarks/...`).
    #[serde(default = "default_benchmarks_root")]
    pub benchmarks_root: PathBuf,
    /// Root for emitted programs and cached transformed trees.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_max_build_attempts")]
    pub max_build_attempts: u32,
    /// Compiler used for an optional `-fsyntax-only` check during builds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compiler: Option<String>,
    /// Try `output_dir/<app>/src/trans` before the original sources.
    #[serde(default)]
    pub caching: bool,
    /// Catalog file replacing the built-in one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog: Option<PathBuf>,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            benchmarks_root: default_benchmarks_root(),
            output_dir: default_output_dir(),
            max_build_attempts: DEFAULT_MAX_BUILD_ATTEMPTS,
            compiler: None,
            caching: false,
            catalog: None,
        }
    }
}
