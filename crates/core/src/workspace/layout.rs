use std::path::{Path, PathBuf};

use crate::model::CatalogEntry;
use crate::workspace::IngestConfig;

/// Logical layout of benchmark inputs and ingestion outputs.
///
/// This is derived from a config and a base directory. It does *not* perform
/// any IO itself.
#[derive(Debug, Clone)]
pub struct IngestLayout {
    /// Directory containing the suite prefixes.
    pub benchmarks_root: PathBuf,
    /// Root for emitted and cached programs.
    pub output_dir: PathBuf,
}

impl IngestLayout {
    pub fn new(benchmarks_root: impl AsRef<Path>, output_dir: impl AsRef<Path>) -> Self {
        Self {
            benchmarks_root: benchmarks_root.as_ref().to_path_buf(),
            output_dir: output_dir.as_ref().to_path_buf(),
        }
    }

    /// Layout for `config`, resolving its relative paths against `base`.
    pub fn from_config(base: impl AsRef<Path>, config: &IngestConfig) -> Self {
        let base = base.as_ref();
        Self::new(base.join(&config.benchmarks_root), base.join(&config.output_dir))
    }

    /// Canonical source root of an app.
    pub fn app_root(&self, entry: &CatalogEntry) -> PathBuf {
        self.benchmarks_root.join(&entry.subpath)
    }

    /// Per-app output directory.
    pub fn emit_root(&self, app_key: &str) -> PathBuf {
        self.output_dir.join(app_key)
    }

    /// Where a previously transformed tree of the app is cached.
    pub fn cache_root(&self, app_key: &str) -> PathBuf {
        self.emit_root(app_key).join("src").join("trans")
    }
}
