use std::path::{Path, PathBuf};

use crate::model::{CatalogEntry, LoadResult};
use crate::services::amalgamate::{amalgamate_in_place, Amalgamator};
use crate::services::entry::{ensure_function, EntryStatus};
use crate::services::program::{ProgramHandle, ProgramStore};
use crate::services::scanner::scan_sources;
use crate::workspace::DEFAULT_MAX_BUILD_ATTEMPTS;

/// A loaded benchmark: the result handed to callers plus the program it built.
///
/// The caller owns `program` and must destroy it (see
/// `BenchmarkLoader::release`) before loading another app.
#[derive(Debug)]
pub struct LoadedApp {
    /// Catalog entry the app was loaded for.
    pub entry: CatalogEntry,
    pub result: LoadResult,
    pub program: Option<ProgramHandle>,
    /// Build attempts consumed (0 when the root was missing).
    pub attempts: u32,
    /// Amalgamation was requested and failed; the program was left as-is.
    pub amalgamation_degraded: bool,
    pub top_function_status: Option<EntryStatus>,
    pub alt_top_function_status: Option<EntryStatus>,
}

impl LoadedApp {
    fn missing(entry: &CatalogEntry) -> Self {
        Self {
            entry: entry.clone(),
            result: LoadResult::failed(&entry.canonical_name),
            program: None,
            attempts: 0,
            amalgamation_degraded: false,
            top_function_status: None,
            alt_top_function_status: None,
        }
    }

    pub fn success(&self) -> bool {
        self.result.success
    }
}

/// Coordinator that drives a `ProgramStore` through one benchmark load:
/// scan, build with retry, optional amalgamation, entry resolution.
pub struct BenchmarkLoader<'a> {
    store: &'a mut dyn ProgramStore,
    amalgamator: &'a dyn Amalgamator,
    benchmarks_root: PathBuf,
    max_attempts: u32,
}

impl<'a> BenchmarkLoader<'a> {
    pub fn new(
        store: &'a mut dyn ProgramStore,
        amalgamator: &'a dyn Amalgamator,
        benchmarks_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            store,
            amalgamator,
            benchmarks_root: benchmarks_root.into(),
            max_attempts: DEFAULT_MAX_BUILD_ATTEMPTS,
        }
    }

    /// Override the build retry budget (clamped to at least one attempt).
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn benchmarks_root(&self) -> &Path {
        &self.benchmarks_root
    }

    /// Canonical on-disk root of an app.
    pub fn app_root(&self, entry: &CatalogEntry) -> PathBuf {
        self.benchmarks_root.join(&entry.subpath)
    }

    pub fn store(&mut self) -> &mut dyn ProgramStore {
        &mut *self.store
    }

    /// Destroy the program of a loaded app, if any.
    pub fn release(&mut self, loaded: LoadedApp) {
        if let Some(program) = loaded.program {
            self.store.destroy(program);
        }
    }

    /// Load one benchmark.
    ///
    /// `override_root` replaces the canonical app root (used for cached,
    /// previously transformed trees); a miss there does not fall back to the
    /// canonical root. Expected failures are logged and encoded in the
    /// returned `LoadResult`, never propagated.
    pub fn load(&mut self, entry: &CatalogEntry, override_root: Option<&Path>) -> LoadedApp {
        let app = entry.canonical_name.as_str();
        let root = match override_root {
            Some(path) => path.to_path_buf(),
            None => self.app_root(entry),
        };

        self.store.set_standard(&entry.standard);
        tracing::info!(app, "Selected standard: {}", entry.standard);
        let flags = entry.flags_string();
        self.store.set_flags(&flags);
        if entry.flags.is_empty() {
            tracing::info!(app, "No compiler flags were selected");
        } else {
            tracing::info!(app, "Selected flags: {flags}");
        }

        if !root.is_dir() {
            tracing::warn!(app, path = %root.display(), "Benchmark folder not found");
            if override_root.is_some() {
                tracing::warn!(app, "Cached path is invalid.");
            } else {
                tracing::warn!(app, "Is the benchmarks checkout present under the benchmarks root?");
            }
            return LoadedApp::missing(entry);
        }

        let inventory = scan_sources(&root);
        tracing::info!(app, "Found {} source files for {app}", inventory.sources.len());
        let dirents_to_copy = inventory.dirents_to_copy();

        let (program, attempts) = self.build_with_retry(app, &inventory.sources);
        let Some(program) = program else {
            tracing::error!(
                app,
                attempts,
                "Exhausted {} build attempts; giving up on {app}",
                self.max_attempts
            );
            return LoadedApp {
                entry: entry.clone(),
                result: LoadResult {
                    success: false,
                    app: app.to_string(),
                    top_function: None,
                    alt_top_function: None,
                    dirents_to_copy,
                },
                program: None,
                attempts,
                amalgamation_degraded: false,
                top_function_status: None,
                alt_top_function_status: None,
            };
        };

        let mut amalgamation_degraded = false;
        if entry.amalgamate {
            tracing::info!(app, "Amalgamating {app} into a single unit");
            amalgamation_degraded =
                !amalgamate_in_place(self.amalgamator, &mut *self.store, &program, app);
        }

        let top_function_status = ensure_function(&mut *self.store, &program, &entry.top_function);
        let alt_top_function_status = entry
            .alt_top_function
            .as_deref()
            .map(|alt| ensure_function(&mut *self.store, &program, alt));

        LoadedApp {
            entry: entry.clone(),
            result: LoadResult {
                success: true,
                app: app.to_string(),
                top_function: Some(entry.top_function.clone()),
                alt_top_function: entry.alt_top_function.clone(),
                dirents_to_copy,
            },
            program: Some(program),
            attempts,
            amalgamation_degraded,
            top_function_status: Some(top_function_status),
            alt_top_function_status,
        }
    }

    /// Push, populate and build a fresh program until a build succeeds or the
    /// budget runs out. A failed program is destroyed before the next push.
    fn build_with_retry(&mut self, app: &str, sources: &[PathBuf]) -> (Option<ProgramHandle>, u32) {
        for attempt in 1..=self.max_attempts {
            let program = self.store.create();
            let built = sources
                .iter()
                .try_for_each(|source| self.store.add_file(&program, source))
                .and_then(|()| self.store.rebuild(&program));
            match built {
                Ok(()) => {
                    tracing::debug!(app, attempt, "Build succeeded");
                    return (Some(program), attempt);
                }
                Err(err) => {
                    tracing::warn!(
                        app,
                        attempt,
                        "Build attempt {attempt}/{} failed: {err}",
                        self.max_attempts
                    );
                    self.store.destroy(program);
                }
            }
        }
        (None, self.max_attempts)
    }
}
