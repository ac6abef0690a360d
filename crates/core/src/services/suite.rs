use std::path::PathBuf;

use serde::Serialize;

use crate::catalog::BenchmarkSuite;
use crate::services::loader::{BenchmarkLoader, LoadedApp};
use crate::services::program::{ProgramHandle, ProgramStore};
use crate::workspace::IngestLayout;

/// Width of the separator line logged between apps.
pub const DEFAULT_LINE_LENGTH: usize = 58;

/// Caller-supplied work to run on every successfully loaded app.
pub trait AppScript {
    fn name(&self) -> &str;

    /// Run against a loaded program. `Ok(false)` marks a soft failure; errors
    /// are caught by the runner and never abort the suite.
    fn run(
        &mut self,
        store: &mut dyn ProgramStore,
        program: &ProgramHandle,
        loaded: &LoadedApp,
        is_cached: bool,
    ) -> anyhow::Result<bool>;
}

/// One place to try loading an app from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateRoot {
    /// `None` means the canonical root from the catalog.
    pub path: Option<PathBuf>,
    pub cached: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AppStatus {
    Completed,
    ScriptFailed,
    ScriptErrored,
    /// No candidate root could be loaded.
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppOutcome {
    pub app: String,
    pub status: AppStatus,
    pub cached: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_function: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuiteReport {
    pub suite: String,
    pub script: String,
    pub apps: Vec<AppOutcome>,
}

impl SuiteReport {
    pub fn count(&self, status: AppStatus) -> usize {
        self.apps.iter().filter(|a| a.status == status).count()
    }
}

/// Runs a script over the apps of a suite, one app at a time.
pub struct SuiteRunner<'a> {
    loader: BenchmarkLoader<'a>,
    layout: IngestLayout,
    caching: bool,
    line_length: usize,
}

impl<'a> SuiteRunner<'a> {
    pub fn new(loader: BenchmarkLoader<'a>, layout: IngestLayout) -> Self {
        Self { loader, layout, caching: false, line_length: DEFAULT_LINE_LENGTH }
    }

    pub fn with_caching(mut self, caching: bool) -> Self {
        self.caching = caching;
        self
    }

    pub fn with_line_length(mut self, line_length: usize) -> Self {
        self.line_length = line_length;
        self
    }

    pub fn loader(&mut self) -> &mut BenchmarkLoader<'a> {
        &mut self.loader
    }

    /// Roots to try for `app_key`, in order. The first that loads wins.
    pub fn candidate_roots(&self, app_key: &str) -> Vec<CandidateRoot> {
        let mut roots = Vec::new();
        if self.caching {
            roots.push(CandidateRoot { path: Some(self.layout.cache_root(app_key)), cached: true });
        }
        roots.push(CandidateRoot { path: None, cached: false });
        roots
    }

    fn separator(&self) {
        tracing::info!("{}", "-".repeat(self.line_length));
    }

    /// Run `script` for every app in `apps` (keys of `suite`).
    pub fn run_script_for_suite(
        &mut self,
        suite: &BenchmarkSuite,
        apps: &[String],
        script: &mut dyn AppScript,
    ) -> SuiteReport {
        let script_name = script.name().to_string();
        let mut outcomes = Vec::with_capacity(apps.len());

        for app in apps {
            tracing::info!(
                "Running {script_name} for app {app} of benchmark suite {}",
                suite.name
            );
            let outcome = self.run_app(suite, app, script);
            self.separator();
            outcomes.push(outcome);
        }

        if apps.len() > 1 {
            tracing::info!(
                "Finished running {script_name} for {} apps from benchmark suite {}",
                apps.len(),
                suite.name
            );
        }
        SuiteReport { suite: suite.name.clone(), script: script_name, apps: outcomes }
    }

    fn run_app(
        &mut self,
        suite: &BenchmarkSuite,
        app: &str,
        script: &mut dyn AppScript,
    ) -> AppOutcome {
        let skipped = |error: String| AppOutcome {
            app: app.to_string(),
            status: AppStatus::Skipped,
            cached: false,
            top_function: None,
            error: Some(error),
        };

        let entry = match suite.entry(app) {
            Ok(entry) => entry,
            Err(err) => {
                tracing::warn!("{err}; skipping...");
                return skipped(err.to_string());
            }
        };

        let mut loaded = None;
        for candidate in self.candidate_roots(app) {
            if candidate.cached {
                tracing::info!("Trying to load cached version of app {app}...");
            } else {
                tracing::info!("Loading original version of {app}...");
            }
            let attempt = self.loader.load(&entry, candidate.path.as_deref());
            if attempt.success() {
                tracing::info!(
                    "Loaded {} version of app {app} with top function {}",
                    if candidate.cached { "cached" } else { "original" },
                    attempt.result.top_function_display()
                );
                loaded = Some((attempt, candidate.cached));
                break;
            }
            tracing::warn!(
                "Could not load {} app {app}",
                if candidate.cached { "cached" } else { "original" }
            );
            self.loader.release(attempt);
        }

        let Some((loaded, cached)) = loaded else {
            tracing::warn!("Could not load app {app}, skipping...");
            return skipped(format!("could not load app {app}"));
        };

        let top_function = loaded.result.top_function.clone();
        let (status, error) = match loaded.program.as_ref() {
            Some(program) => match script.run(self.loader.store(), program, &loaded, cached) {
                Ok(true) => {
                    tracing::info!(
                        "Finished running {} for app {app} of benchmark suite {}",
                        script.name(),
                        suite.name
                    );
                    (AppStatus::Completed, None)
                }
                Ok(false) => {
                    tracing::warn!("{} failed for app {app}", script.name());
                    (AppStatus::ScriptFailed, None)
                }
                Err(err) => {
                    tracing::error!(
                        "Error: exception while running {} for app {app} of benchmark suite {}: {err:#}",
                        script.name(),
                        suite.name
                    );
                    (AppStatus::ScriptErrored, Some(format!("{err:#}")))
                }
            },
            None => (AppStatus::ScriptFailed, Some("loaded app has no program".to_string())),
        };

        self.loader.release(loaded);
        AppOutcome { app: app.to_string(), status, cached, top_function, error }
    }
}

/// Load every app of `suite` in order, handing each to `visit` and destroying
/// its program afterwards.
pub fn load_suite<F>(loader: &mut BenchmarkLoader<'_>, suite: &BenchmarkSuite, mut visit: F)
where
    F: FnMut(&mut dyn ProgramStore, &LoadedApp),
{
    for entry in suite.entries() {
        let loaded = loader.load(&entry, None);
        visit(loader.store(), &loaded);
        loader.release(loaded);
    }
}
