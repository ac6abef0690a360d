use anyhow::Result;

use benchload_core::services::frontends::{TextAmalgamator, TextStore};
use benchload_core::services::{AppStatus, BenchmarkLoader, SuiteReport, SuiteRunner};

use crate::commands::{EmitScript, IngestContext};

/// Load and emit the apps of a suite (all of them when `apps` is empty).
///
/// Per-app failures are reported, never fatal.
pub fn run_suite_command(
    ctx: &IngestContext,
    suite: &str,
    apps: &[String],
    caching: bool,
    json: bool,
) -> Result<SuiteReport> {
    let suite = ctx.catalog.suite(suite)?;
    let apps = if apps.is_empty() { suite.app_list() } else { apps.to_vec() };

    let mut store = TextStore::new().with_compiler(ctx.config.compiler.clone());
    let amalgamator = TextAmalgamator;
    let loader = BenchmarkLoader::new(&mut store, &amalgamator, &ctx.layout.benchmarks_root)
        .with_max_attempts(ctx.config.max_build_attempts);
    let mut runner = SuiteRunner::new(loader, ctx.layout.clone())
        .with_caching(caching || ctx.config.caching);
    let mut script = EmitScript::new(ctx.layout.clone());
    let report = runner.run_script_for_suite(suite, &apps, &mut script);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(report);
    }

    println!(
        "Suite {}: {} completed, {} failed, {} errored, {} skipped",
        report.suite,
        report.count(AppStatus::Completed),
        report.count(AppStatus::ScriptFailed),
        report.count(AppStatus::ScriptErrored),
        report.count(AppStatus::Skipped)
    );
    for outcome in &report.apps {
        let status = match outcome.status {
            AppStatus::Completed => "completed",
            AppStatus::ScriptFailed => "failed",
            AppStatus::ScriptErrored => "errored",
            AppStatus::Skipped => "skipped",
        };
        let source = if outcome.cached { " (cached)" } else { "" };
        match &outcome.error {
            Some(error) => println!("  - {} [{status}]{source} - {error}", outcome.app),
            None => println!("  - {} [{status}]{source}", outcome.app),
        }
    }
    Ok(report)
}
