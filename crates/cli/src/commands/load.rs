use anyhow::{bail, Result};
use serde::Serialize;

use benchload_core::model::LoadResult;
use benchload_core::services::frontends::{TextAmalgamator, TextStore};
use benchload_core::services::BenchmarkLoader;

use crate::canonicalize_or_current;
use crate::commands::{emit_loaded_app, sources_dir, EmitManifest, IngestContext};

#[derive(Debug, Serialize)]
pub struct LoadReport {
    #[serde(flatten)]
    pub result: LoadResult,
    pub attempts: u32,
    pub amalgamation_degraded: bool,
    pub top_function_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt_top_function_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifest: Option<EmitManifest>,
}

/// Load one app, optionally from a cached tree, and optionally emit it.
///
/// Fails (after printing the report) when the app could not be loaded.
pub fn load_command(
    ctx: &IngestContext,
    suite: &str,
    app: &str,
    cache_path: Option<&str>,
    out: Option<&str>,
    json: bool,
) -> Result<()> {
    let entry = ctx.catalog.entry(suite, app)?;
    let override_root = cache_path.map(canonicalize_or_current).transpose()?;
    let out_dir = out.map(canonicalize_or_current).transpose()?;

    let mut store = TextStore::new().with_compiler(ctx.config.compiler.clone());
    let amalgamator = TextAmalgamator;
    let mut loader = BenchmarkLoader::new(&mut store, &amalgamator, &ctx.layout.benchmarks_root)
        .with_max_attempts(ctx.config.max_build_attempts);

    let loaded = loader.load(&entry, override_root.as_deref());
    let manifest = match (&out_dir, loaded.program.as_ref()) {
        (Some(dir), Some(program)) => {
            let in_place = override_root.as_deref() == Some(sources_dir(dir).as_path());
            Some(emit_loaded_app(loader.store(), program, &loaded, dir, in_place)?)
        }
        _ => None,
    };

    let report = LoadReport {
        result: loaded.result.clone(),
        attempts: loaded.attempts,
        amalgamation_degraded: loaded.amalgamation_degraded,
        top_function_status: loaded.top_function_status.as_ref().map(ToString::to_string),
        alt_top_function_status: loaded.alt_top_function_status.as_ref().map(ToString::to_string),
        manifest,
    };
    loader.release(loaded);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", report.result);
        println!("  Attempts: {}", report.attempts);
        if let Some(status) = &report.top_function_status {
            println!("  Top function: {status}");
        }
        if let Some(status) = &report.alt_top_function_status {
            println!("  Alt top function: {status}");
        }
        if report.amalgamation_degraded {
            println!("  Amalgamation: failed (program left as loaded)");
        }
        println!("  Dirents to copy: {}", report.result.dirents_to_copy.len());
        for dirent in &report.result.dirents_to_copy {
            println!("    - {}", dirent.display());
        }
        if let Some(manifest) = &report.manifest {
            println!("  Emitted {} unit(s) at {}", manifest.units.len(), manifest.emitted_at);
        }
    }

    if !report.result.success {
        bail!("Failed to load app '{app}' of suite '{suite}'");
    }
    Ok(())
}
