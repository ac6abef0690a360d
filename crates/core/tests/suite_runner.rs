mod common;

use std::path::Path;

use anyhow::bail;
use benchload_core::catalog::{BenchmarkSuite, Catalog};
use benchload_core::services::frontends::{TextAmalgamator, TextStore};
use benchload_core::services::suite::{load_suite, CandidateRoot};
use benchload_core::services::{
    AppScript, AppStatus, BenchmarkLoader, LoadedApp, ProgramHandle, ProgramStore, SuiteRunner,
};
use benchload_core::workspace::IngestLayout;
use common::write_file;

const CATALOG: &str = r#"
- name: Demo
  path: apps/
  flags: ["-lm"]
  apps:
    - { key: "alpha", canonical_name: "alpha", standard: "c11", top_function: "main" }
    - { key: "beta", canonical_name: "beta", standard: "c11", top_function: "main" }
    - { key: "gamma", canonical_name: "gamma", standard: "c11", top_function: "main" }
    - { key: "soft", canonical_name: "soft", standard: "c11", top_function: "main" }
"#;

fn demo_suite() -> BenchmarkSuite {
    Catalog::from_yaml(CATALOG).unwrap().suite("demo").unwrap().clone()
}

fn write_app(root: &Path, marker: &str) {
    write_file(
        &root.join("main.c"),
        &format!("/* {marker} */\nint main(void) {{ return 0; }}\n"),
    );
}

#[derive(Default)]
struct Recorder {
    seen: Vec<(String, bool, String)>,
}

impl AppScript for Recorder {
    fn name(&self) -> &str {
        "recorder"
    }

    fn run(
        &mut self,
        store: &mut dyn ProgramStore,
        program: &ProgramHandle,
        loaded: &LoadedApp,
        is_cached: bool,
    ) -> anyhow::Result<bool> {
        let text = store.units(program)?.into_iter().map(|u| u.text).collect::<String>();
        self.seen.push((loaded.result.app.clone(), is_cached, text));
        match loaded.result.app.as_str() {
            "beta" => bail!("script blew up"),
            "soft" => Ok(false),
            _ => Ok(true),
        }
    }
}

#[test]
fn every_app_is_attempted_and_failures_are_isolated() {
    let tmp = tempfile::tempdir().unwrap();
    let layout = IngestLayout::new(tmp.path(), tmp.path().join("outputs"));
    for app in ["alpha", "beta", "soft"] {
        write_app(&tmp.path().join("apps").join(app), "original");
    }
    let suite = demo_suite();

    let mut store = TextStore::new();
    let amalgamator = TextAmalgamator;
    let loader = BenchmarkLoader::new(&mut store, &amalgamator, tmp.path());
    let mut runner = SuiteRunner::new(loader, layout);
    let mut script = Recorder::default();
    let report = runner.run_script_for_suite(&suite, &suite.app_list(), &mut script);
    drop(runner);

    let statuses: Vec<(&str, AppStatus)> =
        report.apps.iter().map(|a| (a.app.as_str(), a.status)).collect();
    assert_eq!(
        statuses,
        vec![
            ("alpha", AppStatus::Completed),
            ("beta", AppStatus::ScriptErrored),
            ("gamma", AppStatus::Skipped),
            ("soft", AppStatus::ScriptFailed),
        ]
    );
    assert_eq!(report.script, "recorder");
    assert_eq!(report.count(AppStatus::Completed), 1);
    assert!(report.apps[1].error.as_deref().unwrap().contains("script blew up"));
    assert_eq!(script.seen.len(), 3);
    assert_eq!(store.live_programs(), 0);
    assert_eq!(store.flags(), "-lm");
}

#[test]
fn caching_prefers_the_cached_tree_and_falls_back_to_the_original() {
    let tmp = tempfile::tempdir().unwrap();
    let layout = IngestLayout::new(tmp.path(), tmp.path().join("outputs"));
    write_app(&tmp.path().join("apps/alpha"), "original");
    write_app(&tmp.path().join("apps/soft"), "original");
    write_app(&layout.cache_root("alpha"), "cached");
    let suite = demo_suite();

    let mut store = TextStore::new();
    let amalgamator = TextAmalgamator;
    let loader = BenchmarkLoader::new(&mut store, &amalgamator, tmp.path());
    let mut runner = SuiteRunner::new(loader, layout.clone()).with_caching(true);
    assert_eq!(
        runner.candidate_roots("alpha"),
        vec![
            CandidateRoot { path: Some(layout.cache_root("alpha")), cached: true },
            CandidateRoot { path: None, cached: false },
        ]
    );

    let mut script = Recorder::default();
    let apps = vec!["alpha".to_string(), "soft".to_string()];
    let report = runner.run_script_for_suite(&suite, &apps, &mut script);
    drop(runner);

    assert!(report.apps[0].cached);
    assert!(!report.apps[1].cached);
    assert!(script.seen[0].1);
    assert!(script.seen[0].2.contains("cached"));
    assert!(!script.seen[1].1);
    assert!(script.seen[1].2.contains("original"));
    assert_eq!(store.live_programs(), 0);
}

#[test]
fn without_caching_only_the_original_is_tried() {
    let tmp = tempfile::tempdir().unwrap();
    let layout = IngestLayout::new(tmp.path(), tmp.path().join("outputs"));
    let mut store = TextStore::new();
    let amalgamator = TextAmalgamator;
    let loader = BenchmarkLoader::new(&mut store, &amalgamator, tmp.path());
    let runner = SuiteRunner::new(loader, layout);

    assert_eq!(runner.candidate_roots("alpha"), vec![CandidateRoot { path: None, cached: false }]);
}

#[test]
fn unknown_app_keys_are_skipped() {
    let tmp = tempfile::tempdir().unwrap();
    let layout = IngestLayout::new(tmp.path(), tmp.path().join("outputs"));
    write_app(&tmp.path().join("apps/alpha"), "original");
    let suite = demo_suite();

    let mut store = TextStore::new();
    let amalgamator = TextAmalgamator;
    let loader = BenchmarkLoader::new(&mut store, &amalgamator, tmp.path());
    let mut runner = SuiteRunner::new(loader, layout);
    let mut script = Recorder::default();
    let apps = vec!["nope".to_string(), "alpha".to_string()];
    let report = runner.run_script_for_suite(&suite, &apps, &mut script);

    assert_eq!(report.apps[0].status, AppStatus::Skipped);
    assert_eq!(report.apps[1].status, AppStatus::Completed);
}

#[test]
fn load_suite_visits_every_app_in_order() {
    let tmp = tempfile::tempdir().unwrap();
    write_app(&tmp.path().join("apps/alpha"), "original");
    write_app(&tmp.path().join("apps/beta"), "original");
    let suite = demo_suite();

    let mut store = TextStore::new();
    let amalgamator = TextAmalgamator;
    let mut loader = BenchmarkLoader::new(&mut store, &amalgamator, tmp.path());
    let mut visited = Vec::new();
    load_suite(&mut loader, &suite, |_, loaded| {
        visited.push((loaded.result.app.clone(), loaded.success()));
    });
    drop(loader);

    assert_eq!(
        visited,
        vec![
            ("alpha".to_string(), true),
            ("beta".to_string(), true),
            ("gamma".to_string(), false),
            ("soft".to_string(), false),
        ]
    );
    assert_eq!(store.live_programs(), 0);
}
