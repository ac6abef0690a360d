mod common;

use benchload_core::services::frontends::{TextAmalgamator, TextStore};
use benchload_core::services::{BenchmarkLoader, EntryStatus, ProgramStore};
use common::{edgedetect_tree, entry, write_file, BrokenAmalgamator, RecordingStore};

fn tree_with_one_source(root: &std::path::Path, name: &str) {
    write_file(&root.join("apps").join(name).join("main.c"), "int main(void) { return 0; }\n");
}

#[test]
fn transient_build_failures_are_retried_on_fresh_programs() {
    let tmp = tempfile::tempdir().unwrap();
    tree_with_one_source(tmp.path(), "flaky");
    let mut store = RecordingStore::failing(3).with_functions(&["main"]);
    let amalgamator = BrokenAmalgamator;

    let mut loader = BenchmarkLoader::new(&mut store, &amalgamator, tmp.path());
    let loaded = loader.load(&entry("flaky", "main"), None);
    assert!(loaded.success());
    assert_eq!(loaded.attempts, 4);
    assert_eq!(loaded.result.top_function.as_deref(), Some("main"));
    loader.release(loaded);

    assert_eq!(store.creates, 4);
    assert_eq!(store.destroys, 4);
    assert!(store.live.is_empty());
}

#[test]
fn build_budget_stops_after_five_attempts() {
    let tmp = tempfile::tempdir().unwrap();
    tree_with_one_source(tmp.path(), "broken");
    write_file(&tmp.path().join("apps/broken/notes.txt"), "n");
    let mut store = RecordingStore::failing(usize::MAX);
    let amalgamator = BrokenAmalgamator;

    let mut loader = BenchmarkLoader::new(&mut store, &amalgamator, tmp.path());
    assert_eq!(loader.max_attempts(), 5);
    let loaded = loader.load(&entry("broken", "main"), None);
    assert!(!loaded.success());
    assert!(loaded.program.is_none());
    assert_eq!(loaded.attempts, 5);
    assert_eq!(loaded.result.top_function, None);
    assert_eq!(loaded.result.top_function_display(), "<none>");
    assert_eq!(loaded.result.dirents_to_copy, vec![tmp.path().join("apps/broken/notes.txt")]);
    assert!(loaded.top_function_status.is_none());

    assert_eq!(store.creates, 5);
    assert_eq!(store.destroys, 5);
}

#[test]
fn retry_budget_is_configurable_but_never_zero() {
    let tmp = tempfile::tempdir().unwrap();
    tree_with_one_source(tmp.path(), "broken");
    let mut store = RecordingStore::failing(usize::MAX);
    let amalgamator = BrokenAmalgamator;

    let mut loader = BenchmarkLoader::new(&mut store, &amalgamator, tmp.path()).with_max_attempts(0);
    assert_eq!(loader.max_attempts(), 1);
    let loaded = loader.load(&entry("broken", "main"), None);
    assert_eq!(loaded.attempts, 1);
    assert_eq!(store.creates, 1);
}

#[test]
fn edgedetect_loads_on_first_attempt() {
    let tmp = tempfile::tempdir().unwrap();
    let root = edgedetect_tree(tmp.path());
    let mut store = TextStore::new();
    let amalgamator = TextAmalgamator;
    let mut app = entry("edgedetect", "edge_detect");
    app.standard = "c++11".into();
    app.flags = vec!["-lm".into()];

    let mut loader = BenchmarkLoader::new(&mut store, &amalgamator, tmp.path());
    let loaded = loader.load(&app, None);
    assert!(loaded.success());
    assert_eq!(loaded.attempts, 1);
    assert_eq!(loaded.result.app, "edgedetect");
    assert_eq!(loaded.result.top_function.as_deref(), Some("edge_detect"));
    assert_eq!(loaded.result.dirents_to_copy, vec![root.join("readme.txt"), root.join("data")]);
    assert!(matches!(loaded.top_function_status, Some(EntryStatus::Present)));

    let program = loaded.program.as_ref().unwrap();
    let units: Vec<String> =
        loader.store().units(program).unwrap().into_iter().map(|u| u.name).collect();
    assert_eq!(units, vec!["edge.cpp", "edge.h"]);
    loader.release(loaded);

    assert_eq!(store.standard(), "c++11");
    assert_eq!(store.flags(), "-lm");
    assert_eq!(store.live_programs(), 0);
}

#[test]
fn missing_root_fails_without_touching_the_store() {
    let tmp = tempfile::tempdir().unwrap();
    let mut store = RecordingStore::default();
    let amalgamator = BrokenAmalgamator;

    let mut loader = BenchmarkLoader::new(&mut store, &amalgamator, tmp.path());
    let loaded = loader.load(&entry("absent", "main"), None);
    assert!(!loaded.success());
    assert_eq!(loaded.attempts, 0);
    assert_eq!(loaded.result.top_function, None);
    assert!(loaded.result.dirents_to_copy.is_empty());
    assert_eq!(store.creates, 0);
}

#[test]
fn cached_root_miss_does_not_fall_back_to_canonical_root() {
    let tmp = tempfile::tempdir().unwrap();
    tree_with_one_source(tmp.path(), "present");
    let mut store = RecordingStore::default();
    let amalgamator = BrokenAmalgamator;

    let mut loader = BenchmarkLoader::new(&mut store, &amalgamator, tmp.path());
    let cache = tmp.path().join("outputs/present/src/trans");
    let loaded = loader.load(&entry("present", "main"), Some(&cache));
    assert!(!loaded.success());
    assert_eq!(store.creates, 0);
}

#[test]
fn override_root_replaces_canonical_root() {
    let tmp = tempfile::tempdir().unwrap();
    let cache = tmp.path().join("outputs/cached/src/trans");
    write_file(&cache.join("main.c"), "int main(void) { return 0; }\n");
    let mut store = RecordingStore::default().with_functions(&["main"]);
    let amalgamator = BrokenAmalgamator;

    let mut loader = BenchmarkLoader::new(&mut store, &amalgamator, tmp.path());
    let loaded = loader.load(&entry("cached", "main"), Some(&cache));
    assert!(loaded.success());
    loader.release(loaded);
    assert_eq!(store.added, vec![cache.join("main.c")]);
}

#[test]
fn failed_amalgamation_degrades_but_still_resolves_entry() {
    let tmp = tempfile::tempdir().unwrap();
    tree_with_one_source(tmp.path(), "merged");
    let mut store = RecordingStore::default().with_functions(&["main"]);
    let amalgamator = BrokenAmalgamator;
    let mut app = entry("merged", "main");
    app.amalgamate = true;

    let mut loader = BenchmarkLoader::new(&mut store, &amalgamator, tmp.path());
    let loaded = loader.load(&app, None);
    assert!(loaded.success());
    assert!(loaded.amalgamation_degraded);
    assert!(matches!(loaded.top_function_status, Some(EntryStatus::Present)));
    loader.release(loaded);
    assert_eq!(store.resets, 0);
}

#[test]
fn empty_folder_builds_an_empty_program() {
    let tmp = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(tmp.path().join("apps/empty")).unwrap();
    let mut store = TextStore::new();
    let amalgamator = TextAmalgamator;

    let mut loader = BenchmarkLoader::new(&mut store, &amalgamator, tmp.path());
    let loaded = loader.load(&entry("empty", "main"), None);
    assert!(loaded.success());
    assert!(matches!(
        loaded.top_function_status,
        Some(EntryStatus::Unresolvable { has_begin: false, has_end: false })
    ));
    assert_eq!(loaded.result.top_function.as_deref(), Some("main"));
    loader.release(loaded);
}

#[test]
fn alternative_entry_is_resolved_too() {
    let tmp = tempfile::tempdir().unwrap();
    tree_with_one_source(tmp.path(), "dual");
    let mut store = RecordingStore::default().with_functions(&["main"]);
    let amalgamator = BrokenAmalgamator;
    let mut app = entry("dual", "main");
    app.alt_top_function = Some("kernel".into());

    let mut loader = BenchmarkLoader::new(&mut store, &amalgamator, tmp.path());
    let loaded = loader.load(&app, None);
    assert_eq!(loaded.result.alt_top_function.as_deref(), Some("kernel"));
    assert!(matches!(loaded.alt_top_function_status, Some(EntryStatus::Unresolvable { .. })));
    loader.release(loaded);
}
