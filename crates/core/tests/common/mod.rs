#![allow(dead_code)]

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use benchload_core::model::CatalogEntry;
use benchload_core::services::{
    Amalgamation, AmalgamationError, Amalgamator, Directive, FrontendConfig, ProgramHandle,
    ProgramStore, SourceUnit, StatementRef, StoreError,
};

/// Store stub that records every call and fails the first `fail_builds` rebuilds.
#[derive(Debug, Default)]
pub struct RecordingStore {
    pub fail_builds: usize,
    pub creates: usize,
    pub destroys: usize,
    pub rebuilds: usize,
    pub resets: usize,
    pub added: Vec<PathBuf>,
    pub standard: String,
    pub flags: String,
    pub functions: Vec<String>,
    pub live: HashSet<u64>,
    next: u64,
}

impl RecordingStore {
    pub fn failing(fail_builds: usize) -> Self {
        Self { fail_builds, ..Self::default() }
    }

    pub fn with_functions(mut self, names: &[&str]) -> Self {
        self.functions = names.iter().map(|n| n.to_string()).collect();
        self
    }
}

impl FrontendConfig for RecordingStore {
    fn set_standard(&mut self, standard: &str) {
        self.standard = standard.to_string();
    }

    fn set_flags(&mut self, flags: &str) {
        self.flags = flags.to_string();
    }
}

impl ProgramStore for RecordingStore {
    fn name(&self) -> &'static str {
        "recording"
    }

    fn create(&mut self) -> ProgramHandle {
        self.creates += 1;
        self.next += 1;
        assert!(self.live.is_empty(), "a program was pushed while another was live");
        self.live.insert(self.next);
        ProgramHandle::from_raw(self.next)
    }

    fn destroy(&mut self, program: ProgramHandle) {
        self.destroys += 1;
        self.live.remove(&program.id());
    }

    fn add_file(&mut self, _program: &ProgramHandle, path: &Path) -> Result<(), StoreError> {
        self.added.push(path.to_path_buf());
        Ok(())
    }

    fn add_source(&mut self, _: &ProgramHandle, name: &str, _: &str) -> Result<(), StoreError> {
        self.added.push(PathBuf::from(name));
        Ok(())
    }

    fn reset(&mut self, _program: &ProgramHandle) -> Result<(), StoreError> {
        self.resets += 1;
        Ok(())
    }

    fn rebuild(&mut self, program: &ProgramHandle) -> Result<(), StoreError> {
        self.rebuilds += 1;
        if self.rebuilds <= self.fail_builds {
            return Err(StoreError::Parse {
                unit: format!("program#{}", program.id()),
                message: "injected failure".into(),
            });
        }
        Ok(())
    }

    fn functions(&self, _program: &ProgramHandle) -> Result<Vec<String>, StoreError> {
        Ok(self.functions.clone())
    }

    fn directives(&self, _program: &ProgramHandle) -> Result<Vec<Directive>, StoreError> {
        Ok(Vec::new())
    }

    fn outline(
        &mut self,
        _program: &ProgramHandle,
        _begin: StatementRef,
        _end: StatementRef,
        name: &str,
    ) -> Result<(), StoreError> {
        Err(StoreError::Outline { name: name.to_string(), reason: "not supported".into() })
    }

    fn remove_statement(
        &mut self,
        _program: &ProgramHandle,
        statement: StatementRef,
    ) -> Result<(), StoreError> {
        Err(StoreError::UnknownStatement(statement))
    }

    fn units(&self, _program: &ProgramHandle) -> Result<Vec<SourceUnit>, StoreError> {
        Ok(self
            .added
            .iter()
            .map(|p| SourceUnit { name: p.display().to_string(), text: String::new() })
            .collect())
    }

    fn write(&self, _program: &ProgramHandle, _dest: &Path) -> Result<Vec<PathBuf>, StoreError> {
        Ok(Vec::new())
    }
}

/// Amalgamator that always fails.
pub struct BrokenAmalgamator;

impl Amalgamator for BrokenAmalgamator {
    fn name(&self) -> &'static str {
        "broken"
    }

    fn amalgamate(
        &self,
        _store: &dyn ProgramStore,
        _program: &ProgramHandle,
        app: &str,
    ) -> Result<Amalgamation, AmalgamationError> {
        Err(AmalgamationError::Merge { app: app.to_string(), reason: "boom".into() })
    }
}

pub fn entry(name: &str, top_function: &str) -> CatalogEntry {
    CatalogEntry {
        suite: "Test".into(),
        key: name.into(),
        canonical_name: name.into(),
        subpath: PathBuf::from("apps").join(name),
        standard: "c11".into(),
        flags: Vec::new(),
        top_function: top_function.into(),
        alt_top_function: None,
        amalgamate: false,
    }
}

pub fn write_file(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

/// The edge-detection app: two sources, a readme and a data directory.
pub fn edgedetect_tree(benchmarks_root: &Path) -> PathBuf {
    let root = benchmarks_root.join("apps").join("edgedetect");
    write_file(
        &root.join("edge.h"),
        "#pragma once\nvoid edge_detect(const float *in, float *out, int n);\n",
    );
    write_file(
        &root.join("edge.cpp"),
        "#include \"edge.h\"\n#include <cmath>\n\nvoid edge_detect(const float *in, float *out, int n)\n{\n    for (int i = 1; i < n; i++) {\n        out[i] = std::fabs(in[i] - in[i - 1]);\n    }\n}\n\nint main()\n{\n    float in[4] = {0, 1, 3, 6};\n    float out[4] = {0};\n    edge_detect(in, out, 4);\n    return 0;\n}\n",
    );
    write_file(&root.join("readme.txt"), "edge detection benchmark\n");
    write_file(&root.join("data").join("input.pgm"), "P2\n1 1\n255\n0\n");
    root
}
