#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

pub const CATALOG: &str = r#"
- name: Demo
  path: apps/
  flags: ["-lm"]
  apps:
    - { key: "edge", canonical_name: "edgedetect", standard: "c++11", top_function: "edge_detect" }
    - { key: "pca", canonical_name: "pca", standard: "c11", top_function: "pca", amalgamate: true }
    - { key: "ghost", canonical_name: "ghost", standard: "c11", top_function: "main" }
"#;

pub fn write_file(path: &Path, contents: &str) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent");
    }
    fs::write(path, contents).expect("write file");
}

/// Project with a config, a catalog and two loadable apps; returns the config path.
pub fn demo_project(root: &Path) -> PathBuf {
    write_file(&root.join("catalog.yaml"), CATALOG);
    write_file(
        &root.join("benchload.yaml"),
        "benchmarks_root: bench\noutput_dir: outputs\ncatalog: catalog.yaml\n",
    );

    let edge = root.join("bench/apps/edgedetect");
    write_file(
        &edge.join("edge.cpp"),
        "#include <cmath>\n\nvoid edge_detect(const float *in, float *out, int n)\n{\n    for (int i = 1; i < n; i++) {\n        out[i] = std::fabs(in[i] - in[i - 1]);\n    }\n}\n",
    );
    write_file(&edge.join("readme.txt"), "edge detection\n");
    write_file(&edge.join("data/input.pgm"), "P2\n");

    let pca = root.join("bench/apps/pca");
    write_file(&pca.join("pca.h"), "#pragma once\n#define N 8\n");
    write_file(
        &pca.join("main.c"),
        "#include <stdio.h>\n#include \"pca.h\"\n\nstatic float v[N];\n\nint main(void)\n{\n#pragma clava begin_outline pca\n    for (int k = 0; k < N; k++) {\n        v[k] = (float)k;\n    }\n#pragma clava end_outline pca\n    printf(\"%f\\n\", v[1]);\n    return 0;\n}\n",
    );

    root.join("benchload.yaml")
}
