use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use benchload_core::services::emit::emit_program;
use benchload_core::services::{AppScript, LoadedApp, ProgramHandle, ProgramStore};
use benchload_core::workspace::IngestLayout;

use crate::sha256_file;

pub const MANIFEST_FILE: &str = "manifest.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmittedUnit {
    /// Path relative to the emit root.
    pub path: String,
    pub sha256: String,
}

/// Written next to every emitted program.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmitManifest {
    pub suite: String,
    pub app: String,
    pub top_function: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt_top_function: Option<String>,
    pub cached: bool,
    pub emitted_at: String,
    pub units: Vec<EmittedUnit>,
    pub dirents_copied: usize,
}

/// Directory under an emit root that holds the program and its dirents.
pub fn sources_dir(emit_root: &Path) -> PathBuf {
    emit_root.join("src").join("trans")
}

/// Write a loaded program into `emit_root/src/trans` and its manifest into
/// `emit_root/manifest.json`.
///
/// A program loaded from that same tree (`cached`) is written over it in
/// place and its dirents are left where they are.
pub fn emit_loaded_app(
    store: &dyn ProgramStore,
    program: &ProgramHandle,
    loaded: &LoadedApp,
    emit_root: &Path,
    cached: bool,
) -> Result<EmitManifest> {
    let dest = sources_dir(emit_root);
    if !cached && dest.exists() {
        fs::remove_dir_all(&dest)
            .with_context(|| format!("Failed to clear previous output: {}", dest.display()))?;
    }
    let dirents: &[PathBuf] = if cached { &[] } else { &loaded.result.dirents_to_copy };
    let emitted = emit_program(store, program, dirents, &dest)?;

    let mut units = Vec::with_capacity(emitted.units.len());
    for path in &emitted.units {
        let rel = path.strip_prefix(emit_root).unwrap_or(path);
        units.push(EmittedUnit { path: rel.display().to_string(), sha256: sha256_file(path)? });
    }

    let manifest = EmitManifest {
        suite: loaded.entry.suite.clone(),
        app: loaded.entry.key.clone(),
        top_function: loaded.result.top_function.clone(),
        alt_top_function: loaded.result.alt_top_function.clone(),
        cached,
        emitted_at: Utc::now().to_rfc3339(),
        units,
        dirents_copied: emitted.dirents_copied,
    };
    let manifest_path = emit_root.join(MANIFEST_FILE);
    let body = serde_json::to_string_pretty(&manifest).context("Failed to serialize manifest")?;
    fs::write(&manifest_path, body)
        .with_context(|| format!("Failed to write manifest: {}", manifest_path.display()))?;
    tracing::info!(
        app = %manifest.app,
        units = manifest.units.len(),
        path = %emit_root.display(),
        "Emitted program"
    );
    Ok(manifest)
}

/// Suite script that re-emits every loaded app under the output dir, where
/// a later cached run picks it up.
pub struct EmitScript {
    layout: IngestLayout,
    manifests: Vec<EmitManifest>,
}

impl EmitScript {
    pub fn new(layout: IngestLayout) -> Self {
        Self { layout, manifests: Vec::new() }
    }

    pub fn manifests(&self) -> &[EmitManifest] {
        &self.manifests
    }
}

impl AppScript for EmitScript {
    fn name(&self) -> &str {
        "emit"
    }

    fn run(
        &mut self,
        store: &mut dyn ProgramStore,
        program: &ProgramHandle,
        loaded: &LoadedApp,
        is_cached: bool,
    ) -> Result<bool> {
        let emit_root = self.layout.emit_root(&loaded.entry.key);
        let manifest = emit_loaded_app(store, program, loaded, &emit_root, is_cached)?;
        self.manifests.push(manifest);
        Ok(true)
    }
}
