use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use walkdir::WalkDir;

use crate::services::program::{ProgramHandle, ProgramStore};

/// Copy each path in `dirents` into `dest`, recursing into directories.
///
/// Each dirent lands at `dest/<file name>`, with the structure below it
/// preserved. Returns the number of files copied.
pub fn copy_dirents(dirents: &[PathBuf], dest: &Path) -> Result<usize> {
    fs::create_dir_all(dest)
        .with_context(|| format!("Failed to create output dir: {}", dest.display()))?;

    let mut copied = 0;
    for dirent in dirents {
        let Some(base) = dirent.parent() else {
            continue;
        };
        for entry in WalkDir::new(dirent) {
            let entry = entry.with_context(|| format!("Failed to walk {}", dirent.display()))?;
            let rel = entry
                .path()
                .strip_prefix(base)
                .with_context(|| format!("Unexpected path {}", entry.path().display()))?;
            let target = dest.join(rel);
            if entry.file_type().is_dir() {
                fs::create_dir_all(&target)
                    .with_context(|| format!("Failed to create {}", target.display()))?;
            } else {
                if let Some(parent) = target.parent() {
                    fs::create_dir_all(parent)
                        .with_context(|| format!("Failed to create {}", parent.display()))?;
                }
                fs::copy(entry.path(), &target).with_context(|| {
                    format!("Failed to copy {} to {}", entry.path().display(), target.display())
                })?;
                copied += 1;
            }
        }
    }
    tracing::debug!(dest = %dest.display(), copied, "Copied dirents");
    Ok(copied)
}

/// What `emit_program` put on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmittedProgram {
    pub units: Vec<PathBuf>,
    pub dirents_copied: usize,
}

/// Write the program's units and the app's dirents into `dest`.
pub fn emit_program(
    store: &dyn ProgramStore,
    program: &ProgramHandle,
    dirents: &[PathBuf],
    dest: &Path,
) -> Result<EmittedProgram> {
    let units = store
        .write(program, dest)
        .with_context(|| format!("Failed to write program to {}", dest.display()))?;
    let dirents_copied = copy_dirents(dirents, dest)?;
    Ok(EmittedProgram { units, dirents_copied })
}
