use std::fs;
use std::path::Path;

use crate::model::SourceInventory;

/// File name suffixes treated as compilable sources (case-sensitive).
pub const SOURCE_EXTENSIONS: [&str; 4] = [".c", ".cpp", ".h", ".hpp"];

pub fn is_source_name(name: &str) -> bool {
    SOURCE_EXTENSIONS.iter().any(|ext| name.ends_with(ext))
}

/// Classify the immediate children of `dir`.
///
/// Subdirectories are reported as opaque paths and never descended into. A
/// directory that cannot be listed yields an empty inventory; the error is
/// logged rather than returned.
pub fn scan_sources(dir: &Path) -> SourceInventory {
    let mut inventory = SourceInventory::default();

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            tracing::warn!(path = %dir.display(), "Error reading files: {err}");
            return inventory;
        }
    };

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                tracing::warn!(path = %dir.display(), "Skipping unreadable entry: {err}");
                continue;
            }
        };
        let path = entry.path();
        if path.is_dir() {
            inventory.subdirs.push(path);
            continue;
        }
        let name = entry.file_name();
        let is_source = path.is_file() && name.to_str().map(is_source_name).unwrap_or(false);
        if is_source {
            inventory.sources.push(path);
        } else {
            inventory.non_sources.push(path);
        }
    }

    inventory.sources.sort();
    inventory.non_sources.sort();
    inventory.subdirs.sort();

    tracing::debug!(
        path = %dir.display(),
        sources = inventory.sources.len(),
        non_sources = inventory.non_sources.len(),
        subdirs = inventory.subdirs.len(),
        "Scanned benchmark folder"
    );
    inventory
}
