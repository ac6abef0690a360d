use anyhow::{bail, Result};
use serde::Serialize;

use benchload_core::model::SourceInventory;
use benchload_core::services::scan_sources;

use crate::canonicalize_or_current;

#[derive(Debug, Serialize)]
pub struct ScanReport {
    pub dir: String,
    #[serde(flatten)]
    pub inventory: SourceInventory,
    pub dirents_to_copy: Vec<String>,
}

/// Classify the immediate children of a benchmark folder.
pub fn scan_command(dir: &str, json: bool) -> Result<()> {
    let dir_path = canonicalize_or_current(dir)?;
    if !dir_path.is_dir() {
        bail!("Not a directory: {}", dir_path.display());
    }
    let inventory = scan_sources(&dir_path);
    let dirents_to_copy =
        inventory.dirents_to_copy().iter().map(|p| p.display().to_string()).collect();
    let report = ScanReport { dir: dir_path.display().to_string(), inventory, dirents_to_copy };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Scan of {}", report.dir);
    println!("Sources ({}):", report.inventory.sources.len());
    for path in &report.inventory.sources {
        println!("  - {}", path.display());
    }
    println!("Non-sources ({}):", report.inventory.non_sources.len());
    for path in &report.inventory.non_sources {
        println!("  - {}", path.display());
    }
    println!("Subdirectories ({}):", report.inventory.subdirs.len());
    for path in &report.inventory.subdirs {
        println!("  - {}", path.display());
    }
    Ok(())
}
