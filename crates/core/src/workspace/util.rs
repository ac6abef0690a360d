use std::path::Path;

use anyhow::{Context, Result};

use crate::catalog::Catalog;
use crate::workspace::IngestConfig;

/// Load an ingestion config from disk; `.json` files are JSON, others YAML.
pub fn load_ingest_config(path: &Path) -> Result<IngestConfig> {
    let body = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read ingest config at {}", path.display()))?;
    let config: IngestConfig = if path.extension().and_then(|e| e.to_str()) == Some("json") {
        serde_json::from_str(&body).context("Failed to parse ingest config JSON")?
    } else {
        serde_yaml::from_str(&body).context("Failed to parse ingest config YAML")?
    };
    if config.max_build_attempts == 0 {
        anyhow::bail!("max_build_attempts must be at least 1");
    }
    Ok(config)
}

/// Load the catalog named by `config` (resolved against `base`), or the
/// built-in catalog when none is configured.
pub fn load_catalog(base: &Path, config: &IngestConfig) -> Result<Catalog> {
    match &config.catalog {
        Some(path) => {
            let path = base.join(path);
            Catalog::from_path(&path)
                .with_context(|| format!("Failed to load catalog at {}", path.display()))
        }
        None => Catalog::builtin().context("Failed to load built-in catalog"),
    }
}
