use std::path::{Path, PathBuf};

use anyhow::Result;
use benchload_core::catalog::Catalog;
use benchload_core::workspace::{load_catalog, load_ingest_config, IngestConfig, IngestLayout};

use crate::canonicalize_or_current;

/// Config files picked up from the current directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILES: [&str; 3] = ["benchload.yaml", "benchload.yml", "benchload.json"];

/// Everything a command needs: the resolved config, its layout and catalog.
#[derive(Debug)]
pub struct IngestContext {
    /// Directory relative config paths are resolved against.
    pub base: PathBuf,
    pub config: IngestConfig,
    pub layout: IngestLayout,
    pub catalog: Catalog,
}

impl IngestContext {
    /// Resolve the config (explicit path, a default file in the cwd, or
    /// defaults) and the catalog (`--catalog` overrides the config's).
    pub fn load(config: Option<&str>, catalog: Option<&str>) -> Result<Self> {
        let cwd = canonicalize_or_current(".")?;
        let config_path = match config {
            Some(path) => Some(canonicalize_or_current(path)?),
            None => DEFAULT_CONFIG_FILES.iter().map(|name| cwd.join(name)).find(|p| p.is_file()),
        };

        let (base, mut config) = match config_path {
            Some(path) => {
                let config = load_ingest_config(&path)?;
                tracing::debug!(path = %path.display(), "Loaded ingest config");
                let base = path.parent().map(Path::to_path_buf).unwrap_or_else(|| cwd.clone());
                (base, config)
            }
            None => (cwd, IngestConfig::default()),
        };
        if let Some(catalog) = catalog {
            config.catalog = Some(canonicalize_or_current(catalog)?);
        }

        let catalog = load_catalog(&base, &config)?;
        let layout = IngestLayout::from_config(&base, &config);
        Ok(Self { base, config, layout, catalog })
    }
}
