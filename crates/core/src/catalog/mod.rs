//! Benchmark catalog: suites, their apps, and name resolution.
//!
//! The built-in catalog is embedded from `builtin.yaml`. A project may point
//! at its own catalog file (YAML or JSON, chosen by extension) instead.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::CatalogEntry;

const BUILTIN_CATALOG: &str = include_str!("builtin.yaml");

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Unknown benchmark suite '{0}'")]
    UnknownSuite(String),
    #[error("Unknown app '{app}' in suite '{suite}'")]
    UnknownApp { suite: String, app: String },
    #[error("Failed to read catalog at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse catalog YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Failed to parse catalog JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Duplicate app '{app}' in suite '{suite}'")]
    DuplicateApp { suite: String, app: String },
}

/// Per-app catalog record, as written in the catalog file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppSummary {
    /// Lookup key within the suite.
    pub key: String,
    pub canonical_name: String,
    pub standard: String,
    pub top_function: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt_top_function: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub amalgamate: bool,
    /// Free-form description of the inputs the app expects.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inputs: Option<String>,
}

/// A named group of apps sharing a directory prefix and compiler flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenchmarkSuite {
    pub name: String,
    /// Directory prefix relative to the benchmarks root, e.g. `benchmarks/Rosetta/`.
    pub path: String,
    #[serde(default)]
    pub flags: Vec<String>,
    pub apps: Vec<AppSummary>,
}

impl BenchmarkSuite {
    /// App keys in catalog order.
    pub fn app_list(&self) -> Vec<String> {
        self.apps.iter().map(|a| a.key.clone()).collect()
    }

    pub fn app(&self, key: &str) -> Option<&AppSummary> {
        self.apps.iter().find(|a| a.key == key)
    }

    /// Resolve an app key into a full catalog entry.
    pub fn entry(&self, key: &str) -> Result<CatalogEntry, CatalogError> {
        let app = self.app(key).ok_or_else(|| CatalogError::UnknownApp {
            suite: self.name.clone(),
            app: key.to_string(),
        })?;
        Ok(CatalogEntry {
            suite: self.name.clone(),
            key: app.key.clone(),
            canonical_name: app.canonical_name.clone(),
            subpath: Path::new(&self.path).join(&app.canonical_name),
            standard: app.standard.clone(),
            flags: self.flags.clone(),
            top_function: app.top_function.clone(),
            alt_top_function: app.alt_top_function.clone(),
            amalgamate: app.amalgamate,
        })
    }

    /// Resolve every app in catalog order.
    pub fn entries(&self) -> Vec<CatalogEntry> {
        self.apps.iter().filter_map(|a| self.entry(&a.key).ok()).collect()
    }
}

/// The full set of known suites.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    suites: Vec<BenchmarkSuite>,
}

impl Catalog {
    pub fn new(suites: Vec<BenchmarkSuite>) -> Result<Self, CatalogError> {
        for suite in &suites {
            let mut seen = std::collections::HashSet::new();
            for app in &suite.apps {
                if !seen.insert(app.key.as_str()) {
                    return Err(CatalogError::DuplicateApp {
                        suite: suite.name.clone(),
                        app: app.key.clone(),
                    });
                }
            }
        }
        Ok(Self { suites })
    }

    /// Catalog compiled into the crate.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_yaml(BUILTIN_CATALOG)
    }

    pub fn from_yaml(body: &str) -> Result<Self, CatalogError> {
        Self::new(serde_yaml::from_str(body)?)
    }

    pub fn from_json(body: &str) -> Result<Self, CatalogError> {
        Self::new(serde_json::from_str(body)?)
    }

    /// Load a catalog file, picking the format from its extension
    /// (`.json` is JSON, anything else YAML).
    pub fn from_path(path: &Path) -> Result<Self, CatalogError> {
        let body = std::fs::read_to_string(path)
            .map_err(|source| CatalogError::Io { path: path.to_path_buf(), source })?;
        if path.extension().and_then(|e| e.to_str()) == Some("json") {
            Self::from_json(&body)
        } else {
            Self::from_yaml(&body)
        }
    }

    pub fn suites(&self) -> &[BenchmarkSuite] {
        &self.suites
    }

    /// Suite lookup; names compare case-insensitively.
    pub fn suite(&self, name: &str) -> Result<&BenchmarkSuite, CatalogError> {
        self.suites
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| CatalogError::UnknownSuite(name.to_string()))
    }

    /// The single name-to-entry resolution step used at every boundary.
    pub fn entry(&self, suite: &str, app: &str) -> Result<CatalogEntry, CatalogError> {
        self.suite(suite)?.entry(app)
    }
}
