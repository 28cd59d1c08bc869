//! Run configuration
//!
//! Loaded from a TOML file (`foodprep.toml` by default):
//!
//! ```toml
//! outdir = "./datasets"
//! tempdir = "./temp"
//! formats = ["ndjson", "sqlite"]
//!
//! [datasets]
//! foundation = "2022-04-28"
//! survey = "2022-04-28"
//! ```
//!
//! `FOODPREP_OUTDIR` and `FOODPREP_TEMPDIR` override the directories.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dataset::DatasetKind;

/// Default location of published FDC archives
pub const DEFAULT_BASE_URL: &str = "https://fdc.nal.usda.gov/fdc-datasets";

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Result type for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Serialized output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Ndjson,
    Sqlite,
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(default = "default_outdir")]
    outdir: PathBuf,
    #[serde(default = "default_tempdir")]
    tempdir: PathBuf,
    formats: Vec<OutputFormat>,
    #[serde(default = "default_base_url")]
    base_url: String,
    datasets: BTreeMap<String, String>,
}

fn default_outdir() -> PathBuf {
    PathBuf::from("./datasets")
}

fn default_tempdir() -> PathBuf {
    PathBuf::from("./temp")
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

/// Validated run configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub outdir: PathBuf,
    pub tempdir: PathBuf,
    pub formats: Vec<OutputFormat>,
    pub base_url: String,
    /// (dataset, edition) pairs in processing order
    pub datasets: Vec<(DatasetKind, String)>,
}

impl Config {
    /// Load from a TOML file and apply environment overrides
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml_str(&content)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        let raw: RawConfig = toml::from_str(content)?;

        if raw.formats.is_empty() {
            return Err(ConfigError::Invalid("at least one output format is required".into()));
        }
        if raw.datasets.is_empty() {
            return Err(ConfigError::Invalid("no datasets configured".into()));
        }

        let mut datasets = Vec::with_capacity(raw.datasets.len());
        for (name, edition) in raw.datasets {
            let kind = DatasetKind::from_name(&name)
                .ok_or_else(|| ConfigError::Invalid(format!("unknown dataset '{}'", name)))?;
            if edition.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("dataset '{}' has no edition", name)));
            }
            datasets.push((kind, edition.trim().to_string()));
        }

        let mut formats: Vec<OutputFormat> = Vec::with_capacity(raw.formats.len());
        for format in raw.formats {
            if !formats.contains(&format) {
                formats.push(format);
            }
        }

        Ok(Self {
            outdir: raw.outdir,
            tempdir: raw.tempdir,
            formats,
            base_url: raw.base_url.trim_end_matches('/').to_string(),
            datasets,
        })
    }

    /// Override directories from environment-style lookups
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup("FOODPREP_OUTDIR").filter(|s| !s.is_empty()) {
            self.outdir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup("FOODPREP_TEMPDIR").filter(|s| !s.is_empty()) {
            self.tempdir = PathBuf::from(dir);
        }
    }

    pub fn wants(&self, format: OutputFormat) -> bool {
        self.formats.contains(&format)
    }

    pub fn ndjson_path(&self) -> PathBuf {
        self.outdir.join("dataset.ndjson")
    }

    pub fn sqlite_path(&self) -> PathBuf {
        self.outdir.join("dataset.sqlite")
    }
}
