//! Run driver
//!
//! Walks the configured datasets in order. A dataset that fails is logged and
//! left out of the outputs while the rest of the run continues; an interrupt
//! stops the run immediately.

use std::fs;

use reqwest::blocking::Client;

use crate::config::Config;
use crate::dataset::{http_client, Dataset};
use crate::error::{PipelineError, PipelineResult};
use crate::sink::Sinks;
use crate::utils::{check_interrupt, measure};

/// Flags that force phases to run even when their output already exists
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    pub force_download: bool,
    pub force_extract: bool,
}

/// Outcome of one successfully processed dataset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetSummary {
    pub name: &'static str,
    pub written: usize,
    pub skipped: usize,
}

/// Everything a finished run produced
#[derive(Debug, Default)]
pub struct RunReport {
    pub completed: Vec<DatasetSummary>,
    pub failed: Vec<(&'static str, PipelineError)>,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn total_written(&self) -> usize {
        self.completed.iter().map(|s| s.written).sum()
    }
}

/// Create the output and scratch directories
pub fn prepare_directories(config: &Config) -> PipelineResult<()> {
    fs::create_dir_all(&config.outdir)?;
    fs::create_dir_all(&config.tempdir)?;
    Ok(())
}

/// Process every configured dataset into the configured outputs
pub fn run(config: &Config, options: RunOptions) -> PipelineResult<RunReport> {
    prepare_directories(config)?;
    let client = http_client()?;
    let mut sinks = Sinks::open(config)?;
    let mut report = RunReport::default();

    for (kind, edition) in &config.datasets {
        check_interrupt()?;
        let dataset = Dataset::new(*kind, edition.as_str(), &config.tempdir, &config.base_url);

        match process_dataset(&dataset, &client, &mut sinks, options) {
            Ok(summary) => {
                tracing::info!(
                    dataset = summary.name,
                    written = summary.written,
                    skipped = summary.skipped,
                    "dataset complete"
                );
                report.completed.push(summary);
            }
            Err(e) if e.is_interrupted() => return Err(e),
            Err(e) => {
                tracing::error!(dataset = dataset.name(), error = %e, "dataset failed");
                report.failed.push((dataset.name(), e));
            }
        }
    }

    Ok(report)
}

fn process_dataset(
    dataset: &Dataset,
    client: &Client,
    sinks: &mut Sinks,
    options: RunOptions,
) -> PipelineResult<DatasetSummary> {
    dataset.download(client, options.force_download)?;
    // A fresh archive invalidates previously extracted records
    dataset.extract(options.force_extract || options.force_download)?;

    measure(&format!("parsing {}", dataset.name()), || {
        let mut records = dataset.ingredients()?;
        let written = sinks.write_all(records.by_ref())?;
        let skipped = records.skipped();
        if skipped > 0 {
            tracing::warn!(dataset = dataset.name(), skipped, "records skipped");
        }
        Ok(DatasetSummary {
            name: dataset.name(),
            written,
            skipped,
        })
    })
}
