//! FoodPrep
//!
//! Command-line entry point for building the ingredient dataset.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use foodprep::build_info;
use foodprep::config::Config;
use foodprep::pipeline::{self, RunOptions};
use foodprep::utils::install_interrupt_handler;

/// Exit status after Ctrl-C (128 + SIGINT)
const EXIT_INTERRUPTED: u8 = 130;

#[derive(Debug, Parser)]
#[command(
    name = "foodprep",
    version,
    long_version = build_info::LONG_VERSION,
    about = "Build an ingredient dataset from USDA FoodData Central"
)]
struct Cli {
    /// Download archives even if they are already present
    #[arg(long)]
    download: bool,

    /// Re-extract records even if they are already present
    #[arg(long)]
    extract: bool,

    /// Configuration file
    #[arg(long, env = "FOODPREP_CONFIG", default_value = "foodprep.toml")]
    config: PathBuf,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging (stderr, shared with phase timings)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("foodprep=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    build_info::print_startup_banner();

    if let Err(e) = install_interrupt_handler() {
        tracing::warn!(error = %e, "Ctrl-C handler not installed");
    }

    let config = match Config::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    eprintln!("Output directory: {}", config.outdir.display());
    eprintln!("Scratch directory: {}", config.tempdir.display());

    let options = RunOptions {
        force_download: cli.download,
        force_extract: cli.extract,
    };

    match pipeline::run(&config, options) {
        Ok(report) => {
            eprintln!(
                "Wrote {} ingredient(s) from {} dataset(s)",
                report.total_written(),
                report.completed.len()
            );
            for (name, e) in &report.failed {
                eprintln!("Dataset {} failed: {}", name, e);
            }
            if report.is_success() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Err(e) if e.is_interrupted() => {
            eprintln!("Interrupted");
            ExitCode::from(EXIT_INTERRUPTED)
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_long_version_shows_build() {
        let text = Cli::command().render_long_version();
        assert!(text.contains(build_info::LONG_VERSION));
        assert!(text.contains(&format!("build {}", build_info::BUILD_NUMBER)));
    }

    #[test]
    fn test_force_flags() {
        let cli = Cli::parse_from(["foodprep", "--download", "--config", "other.toml"]);
        assert!(cli.download);
        assert!(!cli.extract);
        assert_eq!(cli.config, PathBuf::from("other.toml"));
    }
}
