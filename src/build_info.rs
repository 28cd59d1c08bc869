//! Build metadata shown by `--version` and the startup banner
//!
//! The build number and timestamp are set by `build.rs`.

/// Package version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Counter bumped on each local build, or pinned by CI
pub const BUILD_NUMBER: &str = env!("FOODPREP_BUILD_NUMBER");

/// UTC build time, ISO 8601
pub const BUILD_TIMESTAMP: &str = env!("FOODPREP_BUILD_TIMESTAMP");

/// `--version` text, e.g. `1.0.0 (build 42, 2024-01-02T03:04:05Z)`
pub const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (build ",
    env!("FOODPREP_BUILD_NUMBER"),
    ", ",
    env!("FOODPREP_BUILD_TIMESTAMP"),
    ")"
);

/// Print the startup banner to stderr
pub fn print_startup_banner() {
    eprintln!("FoodPrep {} - FoodData Central ingredient builder", LONG_VERSION);
}
