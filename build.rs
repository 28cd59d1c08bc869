//! Build script for FoodPrep
//!
//! Stamps the binary with a build number and UTC build time for `--version`.

use std::env;
use std::fs;
use std::path::Path;

/// Local build counter, kept next to Cargo.toml
const COUNTER_FILE: &str = "build_number.txt";

fn main() {
    println!("cargo:rerun-if-changed=src");
    println!("cargo:rerun-if-env-changed=FOODPREP_BUILD_NUMBER");

    // CI pins the number; local builds bump the counter file
    let build_number = match env::var("FOODPREP_BUILD_NUMBER") {
        Ok(pinned) if pinned.trim().parse::<u64>().is_ok() => pinned.trim().to_string(),
        _ => next_local_build().to_string(),
    };
    let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");

    println!("cargo:rustc-env=FOODPREP_BUILD_NUMBER={}", build_number);
    println!("cargo:rustc-env=FOODPREP_BUILD_TIMESTAMP={}", timestamp);
}

fn next_local_build() -> u64 {
    let path = Path::new(COUNTER_FILE);
    let next = fs::read_to_string(path)
        .ok()
        .and_then(|s| s.trim().parse::<u64>().ok())
        .unwrap_or(0)
        + 1;

    if let Err(e) = fs::write(path, next.to_string()) {
        println!("cargo:warning=could not persist build number: {}", e);
    }
    next
}
