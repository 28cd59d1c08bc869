//! FoodPrep Library
//!
//! Builds a normalized ingredient dataset from USDA FoodData Central
//! archives: download, extract, transform, and write NDJSON and SQLite.

pub mod build_info;
pub mod config;
pub mod dataset;
pub mod db;
pub mod error;
pub mod fdc;
pub mod models;
pub mod nutrition;
pub mod pipeline;
pub mod sink;
pub mod utils;
