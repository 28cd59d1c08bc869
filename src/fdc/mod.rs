//! FoodData Central source records
//!
//! Serde models for the raw JSON objects found in FDC archives.

mod models;

pub use models::{FoodClass, FoodItem, FoodNutrient, FoodPortion, MeasureUnit, Nutrient};
