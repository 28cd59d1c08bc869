//! Nutrition calculation module
//!
//! Handles nutrient aggregation and unit conversions.

pub mod aggregator;
pub mod units;

pub use aggregator::{aggregate, rule_for, Combine, NutrientCode, NutrientRule, NUTRIENT_RULES};
pub use units::{derived_energy_kcal, kj_to_kcal, round_to, vitamin_d_from_code_324};
