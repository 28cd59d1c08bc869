//! Data models
//!
//! Normalized records produced by the pipeline.

mod ingredient;
mod nutrition;
mod portion;

pub use ingredient::{clean_final_title, clean_survey_title, Ingredient};
pub use nutrition::{NutrientField, Nutrition};
pub use portion::{finalize_portions, Portion};
