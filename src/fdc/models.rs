//! Raw FDC food item model
//!
//! Mirrors one element of the `FoodData_Central_*_food_json_*.json` arrays.
//! Unknown fields are ignored.

use serde::{de, Deserialize, Deserializer, Serialize};

/// Food class tag on a source record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FoodClass {
    /// Standard reference foods (foundation and SR legacy datasets)
    #[serde(rename = "FinalFood")]
    Final,
    /// Dietary survey (FNDDS) foods
    Survey,
    /// Commercial branded foods
    Branded,
}

impl FoodClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            FoodClass::Final => "FinalFood",
            FoodClass::Survey => "Survey",
            FoodClass::Branded => "Branded",
        }
    }
}

/// One food record
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodItem {
    pub food_class: FoodClass,
    pub description: String,
    pub food_nutrients: Vec<FoodNutrient>,
    pub fdc_id: i64,
    pub publication_date: String,
    #[serde(default)]
    pub food_portions: Vec<FoodPortion>,
}

/// A nutrient amount measured for a food
#[derive(Debug, Clone, Deserialize)]
pub struct FoodNutrient {
    pub nutrient: Nutrient,
    /// Present but null amounts read as zero; an absent amount is an error
    #[serde(deserialize_with = "lenient_f64")]
    pub amount: f64,
}

/// Nutrient definition attached to a food nutrient
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Nutrient {
    /// Nutrient code, e.g. 208 or 205.2 (archives encode it as a string)
    #[serde(deserialize_with = "lenient_f64")]
    pub number: f64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub unit_name: String,
    #[serde(default)]
    pub rank: Option<u32>,
}

/// Measure unit of a final-food portion
#[derive(Debug, Clone, Deserialize)]
pub struct MeasureUnit {
    pub name: String,
    #[serde(default)]
    pub abbreviation: String,
}

/// A raw serving description
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodPortion {
    #[serde(default)]
    pub measure_unit: Option<MeasureUnit>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub gram_weight: f64,
    #[serde(default)]
    pub modifier: Option<String>,
    #[serde(default)]
    pub portion_description: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f64),
    Text(String),
}

/// Accept numbers, numeric strings, and null (read as 0.0)
fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<NumberOrText>::deserialize(deserializer)? {
        None => Ok(0.0),
        Some(NumberOrText::Number(n)) => Ok(n),
        Some(NumberOrText::Text(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Ok(0.0)
            } else {
                trimmed.parse().map_err(de::Error::custom)
            }
        }
    }
}
