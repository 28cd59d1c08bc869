//! Ingredient model
//!
//! The normalized output record built from one raw FDC food item.

use std::sync::OnceLock;

use regex::Regex;
use rusqlite::{params, Connection, ToSql};
use serde::{Deserialize, Serialize};

use crate::db::DbResult;
use crate::error::{TransformError, TransformResult};
use crate::fdc::{FoodClass, FoodItem};
use crate::nutrition::aggregate;
use crate::utils::mdy_to_ymd;

use super::portion::finalize_portions;
use super::{Nutrition, Portion};

fn added_ingredients_re() -> &'static Regex {
    static ADDED_INGREDIENTS_RE: OnceLock<Regex> = OnceLock::new();
    ADDED_INGREDIENTS_RE.get_or_init(|| {
        Regex::new(r", with add(?:\w+) ingredients").expect("valid added-ingredients regex")
    })
}

fn comma_space_re() -> &'static Regex {
    static COMMA_SPACE_RE: OnceLock<Regex> = OnceLock::new();
    COMMA_SPACE_RE.get_or_init(|| Regex::new(r"(\w+),(\w+)").expect("valid comma regex"))
}

fn not_specified_re() -> &'static Regex {
    static NOT_SPECIFIED_RE: OnceLock<Regex> = OnceLock::new();
    NOT_SPECIFIED_RE
        .get_or_init(|| Regex::new(r", NS (?:as|to) \w+").expect("valid NS qualifier regex"))
}

fn as_ingredient_re() -> &'static Regex {
    static AS_INGREDIENT_RE: OnceLock<Regex> = OnceLock::new();
    AS_INGREDIENT_RE
        .get_or_init(|| Regex::new(r",? as ingredient.*").expect("valid as-ingredient regex"))
}

/// Title cleanup shared by every supported food class
pub fn clean_final_title(description: &str) -> String {
    let title = added_ingredients_re().replace_all(description, "");
    comma_space_re().replace_all(&title, "$1, $2").into_owned()
}

/// Survey titles also drop FNDDS "not specified" qualifiers
pub fn clean_survey_title(description: &str) -> String {
    let title = clean_final_title(description);
    let title = not_specified_re().replace_all(&title, "");
    let title = as_ingredient_re().replace_all(&title, "");
    title.replacen(", NFS", "", 1).replacen("or NFS", "", 1)
}

/// A normalized ingredient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub title: String,
    pub fdc_id: i64,
    /// ISO date: "2020-01-02"
    pub fdc_date: String,
    pub nutrition: Nutrition,
    /// Ascending by grams
    pub portions: Vec<Portion>,
}

impl Ingredient {
    /// Build an ingredient from a raw FDC record, dispatching on its food class
    pub fn from_fdc(item: &FoodItem) -> TransformResult<Self> {
        let (title, portions) = match item.food_class {
            FoodClass::Final => (
                clean_final_title(&item.description),
                Portion::from_final_portions(&item.food_portions)?,
            ),
            FoodClass::Survey => (
                clean_survey_title(&item.description),
                Portion::from_survey_portions(&item.food_portions),
            ),
            FoodClass::Branded => {
                return Err(TransformError::NotImplemented(item.food_class.as_str()))
            }
        };

        let nutrition = aggregate(
            item.food_nutrients
                .iter()
                .map(|n| (n.nutrient.number, n.amount)),
        );

        Ok(Self {
            title,
            fdc_id: item.fdc_id,
            fdc_date: mdy_to_ymd(&item.publication_date)?,
            nutrition,
            portions: finalize_portions(portions),
        })
    }

    /// Serialize as one NDJSON line, newline included
    pub fn to_json_line(&self) -> serde_json::Result<String> {
        let mut line = serde_json::to_string(self)?;
        line.push('\n');
        Ok(line)
    }

    /// Insert this ingredient, its nutrition row and its portions
    pub fn insert(&self, conn: &Connection) -> DbResult<()> {
        conn.prepare_cached("INSERT INTO ingredients (fdc_id, fdc_date, title) VALUES (?1, ?2, ?3)")?
            .execute(params![self.fdc_id, self.fdc_date, self.title])?;

        let values: Vec<f64> = self.nutrition.columns().map(|(_, value)| value).collect();
        let mut nutrition_params: Vec<&dyn ToSql> = Vec::with_capacity(values.len() + 1);
        nutrition_params.push(&self.fdc_id);
        for value in &values {
            nutrition_params.push(value);
        }
        conn.prepare_cached(nutrition_insert_sql())?
            .execute(nutrition_params.as_slice())?;

        let mut stmt =
            conn.prepare_cached("INSERT INTO portions (fdc_id, title, grams) VALUES (?1, ?2, ?3)")?;
        for portion in &self.portions {
            stmt.execute(params![self.fdc_id, portion.title, portion.grams])?;
        }

        Ok(())
    }
}

fn nutrition_insert_sql() -> &'static str {
    static NUTRITION_INSERT_SQL: OnceLock<String> = OnceLock::new();
    NUTRITION_INSERT_SQL.get_or_init(|| {
        let columns: Vec<&str> = Nutrition::FIELDS.iter().map(|f| f.column_name()).collect();
        let placeholders: Vec<String> = (1..=columns.len() + 1).map(|i| format!("?{}", i)).collect();
        format!(
            "INSERT INTO nutrition (fdc_id, {}) VALUES ({})",
            columns.join(", "),
            placeholders.join(", ")
        )
    })
}
