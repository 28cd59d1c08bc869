//! Serving-size portions
//!
//! Final foods describe a portion as a measure unit plus an optional modifier;
//! survey foods use a free-text description. Each gets its own cleanup rules.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{TransformError, TransformResult};
use crate::fdc::FoodPortion;

/// Modifier substrings that must not be appended to a final-food label
const BANNED_MODIFIERS: [&str; 2] = ["dia", "NLEA"];

fn survey_ns_re() -> &'static Regex {
    static SURVEY_NS_RE: OnceLock<Regex> = OnceLock::new();
    SURVEY_NS_RE.get_or_init(|| Regex::new(r", ns (?:as|to) \w+").expect("valid ns regex"))
}

/// A named serving size with its weight in grams
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Portion {
    pub title: String,
    pub grams: f64,
}

impl Portion {
    pub fn new(title: impl Into<String>, grams: f64) -> Self {
        Self {
            title: title.into(),
            grams,
        }
    }

    /// Non-empty label and positive weight
    pub fn is_valid(&self) -> bool {
        !self.title.is_empty() && self.grams > 0.0
    }

    /// Labels for final-food portions: `<unit> (<modifier>)`, lowercased unit
    pub fn from_final_portions(portions: &[FoodPortion]) -> TransformResult<Vec<Portion>> {
        let mut out = Vec::with_capacity(portions.len());
        for portion in portions {
            let unit = portion
                .measure_unit
                .as_ref()
                .ok_or(TransformError::MissingField("measureUnit"))?;
            if unit.name.is_empty() {
                continue;
            }

            let mut title = unit.name.to_lowercase();
            if let Some(modifier) = portion.modifier.as_deref() {
                if !modifier.is_empty() && !BANNED_MODIFIERS.iter().any(|b| modifier.contains(b)) {
                    title = format!("{} ({})", title, modifier.trim());
                }
            }
            let title = title.replacen('~', "approx ", 1);

            out.push(Portion::new(title, portion.gram_weight));
        }
        Ok(out)
    }

    /// Labels for survey portions, taken from the lowercased description
    pub fn from_survey_portions(portions: &[FoodPortion]) -> Vec<Portion> {
        portions
            .iter()
            .filter_map(|portion| {
                let description = portion.portion_description.as_deref()?;
                if description.is_empty() || portion.gram_weight == 0.0 {
                    return None;
                }

                let title = description.to_lowercase();
                if title.contains("not specified") {
                    return None;
                }

                let title = survey_ns_re().replace_all(&title, "");
                let title = title
                    .replacen(", nfs", "", 1)
                    .replacen("guideline amount per ", "", 1)
                    .replacen(" dia", "", 1);

                Some(Portion::new(title, portion.gram_weight))
            })
            .collect()
    }
}

/// Drop invalid candidates and order by weight, lightest first
pub fn finalize_portions(mut portions: Vec<Portion>) -> Vec<Portion> {
    portions.retain(Portion::is_valid);
    portions.sort_by(|a, b| a.grams.total_cmp(&b.grams));
    portions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fdc::MeasureUnit;

    fn final_portion(unit: &str, modifier: Option<&str>, grams: f64) -> FoodPortion {
        FoodPortion {
            measure_unit: Some(MeasureUnit {
                name: unit.to_string(),
                abbreviation: String::new(),
            }),
            gram_weight: grams,
            modifier: modifier.map(str::to_string),
            portion_description: None,
        }
    }

    fn survey_portion(description: Option<&str>, grams: f64) -> FoodPortion {
        FoodPortion {
            measure_unit: None,
            gram_weight: grams,
            modifier: None,
            portion_description: description.map(str::to_string),
        }
    }

    #[test]
    fn test_final_label_with_modifier() {
        let portions = [final_portion("Cup", Some(" chopped "), 160.0)];
        let out = Portion::from_final_portions(&portions).unwrap();
        assert_eq!(out, vec![Portion::new("cup (chopped)", 160.0)]);
    }

    #[test]
    fn test_final_banned_modifiers_not_appended() {
        let portions = [
            final_portion("RACC", Some("NLEA serving"), 140.0),
            final_portion("slice", Some("medium (2-1/2\" dia)"), 20.0),
        ];
        let out = Portion::from_final_portions(&portions).unwrap();
        assert_eq!(out[0].title, "racc");
        assert_eq!(out[1].title, "slice");
    }

    #[test]
    fn test_final_skips_empty_unit_name() {
        let portions = [final_portion("", Some("whole"), 50.0), final_portion("piece", None, 12.0)];
        let out = Portion::from_final_portions(&portions).unwrap();
        assert_eq!(out, vec![Portion::new("piece", 12.0)]);
    }

    #[test]
    fn test_final_replaces_first_tilde() {
        let portions = [final_portion("~1 cup", Some("~packed"), 200.0)];
        let out = Portion::from_final_portions(&portions).unwrap();
        assert_eq!(out[0].title, "approx 1 cup (~packed)");
    }

    #[test]
    fn test_final_empty_modifier_ignored() {
        let portions = [final_portion("Tbsp", Some(""), 15.0)];
        let out = Portion::from_final_portions(&portions).unwrap();
        assert_eq!(out[0].title, "tbsp");
    }

    #[test]
    fn test_final_missing_measure_unit() {
        let portions = [survey_portion(Some("1 cup"), 240.0)];
        let err = Portion::from_final_portions(&portions).unwrap_err();
        assert!(matches!(err, TransformError::MissingField("measureUnit")));
    }

    #[test]
    fn test_survey_cleanup_rules() {
        let portions = [
            survey_portion(Some("1 cup, NS as cooked"), 240.0),
            survey_portion(Some("1 slice, NFS"), 30.0),
            survey_portion(Some("Guideline amount per cup"), 100.0),
            survey_portion(Some("1 muffin (3\" dia)"), 57.0),
        ];
        let out = Portion::from_survey_portions(&portions);
        let titles: Vec<&str> = out.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["1 cup", "1 slice", "cup", "1 muffin (3\")"]);
    }

    #[test]
    fn test_survey_skips_not_specified_and_weightless() {
        let portions = [
            survey_portion(Some("Quantity not specified"), 100.0),
            survey_portion(Some("1 cup"), 0.0),
            survey_portion(None, 50.0),
            survey_portion(Some(""), 50.0),
            survey_portion(Some("1 tablespoon"), 15.0),
        ];
        let out = Portion::from_survey_portions(&portions);
        assert_eq!(out, vec![Portion::new("1 tablespoon", 15.0)]);
    }

    #[test]
    fn test_finalize_sorts_and_drops_invalid() {
        let out = finalize_portions(vec![
            Portion::new("cup", 240.0),
            Portion::new("tbsp", 15.0),
            Portion::new("", 10.0),
            Portion::new("pinch", 0.0),
            Portion::new("oz", 28.35),
        ]);
        let grams: Vec<f64> = out.iter().map(|p| p.grams).collect();
        assert_eq!(grams, vec![15.0, 28.35, 240.0]);
        assert!(out.iter().all(Portion::is_valid));
    }

    #[test]
    fn test_finalize_is_stable_for_equal_weights() {
        let out = finalize_portions(vec![Portion::new("b", 10.0), Portion::new("a", 10.0)]);
        assert_eq!(out[0].title, "b");
        assert_eq!(out[1].title, "a");
    }
}
