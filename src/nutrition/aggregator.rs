//! Nutrient aggregation
//!
//! Folds the code-keyed nutrient list of one FDC food into a [`Nutrition`]
//! record. Several nutrient codes describe the same nutrient under different
//! measurement standards, so each code maps to a target field plus a rule
//! for combining with whatever that field already holds.

use crate::models::{NutrientField, Nutrition};

use super::units::{derived_energy_kcal, kj_to_kcal, round_to, vitamin_d_from_code_324};

/// FDC nutrient number stored as fixed-point tenths (205.2 -> 2052)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NutrientCode(u32);

impl NutrientCode {
    /// A whole-number code such as 208
    pub const fn whole(number: u32) -> Self {
        NutrientCode(number * 10)
    }

    /// A code given in tenths, e.g. `tenths(2052)` for 205.2
    pub const fn tenths(tenths: u32) -> Self {
        NutrientCode(tenths)
    }

    /// Exact conversion from the numeric form found in archives.
    ///
    /// Returns `None` for negative, non-finite, or finer-than-tenths numbers.
    pub fn from_number(number: f64) -> Option<Self> {
        if !number.is_finite() || number < 0.0 {
            return None;
        }
        let scaled = number * 10.0;
        let rounded = scaled.round();
        if (scaled - rounded).abs() > 1e-6 || rounded > u32::MAX as f64 {
            return None;
        }
        Some(NutrientCode(rounded as u32))
    }
}

/// How an amount combines with the current value of its target field
#[derive(Debug, Clone, Copy)]
pub enum Combine {
    /// Last write wins
    Overwrite,
    /// Running maximum
    Max,
    /// Running maximum, also raised into a second field
    MaxAlso(NutrientField),
    /// Running maximum after converting the amount
    ConvertedMax(fn(f64) -> f64),
}

/// Target field and combine policy for one nutrient code
#[derive(Debug, Clone, Copy)]
pub struct NutrientRule {
    pub code: NutrientCode,
    pub field: NutrientField,
    pub combine: Combine,
}

const fn rule(code: NutrientCode, field: NutrientField, combine: Combine) -> NutrientRule {
    NutrientRule {
        code,
        field,
        combine,
    }
}

use Combine::{ConvertedMax, Max, MaxAlso, Overwrite};
use NutrientField as F;

/// Every nutrient code the schema understands. Codes not listed are ignored.
pub static NUTRIENT_RULES: &[NutrientRule] = &[
    // energy
    rule(NutrientCode::whole(208), F::EnergyKcal, Max),
    rule(NutrientCode::whole(957), F::EnergyKcal, Max),
    rule(NutrientCode::whole(958), F::EnergyKcal, Max),
    rule(NutrientCode::whole(268), F::EnergyKcal, ConvertedMax(kj_to_kcal)),
    // cholesterol and protein
    rule(NutrientCode::whole(601), F::CholesterolMg, Overwrite),
    rule(NutrientCode::whole(203), F::ProteinG, Overwrite),
    // carbohydrates
    rule(NutrientCode::whole(205), F::CarbsTotalG, Max),
    rule(NutrientCode::tenths(2052), F::CarbsTotalG, Max),
    rule(NutrientCode::whole(209), F::CarbsTotalG, Max),
    rule(NutrientCode::whole(269), F::CarbsSugarG, MaxAlso(F::CarbsTotalG)),
    rule(NutrientCode::tenths(2693), F::CarbsSugarG, MaxAlso(F::CarbsTotalG)),
    rule(NutrientCode::whole(291), F::CarbsFibreG, MaxAlso(F::CarbsTotalG)),
    rule(NutrientCode::whole(293), F::CarbsFibreG, MaxAlso(F::CarbsTotalG)),
    rule(NutrientCode::whole(295), F::CarbsFibreG, MaxAlso(F::CarbsTotalG)),
    rule(NutrientCode::whole(297), F::CarbsFibreG, MaxAlso(F::CarbsTotalG)),
    // fats
    rule(NutrientCode::whole(204), F::FatTotalG, Max),
    rule(NutrientCode::whole(298), F::FatTotalG, Max),
    rule(NutrientCode::whole(645), F::FatMonoG, MaxAlso(F::FatTotalG)),
    rule(NutrientCode::whole(646), F::FatPolyG, MaxAlso(F::FatTotalG)),
    rule(NutrientCode::whole(606), F::FatSatG, MaxAlso(F::FatTotalG)),
    rule(NutrientCode::whole(605), F::FatTransG, MaxAlso(F::FatTotalG)),
    rule(NutrientCode::whole(693), F::FatTransG, MaxAlso(F::FatTotalG)),
    rule(NutrientCode::whole(694), F::FatTransG, MaxAlso(F::FatTotalG)),
    rule(NutrientCode::whole(695), F::FatTransG, MaxAlso(F::FatTotalG)),
    // minerals
    rule(NutrientCode::whole(301), F::CalciumMg, Overwrite),
    rule(NutrientCode::whole(303), F::IronMg, Overwrite),
    rule(NutrientCode::whole(304), F::MagnesiumMg, Overwrite),
    rule(NutrientCode::whole(306), F::PotassiumMg, Overwrite),
    rule(NutrientCode::whole(307), F::SodiumMg, Overwrite),
    rule(NutrientCode::whole(309), F::ZincMg, Overwrite),
    rule(NutrientCode::whole(317), F::SeleniumUg, Overwrite),
    // vitamins
    rule(NutrientCode::whole(320), F::VitaminAUg, Overwrite),
    rule(NutrientCode::whole(401), F::VitaminCMg, Overwrite),
    rule(NutrientCode::whole(404), F::ThiaminMg, Overwrite),
    rule(NutrientCode::whole(405), F::RiboflavinMg, Overwrite),
    rule(NutrientCode::whole(406), F::NiacinMg, Overwrite),
    rule(NutrientCode::whole(415), F::VitaminB6Mg, Overwrite),
    rule(NutrientCode::whole(417), F::FolateUg, Max),
    rule(NutrientCode::whole(432), F::FolateUg, Max),
    rule(NutrientCode::whole(435), F::FolateUg, Max),
    rule(NutrientCode::whole(418), F::VitaminB12Ug, Max),
    rule(NutrientCode::whole(578), F::VitaminB12Ug, Max),
    rule(NutrientCode::whole(323), F::VitaminEMg, Max),
    rule(NutrientCode::whole(573), F::VitaminEMg, Max),
    rule(NutrientCode::whole(328), F::VitaminDUg, Max),
    rule(NutrientCode::whole(325), F::VitaminDUg, Max),
    rule(NutrientCode::whole(326), F::VitaminDUg, Max),
    rule(NutrientCode::whole(324), F::VitaminDUg, ConvertedMax(vitamin_d_from_code_324)),
];

/// Look up the rule for a nutrient code
pub fn rule_for(code: NutrientCode) -> Option<&'static NutrientRule> {
    NUTRIENT_RULES.iter().find(|rule| rule.code == code)
}

fn raise(slot: &mut f64, amount: f64) {
    *slot = slot.max(amount);
}

fn apply(nutrition: &mut Nutrition, rule: &NutrientRule, amount: f64) {
    match rule.combine {
        Combine::Overwrite => *nutrition.field_mut(rule.field) = amount,
        Combine::Max => raise(nutrition.field_mut(rule.field), amount),
        Combine::MaxAlso(secondary) => {
            raise(nutrition.field_mut(rule.field), amount);
            raise(nutrition.field_mut(secondary), amount);
        }
        Combine::ConvertedMax(convert) => raise(nutrition.field_mut(rule.field), convert(amount)),
    }
}

/// Fold (nutrient number, amount) facts into one nutrition record.
///
/// Energy falls back to a macronutrient estimate when no energy code
/// produced a value, and is always rounded to 3 decimals.
pub fn aggregate<I>(facts: I) -> Nutrition
where
    I: IntoIterator<Item = (f64, f64)>,
{
    let mut nutrition = Nutrition::zero();

    for (number, amount) in facts {
        let Some(rule) = NutrientCode::from_number(number).and_then(rule_for) else {
            continue;
        };
        apply(&mut nutrition, rule, amount);
    }

    if nutrition.energy_kcal == 0.0 {
        nutrition.energy_kcal = derived_energy_kcal(
            nutrition.protein_g,
            nutrition.carbs_total_g,
            nutrition.fat_total_g,
        );
    }
    nutrition.energy_kcal = round_to(nutrition.energy_kcal, 3);

    nutrition
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_code_from_number() {
        assert_eq!(NutrientCode::from_number(208.0), Some(NutrientCode::whole(208)));
        assert_eq!(NutrientCode::from_number(205.2), Some(NutrientCode::tenths(2052)));
        assert_eq!(NutrientCode::from_number(269.3), Some(NutrientCode::tenths(2693)));
        assert_eq!(NutrientCode::from_number(205.25), None);
        assert_eq!(NutrientCode::from_number(-1.0), None);
        assert_eq!(NutrientCode::from_number(f64::NAN), None);
    }

    #[test]
    fn test_rule_table_has_no_duplicate_codes() {
        let codes: HashSet<NutrientCode> = NUTRIENT_RULES.iter().map(|r| r.code).collect();
        assert_eq!(codes.len(), NUTRIENT_RULES.len());
    }

    #[test]
    fn test_fractional_code_is_distinct() {
        // 205.2 is carbohydrate by summation, not 205
        assert!(rule_for(NutrientCode::tenths(2052)).is_some());
        assert!(rule_for(NutrientCode::tenths(2051)).is_none());
    }

    #[test]
    fn test_energy_takes_max_of_codes() {
        let n = aggregate([(208.0, 50.0), (957.0, 52.5), (958.0, 51.0)]);
        assert_eq!(n.energy_kcal, 52.5);
    }

    #[test]
    fn test_energy_from_kilojoules() {
        let n = aggregate([(268.0, 418.68)]);
        assert_eq!(n.energy_kcal, 100.0);

        // kcal code wins when larger
        let n = aggregate([(268.0, 418.68), (208.0, 120.0)]);
        assert_eq!(n.energy_kcal, 120.0);
    }

    #[test]
    fn test_energy_derived_when_absent() {
        let n = aggregate([(203.0, 10.0), (205.0, 20.0), (204.0, 5.0)]);
        let expected = round_to(10.0 * 4.1868 + 20.0 * 4.1868 + 5.0 * 9.097, 3);
        assert_eq!(n.energy_kcal, expected);
        assert_eq!(n.energy_kcal, 171.089);
    }

    #[test]
    fn test_energy_rounded_to_three_decimals() {
        let n = aggregate([(208.0, 12.345678)]);
        assert_eq!(n.energy_kcal, 12.346);
    }

    #[test]
    fn test_empty_facts_yield_zero_record() {
        let n = aggregate(std::iter::empty());
        assert_eq!(n, Nutrition::zero());
    }

    #[test]
    fn test_single_valued_fields_last_write_wins() {
        let n = aggregate([(203.0, 9.0), (203.0, 3.0), (307.0, 100.0), (307.0, 40.0)]);
        assert_eq!(n.protein_g, 3.0);
        assert_eq!(n.sodium_mg, 40.0);
    }

    #[test]
    fn test_sugar_and_fibre_fold_into_total_carbs() {
        let n = aggregate([(269.0, 12.0), (291.0, 3.0)]);
        assert_eq!(n.carbs_sugar_g, 12.0);
        assert_eq!(n.carbs_fibre_g, 3.0);
        assert_eq!(n.carbs_total_g, 12.0);

        let n = aggregate([(205.2, 30.0), (269.3, 12.0), (297.0, 4.0)]);
        assert_eq!(n.carbs_total_g, 30.0);
        assert_eq!(n.carbs_sugar_g, 12.0);
        assert_eq!(n.carbs_fibre_g, 4.0);
    }

    #[test]
    fn test_sugar_and_fibre_never_exceed_total_carbs() {
        let carb_codes = [205.0, 205.2, 209.0, 269.0, 269.3, 291.0, 293.0, 295.0, 297.0];
        let amounts = [0.0, 0.5, 3.0, 7.25, 19.0, 42.0];
        for (i, first) in carb_codes.iter().enumerate() {
            for second in carb_codes.iter().skip(i) {
                for a in amounts {
                    for b in amounts {
                        let n = aggregate([(*first, a), (*second, b)]);
                        assert!(n.carbs_sugar_g <= n.carbs_total_g);
                        assert!(n.carbs_fibre_g <= n.carbs_total_g);
                    }
                }
            }
        }
    }

    #[test]
    fn test_fat_components_fold_into_total_fat() {
        let n = aggregate([(606.0, 2.0), (645.0, 4.0), (646.0, 1.5), (693.0, 0.2)]);
        assert_eq!(n.fat_sat_g, 2.0);
        assert_eq!(n.fat_mono_g, 4.0);
        assert_eq!(n.fat_poly_g, 1.5);
        assert_eq!(n.fat_trans_g, 0.2);
        assert_eq!(n.fat_total_g, 4.0);

        let n = aggregate([(298.0, 9.0), (605.0, 0.1), (695.0, 0.3)]);
        assert_eq!(n.fat_total_g, 9.0);
        assert_eq!(n.fat_trans_g, 0.3);
    }

    #[test]
    fn test_vitamin_d_only_code_324() {
        let n = aggregate([(324.0, 2.0)]);
        assert_eq!(n.vitamin_d_ug, 8.0);
    }

    #[test]
    fn test_vitamin_d_max_across_paths() {
        let n = aggregate([(324.0, 2.0), (325.0, 10.0)]);
        assert_eq!(n.vitamin_d_ug, 10.0);

        let n = aggregate([(328.0, 1.0), (324.0, 2.0)]);
        assert_eq!(n.vitamin_d_ug, 8.0);
    }

    #[test]
    fn test_multi_code_vitamins_take_max() {
        let n = aggregate([
            (417.0, 20.0),
            (435.0, 35.0),
            (432.0, 10.0),
            (323.0, 1.2),
            (573.0, 0.4),
            (418.0, 0.5),
            (578.0, 0.9),
        ]);
        assert_eq!(n.folate_ug, 35.0);
        assert_eq!(n.vitamin_e_mg, 1.2);
        assert_eq!(n.vitamin_b12_ug, 0.9);
    }

    #[test]
    fn test_minerals_and_b_vitamins_mapped() {
        let n = aggregate([
            (601.0, 10.0),
            (301.0, 120.0),
            (303.0, 2.1),
            (304.0, 30.0),
            (306.0, 400.0),
            (309.0, 1.1),
            (317.0, 12.0),
            (320.0, 50.0),
            (401.0, 9.0),
            (404.0, 0.1),
            (405.0, 0.2),
            (406.0, 3.0),
            (415.0, 0.4),
        ]);
        assert_eq!(n.cholesterol_mg, 10.0);
        assert_eq!(n.calcium_mg, 120.0);
        assert_eq!(n.iron_mg, 2.1);
        assert_eq!(n.magnesium_mg, 30.0);
        assert_eq!(n.potassium_mg, 400.0);
        assert_eq!(n.zinc_mg, 1.1);
        assert_eq!(n.selenium_ug, 12.0);
        assert_eq!(n.vitamin_a_ug, 50.0);
        assert_eq!(n.vitamin_c_mg, 9.0);
        assert_eq!(n.thiamin_mg, 0.1);
        assert_eq!(n.riboflavin_mg, 0.2);
        assert_eq!(n.niacin_mg, 3.0);
        assert_eq!(n.vitamin_b6_mg, 0.4);
    }

    #[test]
    fn test_unknown_codes_ignored() {
        let n = aggregate([(999.0, 500.0), (208.5, 80.0), (208.0, 40.0)]);
        assert_eq!(n.energy_kcal, 40.0);
    }
}
