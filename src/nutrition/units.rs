//! Energy and vitamin unit conversions
//!
//! Conversion factors used when folding FDC nutrient codes into the fixed
//! nutrition schema.

// ============================================================================
// Energy Conversion Constants
// ============================================================================

/// Kilojoules per kilocalorie
pub const KJ_PER_KCAL: f64 = 4.1868;

/// Energy factor applied to protein grams when energy must be derived
pub const PROTEIN_ENERGY_FACTOR: f64 = 4.1868;
/// Energy factor applied to total carbohydrate grams when energy must be derived
pub const CARBS_ENERGY_FACTOR: f64 = 4.1868;
/// Energy factor applied to total fat grams when energy must be derived
pub const FAT_ENERGY_FACTOR: f64 = 9.097;

// ============================================================================
// Vitamin Conversion Constants
// ============================================================================

/// Multiplier applied to nutrient code 324 (vitamin D, IU) before it competes
/// with the microgram codes
pub const VITAMIN_D_CODE_324_FACTOR: f64 = 4.0;

/// Convert an energy amount in kilojoules to kilocalories
pub fn kj_to_kcal(kj: f64) -> f64 {
    kj / KJ_PER_KCAL
}

/// Scale a code-324 vitamin D amount into the vitamin D field's unit
pub fn vitamin_d_from_code_324(amount: f64) -> f64 {
    amount * VITAMIN_D_CODE_324_FACTOR
}

/// Approximate energy from macronutrient grams
pub fn derived_energy_kcal(protein_g: f64, carbs_total_g: f64, fat_total_g: f64) -> f64 {
    let mut energy = 0.0;
    energy += protein_g * PROTEIN_ENERGY_FACTOR;
    energy += carbs_total_g * CARBS_ENERGY_FACTOR;
    energy += fat_total_g * FAT_ENERGY_FACTOR;
    energy
}

/// Round to a fixed number of decimal places
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}
