//! Normalized nutrition record
//!
//! Fixed schema of 28 nutrient amounts, all per 100 g of food.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// Nutritional information for one ingredient
///
/// Every field defaults to 0.0. Zero fields are omitted when serialized.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Nutrition {
    // other
    pub energy_kcal: f64,
    pub cholesterol_mg: f64,

    // macronutrients
    pub protein_g: f64,
    pub carbs_total_g: f64,
    pub carbs_sugar_g: f64,
    pub carbs_fibre_g: f64,
    pub fat_total_g: f64,
    pub fat_mono_g: f64,
    pub fat_poly_g: f64,
    pub fat_sat_g: f64,
    pub fat_trans_g: f64,

    // micronutrients
    pub calcium_mg: f64,
    pub folate_ug: f64,
    pub iron_mg: f64,
    pub magnesium_mg: f64,
    pub niacin_mg: f64,
    pub potassium_mg: f64,
    pub riboflavin_mg: f64,
    pub selenium_ug: f64,
    pub sodium_mg: f64,
    pub thiamin_mg: f64,
    pub vitamin_a_ug: f64,
    pub vitamin_b12_ug: f64,
    pub vitamin_b6_mg: f64,
    pub vitamin_c_mg: f64,
    pub vitamin_d_ug: f64,
    pub vitamin_e_mg: f64,
    pub zinc_mg: f64,
}

/// Names one field of [`Nutrition`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NutrientField {
    EnergyKcal,
    CholesterolMg,
    ProteinG,
    CarbsTotalG,
    CarbsSugarG,
    CarbsFibreG,
    FatTotalG,
    FatMonoG,
    FatPolyG,
    FatSatG,
    FatTransG,
    CalciumMg,
    FolateUg,
    IronMg,
    MagnesiumMg,
    NiacinMg,
    PotassiumMg,
    RiboflavinMg,
    SeleniumUg,
    SodiumMg,
    ThiaminMg,
    VitaminAUg,
    VitaminB12Ug,
    VitaminB6Mg,
    VitaminCMg,
    VitaminDUg,
    VitaminEMg,
    ZincMg,
}

impl NutrientField {
    /// Column / JSON key for this field
    pub fn column_name(&self) -> &'static str {
        match self {
            NutrientField::EnergyKcal => "energy_kcal",
            NutrientField::CholesterolMg => "cholesterol_mg",
            NutrientField::ProteinG => "protein_g",
            NutrientField::CarbsTotalG => "carbs_total_g",
            NutrientField::CarbsSugarG => "carbs_sugar_g",
            NutrientField::CarbsFibreG => "carbs_fibre_g",
            NutrientField::FatTotalG => "fat_total_g",
            NutrientField::FatMonoG => "fat_mono_g",
            NutrientField::FatPolyG => "fat_poly_g",
            NutrientField::FatSatG => "fat_sat_g",
            NutrientField::FatTransG => "fat_trans_g",
            NutrientField::CalciumMg => "calcium_mg",
            NutrientField::FolateUg => "folate_ug",
            NutrientField::IronMg => "iron_mg",
            NutrientField::MagnesiumMg => "magnesium_mg",
            NutrientField::NiacinMg => "niacin_mg",
            NutrientField::PotassiumMg => "potassium_mg",
            NutrientField::RiboflavinMg => "riboflavin_mg",
            NutrientField::SeleniumUg => "selenium_ug",
            NutrientField::SodiumMg => "sodium_mg",
            NutrientField::ThiaminMg => "thiamin_mg",
            NutrientField::VitaminAUg => "vitamin_a_ug",
            NutrientField::VitaminB12Ug => "vitamin_b12_ug",
            NutrientField::VitaminB6Mg => "vitamin_b6_mg",
            NutrientField::VitaminCMg => "vitamin_c_mg",
            NutrientField::VitaminDUg => "vitamin_d_ug",
            NutrientField::VitaminEMg => "vitamin_e_mg",
            NutrientField::ZincMg => "zinc_mg",
        }
    }
}

impl Nutrition {
    /// All fields, in schema order
    pub const FIELDS: [NutrientField; 28] = [
        NutrientField::EnergyKcal,
        NutrientField::CholesterolMg,
        NutrientField::ProteinG,
        NutrientField::CarbsTotalG,
        NutrientField::CarbsSugarG,
        NutrientField::CarbsFibreG,
        NutrientField::FatTotalG,
        NutrientField::FatMonoG,
        NutrientField::FatPolyG,
        NutrientField::FatSatG,
        NutrientField::FatTransG,
        NutrientField::CalciumMg,
        NutrientField::FolateUg,
        NutrientField::IronMg,
        NutrientField::MagnesiumMg,
        NutrientField::NiacinMg,
        NutrientField::PotassiumMg,
        NutrientField::RiboflavinMg,
        NutrientField::SeleniumUg,
        NutrientField::SodiumMg,
        NutrientField::ThiaminMg,
        NutrientField::VitaminAUg,
        NutrientField::VitaminB12Ug,
        NutrientField::VitaminB6Mg,
        NutrientField::VitaminCMg,
        NutrientField::VitaminDUg,
        NutrientField::VitaminEMg,
        NutrientField::ZincMg,
    ];

    /// Create a new Nutrition with all zeros
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn get(&self, field: NutrientField) -> f64 {
        match field {
            NutrientField::EnergyKcal => self.energy_kcal,
            NutrientField::CholesterolMg => self.cholesterol_mg,
            NutrientField::ProteinG => self.protein_g,
            NutrientField::CarbsTotalG => self.carbs_total_g,
            NutrientField::CarbsSugarG => self.carbs_sugar_g,
            NutrientField::CarbsFibreG => self.carbs_fibre_g,
            NutrientField::FatTotalG => self.fat_total_g,
            NutrientField::FatMonoG => self.fat_mono_g,
            NutrientField::FatPolyG => self.fat_poly_g,
            NutrientField::FatSatG => self.fat_sat_g,
            NutrientField::FatTransG => self.fat_trans_g,
            NutrientField::CalciumMg => self.calcium_mg,
            NutrientField::FolateUg => self.folate_ug,
            NutrientField::IronMg => self.iron_mg,
            NutrientField::MagnesiumMg => self.magnesium_mg,
            NutrientField::NiacinMg => self.niacin_mg,
            NutrientField::PotassiumMg => self.potassium_mg,
            NutrientField::RiboflavinMg => self.riboflavin_mg,
            NutrientField::SeleniumUg => self.selenium_ug,
            NutrientField::SodiumMg => self.sodium_mg,
            NutrientField::ThiaminMg => self.thiamin_mg,
            NutrientField::VitaminAUg => self.vitamin_a_ug,
            NutrientField::VitaminB12Ug => self.vitamin_b12_ug,
            NutrientField::VitaminB6Mg => self.vitamin_b6_mg,
            NutrientField::VitaminCMg => self.vitamin_c_mg,
            NutrientField::VitaminDUg => self.vitamin_d_ug,
            NutrientField::VitaminEMg => self.vitamin_e_mg,
            NutrientField::ZincMg => self.zinc_mg,
        }
    }

    pub fn field_mut(&mut self, field: NutrientField) -> &mut f64 {
        match field {
            NutrientField::EnergyKcal => &mut self.energy_kcal,
            NutrientField::CholesterolMg => &mut self.cholesterol_mg,
            NutrientField::ProteinG => &mut self.protein_g,
            NutrientField::CarbsTotalG => &mut self.carbs_total_g,
            NutrientField::CarbsSugarG => &mut self.carbs_sugar_g,
            NutrientField::CarbsFibreG => &mut self.carbs_fibre_g,
            NutrientField::FatTotalG => &mut self.fat_total_g,
            NutrientField::FatMonoG => &mut self.fat_mono_g,
            NutrientField::FatPolyG => &mut self.fat_poly_g,
            NutrientField::FatSatG => &mut self.fat_sat_g,
            NutrientField::FatTransG => &mut self.fat_trans_g,
            NutrientField::CalciumMg => &mut self.calcium_mg,
            NutrientField::FolateUg => &mut self.folate_ug,
            NutrientField::IronMg => &mut self.iron_mg,
            NutrientField::MagnesiumMg => &mut self.magnesium_mg,
            NutrientField::NiacinMg => &mut self.niacin_mg,
            NutrientField::PotassiumMg => &mut self.potassium_mg,
            NutrientField::RiboflavinMg => &mut self.riboflavin_mg,
            NutrientField::SeleniumUg => &mut self.selenium_ug,
            NutrientField::SodiumMg => &mut self.sodium_mg,
            NutrientField::ThiaminMg => &mut self.thiamin_mg,
            NutrientField::VitaminAUg => &mut self.vitamin_a_ug,
            NutrientField::VitaminB12Ug => &mut self.vitamin_b12_ug,
            NutrientField::VitaminB6Mg => &mut self.vitamin_b6_mg,
            NutrientField::VitaminCMg => &mut self.vitamin_c_mg,
            NutrientField::VitaminDUg => &mut self.vitamin_d_ug,
            NutrientField::VitaminEMg => &mut self.vitamin_e_mg,
            NutrientField::ZincMg => &mut self.zinc_mg,
        }
    }

    /// (column, value) pairs in schema order
    pub fn columns(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        Self::FIELDS
            .iter()
            .map(move |field| (field.column_name(), self.get(*field)))
    }
}

impl Serialize for Nutrition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let present: Vec<(&'static str, f64)> =
            self.columns().filter(|(_, value)| *value != 0.0).collect();
        let mut map = serializer.serialize_map(Some(present.len()))?;
        for (name, value) in present {
            map.serialize_entry(name, &value)?;
        }
        map.end()
    }
}
