use serde::{Deserialize, Serialize};

/// A HEDIS Medication Adherence star-rating measure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Measure {
    /// Adherence to cholesterol (statin) therapy.
    Mac,
    /// Adherence to oral diabetes medications.
    Mad,
    /// Adherence to renin-angiotensin system antihypertensives.
    Mah,
}

impl Measure {
    /// The vendor-scoped wire code used on observations (§6).
    pub fn code(&self) -> &'static str {
        match self {
            Measure::Mac => "pdc-mac",
            Measure::Mad => "pdc-mad",
            Measure::Mah => "pdc-mah",
        }
    }

    pub fn display(&self) -> &'static str {
        match self {
            Measure::Mac => "Statin Therapy",
            Measure::Mad => "Oral Diabetes Medications",
            Measure::Mah => "RAS Antihypertensives",
        }
    }
}

impl std::fmt::Display for Measure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}
