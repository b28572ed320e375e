use std::collections::HashSet;
use std::env;

use serde::{Deserialize, Serialize};

use crate::domain::entities::measure::Measure;

/// Aggregated, typed configuration for the adherence pipeline.
///
/// Thresholds and RxNorm code sets are data, never literals scattered across
/// the calculator and fragility engine. `Settings` is the single place a
/// caller reaches for to swap a code-set vintage or retune a bonus constant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub measure_codes: MeasureCodeSets,
    pub pdc: PdcConfig,
    pub fragility: FragilityConfig,
    pub logging: LoggingConfig,
}

/// RxNorm code membership for each HEDIS measure, scoped to a measurement year.
///
/// The set of codes per measure varies by HEDIS year (Open Question in the
/// design notes); rather than pin a single vintage at compile time, the year
/// travels alongside the sets so a caller can load a different vintage
/// without recompiling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeasureCodeSets {
    pub measurement_year: i32,
    pub mac_codes: HashSet<String>,
    pub mad_codes: HashSet<String>,
    pub mah_codes: HashSet<String>,
}

impl MeasureCodeSets {
    /// Classifies an RxNorm code into a measure, or `None` if it matches none
    /// of the three configured sets. O(1) hash-set membership per §4.1.
    pub fn classify(&self, rxnorm_code: &str) -> Option<Measure> {
        if self.mac_codes.contains(rxnorm_code) {
            Some(Measure::Mac)
        } else if self.mad_codes.contains(rxnorm_code) {
            Some(Measure::Mad)
        } else if self.mah_codes.contains(rxnorm_code) {
            Some(Measure::Mah)
        } else {
            None
        }
    }

    /// A reasonable default code set covering common ingredient-level and
    /// branded/dose-form RxNorm codes for 2025, seeded from the measure's
    /// well-known ingredient list. Production deployments should override
    /// this via `Settings::from_env` or a loaded fixture.
    pub fn default_for_year(measurement_year: i32) -> Self {
        let mac_codes = [
            "36567", // atorvastatin
            "83367", // rosuvastatin
            "6472",  // lovastatin
            "301542", // pitavastatin
            "42463", // simvastatin
            "4493",  // fluvastatin
            "42316", // pravastatin
        ]
        .into_iter()
        .map(String::from)
        .collect();

        let mad_codes = [
            "6809",   // metformin
            "4821",   // glipizide
            "4815",   // glyburide
            "10633",  // glimepiride
            "33738",  // pioglitazone
            "253182", // sitagliptin
            "542347", // empagliflozin
            "596926", // canagliflozin
        ]
        .into_iter()
        .map(String::from)
        .collect();

        let mah_codes = [
            "29046",  // lisinopril
            "35208",  // losartan
            "69749",  // valsartan
            "18867",  // captopril
            "38454",  // enalapril
            "52175",  // benazepril
            "73494",  // irbesartan
            "214354", // olmesartan
        ]
        .into_iter()
        .map(String::from)
        .collect();

        Self {
            measurement_year,
            mac_codes,
            mad_codes,
            mah_codes,
        }
    }
}

/// Constants consumed by the PDC calculator (C3/C4) and refill forecaster (C5).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PdcConfig {
    /// Assumed days-supply per fill used when forecasting refills needed and
    /// when a patient has no recent fills to average over. Default 30.
    pub default_days_supply: u32,
    /// Fraction of treatment days allowed as gaps before falling below
    /// adherence. Default 0.20 (20%).
    pub gap_days_allowed_fraction: f64,
}

impl Default for PdcConfig {
    fn default() -> Self {
        Self {
            default_days_supply: 30,
            gap_days_allowed_fraction: 0.20,
        }
    }
}

/// Constants consumed by the fragility engine (C6).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FragilityConfig {
    /// Gap days remaining at or below which Q4 tightening may apply.
    pub q4_gap_days_threshold: i64,
    /// Days-to-year-end below which Q4 tightening may apply.
    pub q4_days_to_year_end_threshold: i64,
    pub bonus_out_of_meds: i64,
    pub bonus_q4: i64,
    pub bonus_multiple_ma: i64,
    pub bonus_new_patient: i64,
    /// Window, in days, within which a patient's first-ever fill qualifies
    /// them as a "new patient" for the purposes of the fragility bonus.
    ///
    /// The legacy sources define "new patient" two ways: first fill within
    /// the last 90 days, or no prior-year fills. This config documents the
    /// 90-day definition as the decision in force (per the design notes'
    /// open question) rather than leaving it as a silent default.
    pub new_patient_window_days: i64,
}

impl Default for FragilityConfig {
    fn default() -> Self {
        Self {
            q4_gap_days_threshold: 5,
            q4_days_to_year_end_threshold: 60,
            bonus_out_of_meds: 30,
            bonus_q4: 25,
            bonus_multiple_ma: 15,
            bonus_new_patient: 10,
            new_patient_window_days: 90,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Settings {
    /// Loads settings from the environment, falling back to the documented
    /// defaults for every field that is not overridden.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        let measurement_year: i32 = env::var("ADHERENCE_MEASUREMENT_YEAR")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(2025);

        let pdc = PdcConfig {
            default_days_supply: env::var("ADHERENCE_DEFAULT_DAYS_SUPPLY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
            gap_days_allowed_fraction: env::var("ADHERENCE_GAP_DAYS_ALLOWED_FRACTION")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0.20),
        };

        let fragility = FragilityConfig {
            q4_gap_days_threshold: env::var("ADHERENCE_Q4_GAP_DAYS_THRESHOLD")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5),
            q4_days_to_year_end_threshold: env::var("ADHERENCE_Q4_DAYS_TO_YEAR_END_THRESHOLD")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(60),
            new_patient_window_days: env::var("ADHERENCE_NEW_PATIENT_WINDOW_DAYS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(90),
            ..FragilityConfig::default()
        };

        let logging = LoggingConfig {
            level: env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        };

        Ok(Settings {
            measure_codes: MeasureCodeSets::default_for_year(measurement_year),
            pdc,
            fragility,
            logging,
        })
    }
}
