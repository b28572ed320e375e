use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::fragility::FragilityResult;
use super::measure::Measure;
use super::pdc_result::PdcResult;

/// An extension field attached to an [`Observation`], carrying one typed
/// PDC/fragility output. Kept as an open, tagged list rather than a struct
/// with dozens of optional fields so medication-level and measure-level
/// observations can share the same shape while only medication-level ones
/// populate the medication-specific extensions (§4.7).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ExtensionValue {
    Integer(i64),
    Decimal(f64),
    Boolean(bool),
    String(String),
    Code(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Extension {
    /// Stable vendor URL identifying the field, e.g.
    /// `"https://adherence.example/fhir/StructureDefinition/fragility-tier"`.
    pub url: String,
    pub value: ExtensionValue,
}

impl Extension {
    pub fn new(url: impl Into<String>, value: ExtensionValue) -> Self {
        Self {
            url: url.into(),
            value,
        }
    }
}

/// An immutable, append-only observation tying a patient, a measure (and
/// optionally a drug), an effective date, and every PDC/fragility output to
/// one persisted record (§3, §4.7).
///
/// Observations are never mutated or deleted by the core; the observation
/// with the greatest `effective_date_time` for a given
/// `(patient, measure[, drug])` triple is the authoritative one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Observation {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub measure: Measure,

    /// Present only on medication-level observations; absent on
    /// measure-level ones.
    pub medication_rxnorm: Option<String>,
    pub medication_display: Option<String>,

    /// Reference to the measure-level observation this one is a child of.
    /// `None` for measure-level observations themselves.
    pub parent_observation_id: Option<Uuid>,

    pub effective_date_time: DateTime<Utc>,

    /// `pdc` expressed as a 0-1 ratio, per the wire contract in §6, rather
    /// than the 0-100 percentage used internally by [`PdcResult`].
    pub pdc_ratio: f64,

    pub extensions: Vec<Extension>,
}

impl Observation {
    /// Builds the common extension set carried by every observation: every
    /// numeric field and flag from the calculator and fragility engine.
    pub fn common_extensions(pdc: &PdcResult, fragility: &FragilityResult) -> Vec<Extension> {
        vec![
            Extension::new("pdc", ExtensionValue::Decimal(pdc.pdc)),
            Extension::new("coveredDays", ExtensionValue::Integer(pdc.covered_days)),
            Extension::new("treatmentDays", ExtensionValue::Integer(pdc.treatment_days)),
            Extension::new("gapDaysUsed", ExtensionValue::Integer(pdc.gap_days_used)),
            Extension::new(
                "gapDaysAllowed",
                ExtensionValue::Integer(pdc.gap_days_allowed),
            ),
            Extension::new(
                "gapDaysRemaining",
                ExtensionValue::Integer(pdc.gap_days_remaining),
            ),
            Extension::new(
                "pdcStatusQuo",
                ExtensionValue::Decimal(pdc.pdc_status_quo),
            ),
            Extension::new("pdcPerfect", ExtensionValue::Decimal(pdc.pdc_perfect)),
            Extension::new(
                "daysUntilRunout",
                ExtensionValue::Integer(pdc.days_until_runout),
            ),
            Extension::new("currentSupply", ExtensionValue::Integer(pdc.current_supply)),
            Extension::new(
                "refillsNeeded",
                ExtensionValue::Integer(pdc.refills_needed),
            ),
            Extension::new(
                "daysToYearEnd",
                ExtensionValue::Integer(pdc.days_to_year_end),
            ),
            Extension::new("fillCount", ExtensionValue::Integer(pdc.fill_count as i64)),
            Extension::new("fragilityTier", ExtensionValue::Code(fragility.tier.code().to_string())),
            Extension::new("tierLevel", ExtensionValue::Integer(fragility.tier.tier_level() as i64)),
            Extension::new(
                "delayBudgetPerRefill",
                ExtensionValue::Decimal(fragility.delay_budget_per_refill),
            ),
            Extension::new(
                "priorityScore",
                ExtensionValue::Integer(fragility.priority_score),
            ),
            Extension::new(
                "urgencyLevel",
                ExtensionValue::Code(format!("{:?}", fragility.urgency_level).to_uppercase()),
            ),
            Extension::new(
                "contactWindow",
                ExtensionValue::String(fragility.contact_window.clone()),
            ),
            Extension::new("action", ExtensionValue::String(fragility.action.clone())),
            Extension::new(
                "isCompliant",
                ExtensionValue::Boolean(fragility.flags.is_compliant),
            ),
            Extension::new(
                "isUnsalvageable",
                ExtensionValue::Boolean(fragility.flags.is_unsalvageable),
            ),
            Extension::new(
                "isOutOfMeds",
                ExtensionValue::Boolean(fragility.flags.is_out_of_meds),
            ),
            Extension::new("isQ4", ExtensionValue::Boolean(fragility.flags.is_q4)),
            Extension::new(
                "isMultipleMa",
                ExtensionValue::Boolean(fragility.flags.is_multiple_ma),
            ),
            Extension::new(
                "isNewPatient",
                ExtensionValue::Boolean(fragility.flags.is_new_patient),
            ),
            Extension::new(
                "q4Tightened",
                ExtensionValue::Boolean(fragility.flags.q4_tightened),
            ),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::fragility::{
        FragilityFlags, FragilityResult, FragilityTier, PriorityBonuses, UrgencyLevel,
    };
    use crate::domain::entities::pdc_result::{MeasurementPeriod, PdcResult};
    use chrono::NaiveDate;

    fn sample_pdc() -> PdcResult {
        PdcResult {
            pdc: 54.3,
            covered_days: 150,
            treatment_days: 276,
            gap_days_used: 126,
            gap_days_allowed: 55,
            gap_days_remaining: -71,
            pdc_status_quo: 54.3,
            pdc_perfect: 100.0,
            days_until_runout: 20,
            current_supply: 20,
            refills_needed: 5,
            days_to_year_end: 200,
            last_fill_date: Some(NaiveDate::from_ymd_opt(2025, 5, 30).unwrap()),
            fill_count: 2,
            measurement_period: MeasurementPeriod::new(
                NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
                NaiveDate::from_ymd_opt(2025, 12, 31).unwrap(),
            ),
        }
    }

    fn sample_fragility() -> FragilityResult {
        FragilityResult {
            tier: FragilityTier::F2Fragile,
            delay_budget_per_refill: 4.5,
            priority_score: 95,
            urgency_level: UrgencyLevel::Moderate,
            contact_window: "48 hours".to_string(),
            action: "outreach within 48 hours".to_string(),
            bonuses: PriorityBonuses {
                base: 80,
                out_of_meds: 0,
                q4: 0,
                multiple_ma: 15,
                new_patient: 0,
            },
            flags: FragilityFlags {
                is_multiple_ma: true,
                ..FragilityFlags::default()
            },
        }
    }

    /// §8: "serialising a written observation and parsing it reproduces
    /// every PDC and fragility field exactly."
    #[test]
    fn observation_round_trips_through_json_exactly() {
        let pdc = sample_pdc();
        let fragility = sample_fragility();
        let original = Observation {
            id: Uuid::new_v4(),
            patient_id: Uuid::new_v4(),
            measure: Measure::Mac,
            medication_rxnorm: Some("36567".to_string()),
            medication_display: Some("atorvastatin".to_string()),
            parent_observation_id: Some(Uuid::new_v4()),
            effective_date_time: Utc::now(),
            pdc_ratio: pdc.pdc / 100.0,
            extensions: Observation::common_extensions(&pdc, &fragility),
        };

        let json = serde_json::to_string(&original).expect("observation serializes");
        let restored: Observation = serde_json::from_str(&json).expect("observation deserializes");

        assert_eq!(restored.id, original.id);
        assert_eq!(restored.patient_id, original.patient_id);
        assert_eq!(restored.measure, original.measure);
        assert_eq!(restored.medication_rxnorm, original.medication_rxnorm);
        assert_eq!(restored.medication_display, original.medication_display);
        assert_eq!(restored.parent_observation_id, original.parent_observation_id);
        assert_eq!(restored.effective_date_time, original.effective_date_time);
        assert_eq!(restored.pdc_ratio, original.pdc_ratio);
        assert_eq!(restored.extensions.len(), original.extensions.len());

        for (restored_ext, original_ext) in restored.extensions.iter().zip(original.extensions.iter()) {
            assert_eq!(restored_ext.url, original_ext.url);
            assert_eq!(
                serde_json::to_value(&restored_ext.value).unwrap(),
                serde_json::to_value(&original_ext.value).unwrap(),
            );
        }
    }
}
