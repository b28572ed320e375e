//! Observation writer (C7) — §4.7
//!
//! Constructs and persists measure-level and medication-level observations
//! with every core output embedded as typed extension fields. Never
//! overwrites a prior observation; the writer only ever appends.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::entities::fragility::FragilityResult;
use crate::domain::entities::measure::Measure;
use crate::domain::entities::observation::{Extension, ExtensionValue, Observation};
use crate::domain::entities::pdc_result::PdcResult;
use crate::domain::repositories::ObservationStore;
use crate::domain::services::refill_forecaster::RefillForecast;
use crate::shared::AdherenceResult;

/// The vendor code system measure and medication codes are drawn from (§6).
pub const MEASURE_CODE_SYSTEM: &str = "https://adherence.example/fhir/CodeSystem/pdc-measure";
pub const MEDICATION_OBSERVATION_CODE: &str = "pdc-medication";

/// Persists PDC/fragility outputs as observations (C7).
pub struct ObservationWriter<'a> {
    store: &'a dyn ObservationStore,
}

impl<'a> ObservationWriter<'a> {
    pub fn new(store: &'a dyn ObservationStore) -> Self {
        Self { store }
    }

    /// Writes the measure-level observation for one `(patient, measure)`.
    pub async fn write_measure_observation(
        &self,
        patient_id: Uuid,
        measure: Measure,
        pdc: &PdcResult,
        fragility: &FragilityResult,
        effective_date_time: DateTime<Utc>,
    ) -> AdherenceResult<Observation> {
        let observation = Observation {
            id: Uuid::new_v4(),
            patient_id,
            measure,
            medication_rxnorm: None,
            medication_display: None,
            parent_observation_id: None,
            effective_date_time,
            pdc_ratio: pdc.pdc / 100.0,
            extensions: Observation::common_extensions(pdc, fragility),
        };
        self.store.create_observation(observation).await
    }

    /// Writes a medication-level observation linked to its measure-level
    /// parent, additionally carrying the drug and refill-forecast fields
    /// named in §4.7.
    #[allow(clippy::too_many_arguments)]
    pub async fn write_medication_observation(
        &self,
        patient_id: Uuid,
        measure: Measure,
        parent_observation_id: Uuid,
        rxnorm_code: Option<&str>,
        medication_display: Option<&str>,
        pdc: &PdcResult,
        fragility: &FragilityResult,
        refill_forecast: &RefillForecast,
        effective_date_time: DateTime<Utc>,
    ) -> AdherenceResult<Observation> {
        let mut extensions = Observation::common_extensions(pdc, fragility);
        extensions.push(Extension::new(
            "supplyOnHand",
            ExtensionValue::Integer(refill_forecast.supply_on_hand),
        ));
        extensions.push(Extension::new(
            "coverageShortfall",
            ExtensionValue::Integer(refill_forecast.coverage_shortfall),
        ));
        extensions.push(Extension::new(
            "estimatedDaysPerRefill",
            ExtensionValue::Decimal(refill_forecast.estimated_days_per_refill),
        ));
        extensions.push(Extension::new(
            "remainingRefills",
            ExtensionValue::Integer(refill_forecast.remaining_refills),
        ));

        let observation = Observation {
            id: Uuid::new_v4(),
            patient_id,
            measure,
            medication_rxnorm: rxnorm_code.map(String::from),
            medication_display: medication_display.map(String::from),
            parent_observation_id: Some(parent_observation_id),
            effective_date_time,
            pdc_ratio: pdc.pdc / 100.0,
            extensions,
        };
        self.store.create_observation(observation).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::fragility::{FragilityFlags, PriorityBonuses, UrgencyLevel};
    use crate::domain::entities::pdc_result::MeasurementPeriod;
    use crate::domain::repositories::ObservationStore;
    use crate::shared::AdherenceResult;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingStore {
        written: Mutex<Vec<Observation>>,
    }

    #[async_trait]
    impl ObservationStore for RecordingStore {
        async fn create_observation(&self, observation: Observation) -> AdherenceResult<Observation> {
            self.written.lock().unwrap().push(observation.clone());
            Ok(observation)
        }
    }

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
            tier: crate::domain::entities::fragility::FragilityTier::Unsalvageable,
            delay_budget_per_refill: 0.0,
            priority_score: 0,
            urgency_level: UrgencyLevel::Low,
            contact_window: "document loss, focus next year".to_string(),
            action: "document loss, focus next year".to_string(),
            bonuses: PriorityBonuses::default(),
            flags: FragilityFlags {
                is_unsalvageable: true,
                ..FragilityFlags::default()
            },
        }
    }

    #[tokio::test]
    async fn writes_measure_observation_with_pdc_ratio() {
        let store = RecordingStore::default();
        let writer = ObservationWriter::new(&store);
        let patient_id = Uuid::new_v4();

        let obs = writer
            .write_measure_observation(patient_id, Measure::Mac, &sample_pdc(), &sample_fragility(), Utc::now())
            .await
            .unwrap();

        assert_eq!(obs.patient_id, patient_id);
        assert!(obs.parent_observation_id.is_none());
        assert!((obs.pdc_ratio - 0.543).abs() < 1e-6);
        assert!(obs.extensions.iter().any(|e| e.url == "fragilityTier"));
    }

    #[tokio::test]
    async fn writes_medication_observation_linked_to_parent() {
        let store = RecordingStore::default();
        let writer = ObservationWriter::new(&store);
        let patient_id = Uuid::new_v4();
        let parent_id = Uuid::new_v4();

        let forecast = RefillForecast {
            supply_on_hand: 20,
            coverage_shortfall: 180,
            estimated_days_per_refill: 30.0,
            remaining_refills: 6,
        };

        let obs = writer
            .write_medication_observation(
                patient_id,
                Measure::Mac,
                parent_id,
                Some("36567"),
                Some("atorvastatin"),
                &sample_pdc(),
                &sample_fragility(),
                &forecast,
                Utc::now(),
            )
            .await
            .unwrap();

        assert_eq!(obs.parent_observation_id, Some(parent_id));
        assert_eq!(obs.medication_rxnorm.as_deref(), Some("36567"));
        assert!(obs.extensions.iter().any(|e| e.url == "remainingRefills"));
    }

    #[tokio::test]
    async fn never_overwrites_prior_observations() {
        let store = RecordingStore::default();
        let writer = ObservationWriter::new(&store);
        let patient_id = Uuid::new_v4();

        writer
            .write_measure_observation(patient_id, Measure::Mac, &sample_pdc(), &sample_fragility(), Utc::now())
            .await
            .unwrap();
        writer
            .write_measure_observation(patient_id, Measure::Mac, &sample_pdc(), &sample_fragility(), Utc::now())
            .await
            .unwrap();

        assert_eq!(store.written.lock().unwrap().len(), 2);
    }
}
