//! Patient orchestrator (C8) — §4.8
//!
//! Per patient: fetches dispenses, fans them out by measure and by drug,
//! drives the calculator (C4), refill forecaster (C5), and fragility engine
//! (C6), and writes medication-level and measure-level observations (C7)
//! plus a patient-level summary. A failure in one measure does not abort
//! the patient; a failure in one drug does not abort the measure (§7).

use std::collections::BTreeMap;
use std::time::Duration;

use chrono::NaiveDate;
use tokio::time::timeout;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::application::cancellation::CancellationSignal;
use crate::application::dto::{BatchResult, DrugOutcome, MeasureOutcome, PatientCalculationResult, PatientItemError};
use crate::application::observation_writer::ObservationWriter;
use crate::config::Settings;
use crate::domain::clock::Clock;
use crate::domain::entities::dispense::Fill;
use crate::domain::entities::measure::Measure;
use crate::domain::entities::patient_summary::PatientSummary;
use crate::domain::entities::pdc_result::MeasurementPeriod;
use crate::domain::repositories::{DispenseStore, ObservationStore, PatientStore};
use crate::domain::services::{fill_extractor, fragility_engine, measure_classifier, pdc_calculator, refill_forecaster};
use crate::domain::services::fragility_engine::FragilityContext;
use crate::shared::AdherenceError;

/// Per-call timeouts for the orchestrator's I/O edges (§5). Each external
/// call carries its own caller-configurable timeout; a timeout is recorded
/// as a per-item error and the pipeline continues with the next item.
#[derive(Debug, Clone, Copy)]
pub struct OrchestratorConfig {
    pub dispense_read_timeout: Duration,
    pub observation_write_timeout: Duration,
    pub summary_write_timeout: Duration,
    /// Number of the most recent fills averaged to estimate future refill
    /// cadence for the refill forecaster (C5). The spec leaves the exact
    /// window unspecified; see DESIGN.md for the decision.
    pub recent_fills_window: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            dispense_read_timeout: Duration::from_secs(5),
            observation_write_timeout: Duration::from_secs(5),
            summary_write_timeout: Duration::from_secs(5),
            recent_fills_window: 3,
        }
    }
}

/// Progress reported after each patient in a batch run completes (§4.8
/// batch function: "emits progress callbacks").
#[derive(Debug, Clone, Copy)]
pub struct BatchProgress {
    pub patient_id: Uuid,
    pub completed: usize,
    pub total: usize,
}

pub struct PatientOrchestrator<'a> {
    dispense_store: &'a dyn DispenseStore,
    observation_store: &'a dyn ObservationStore,
    patient_store: Option<&'a dyn PatientStore>,
    clock: &'a dyn Clock,
    settings: &'a Settings,
    config: OrchestratorConfig,
}

impl<'a> PatientOrchestrator<'a> {
    pub fn new(
        dispense_store: &'a dyn DispenseStore,
        observation_store: &'a dyn ObservationStore,
        patient_store: Option<&'a dyn PatientStore>,
        clock: &'a dyn Clock,
        settings: &'a Settings,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            dispense_store,
            observation_store,
            patient_store,
            clock,
            settings,
            config,
        }
    }

    /// Runs the full pipeline for one patient (§4.8 steps 1-5).
    pub async fn process_patient(
        &self,
        patient_id: Uuid,
        measurement_year: i32,
        cancellation: &dyn CancellationSignal,
    ) -> PatientCalculationResult {
        let mut errors = Vec::new();

        if cancellation.is_cancelled() {
            errors.push(PatientItemError::patient_level(&AdherenceError::Cancelled));
            return PatientCalculationResult {
                patient_id,
                measures: Vec::new(),
                summary: self.empty_summary(),
                summary_written: false,
                errors,
            };
        }

        let dispenses = match timeout(
            self.config.dispense_read_timeout,
            self.dispense_store.dispenses_for_patient(patient_id, measurement_year),
        )
        .await
        {
            Ok(Ok(dispenses)) => dispenses,
            Ok(Err(e)) => {
                warn!(%patient_id, error = %e, "dispense read failed");
                errors.push(PatientItemError::patient_level(&e));
                Vec::new()
            }
            Err(_) => {
                let e = AdherenceError::StoreRead("dispense fetch timed out".to_string());
                warn!(%patient_id, "dispense read timed out");
                errors.push(PatientItemError::patient_level(&e));
                Vec::new()
            }
        };

        let fills_by_measure = Self::group_by_measure(&dispenses, self.settings);

        if fills_by_measure.is_empty() {
            errors.push(PatientItemError::patient_level(&AdherenceError::NoMaDispenses));
            return PatientCalculationResult {
                patient_id,
                measures: Vec::new(),
                summary: self.empty_summary(),
                summary_written: false,
                errors,
            };
        }

        let is_multiple_ma = fills_by_measure.len() >= 2;
        let current_date = self.clock.today();
        let period_end = NaiveDate::from_ymd_opt(measurement_year, 12, 31)
            .expect("measurement year produces a valid 31 December");

        let mut measures = Vec::new();

        for (measure, fills) in fills_by_measure {
            if cancellation.is_cancelled() {
                errors.push(PatientItemError::patient_level(&AdherenceError::Cancelled));
                break;
            }

            let (outcome, mut measure_errors) = self
                .process_measure(patient_id, measure, &fills, period_end, current_date, is_multiple_ma)
                .await;
            measures.push(outcome);
            errors.append(&mut measure_errors);
        }

        let summary = self.summary_from_measures(&measures);
        let summary_written = self.write_summary(patient_id, &summary, &mut errors).await;

        info!(
            %patient_id,
            measures = measures.len(),
            errors = errors.len(),
            "patient calculation complete"
        );

        PatientCalculationResult {
            patient_id,
            measures,
            summary,
            summary_written,
            errors,
        }
    }

    /// Runs `process_patient` over a batch of patient ids sequentially
    /// (§4.8 batch function; §5 permits but does not require bounded
    /// concurrency). Progress is reported after each patient completes.
    pub async fn process_batch(
        &self,
        patient_ids: &[Uuid],
        measurement_year: i32,
        cancellation: &dyn CancellationSignal,
        mut on_progress: impl FnMut(BatchProgress),
    ) -> BatchResult {
        let mut result = BatchResult::default();
        let total = patient_ids.len();

        for (index, &patient_id) in patient_ids.iter().enumerate() {
            if cancellation.is_cancelled() {
                result.cancelled = true;
                break;
            }

            let patient_result = self.process_patient(patient_id, measurement_year, cancellation).await;
            on_progress(BatchProgress {
                patient_id,
                completed: index + 1,
                total,
            });
            result.succeeded.push(patient_result);
        }

        result
    }

    async fn process_measure(
        &self,
        patient_id: Uuid,
        measure: Measure,
        fills: &[Fill],
        period_end: NaiveDate,
        current_date: NaiveDate,
        is_multiple_ma: bool,
    ) -> (MeasureOutcome, Vec<PatientItemError>) {
        let mut errors = Vec::new();

        let ipsd = fills
            .iter()
            .map(|f| f.fill_date)
            .min()
            .expect("measure bucket is only created with at least one fill");
        let period = MeasurementPeriod::new(ipsd, period_end);

        let pdc = pdc_calculator::calculate_pdc(
            fills,
            period,
            current_date,
            self.settings.pdc.default_days_supply,
            self.settings.pdc.gap_days_allowed_fraction,
        );
        let refill_forecast = self.forecast_for(fills, &pdc, current_date);
        let is_new_patient = self.is_new_patient(ipsd, current_date);

        let fragility = fragility_engine::classify(
            &pdc,
            FragilityContext {
                current_date,
                refills_remaining: refill_forecast.remaining_refills,
                is_multiple_ma,
                is_new_patient,
            },
            &self.settings.fragility,
        );

        debug!(%patient_id, %measure, tier = %fragility.tier, priority = fragility.priority_score, "measure classified");

        let writer = ObservationWriter::new(self.observation_store);
        let effective_date_time = self.clock.now();

        let measure_observation_id = match timeout(
            self.config.observation_write_timeout,
            writer.write_measure_observation(patient_id, measure, &pdc, &fragility, effective_date_time),
        )
        .await
        {
            Ok(Ok(observation)) => Some(observation.id),
            Ok(Err(e)) => {
                errors.push(PatientItemError::measure_level(measure, &e));
                None
            }
            Err(_) => {
                let e = AdherenceError::StoreWrite("observation write timed out".to_string());
                errors.push(PatientItemError::measure_level(measure, &e));
                None
            }
        };

        let drugs = self
            .process_drugs(
                patient_id,
                measure,
                fills,
                period_end,
                current_date,
                is_multiple_ma,
                measure_observation_id,
                &writer,
                effective_date_time,
                &mut errors,
            )
            .await;

        (
            MeasureOutcome {
                measure,
                pdc,
                fragility,
                refill_forecast,
                observation_id: measure_observation_id,
                drugs,
            },
            errors,
        )
    }

    #[allow(clippy::too_many_arguments)]
    async fn process_drugs(
        &self,
        patient_id: Uuid,
        measure: Measure,
        fills: &[Fill],
        period_end: NaiveDate,
        current_date: NaiveDate,
        is_multiple_ma: bool,
        measure_observation_id: Option<Uuid>,
        writer: &ObservationWriter<'_>,
        effective_date_time: chrono::DateTime<chrono::Utc>,
        errors: &mut Vec<PatientItemError>,
    ) -> Vec<DrugOutcome> {
        let mut by_drug: BTreeMap<String, Vec<Fill>> = BTreeMap::new();
        for fill in fills {
            if let Some(code) = &fill.rxnorm_code {
                by_drug.entry(code.clone()).or_default().push(fill.clone());
            }
        }

        let mut drugs = Vec::with_capacity(by_drug.len());

        for (rxnorm_code, drug_fills) in by_drug {
            let ipsd = drug_fills
                .iter()
                .map(|f| f.fill_date)
                .min()
                .expect("drug bucket is only created with at least one fill");
            let period = MeasurementPeriod::new(ipsd, period_end);

            let pdc = pdc_calculator::calculate_pdc(
                &drug_fills,
                period,
                current_date,
                self.settings.pdc.default_days_supply,
                self.settings.pdc.gap_days_allowed_fraction,
            );
            let refill_forecast = self.forecast_for(&drug_fills, &pdc, current_date);
            let is_new_patient = self.is_new_patient(ipsd, current_date);

            let fragility = fragility_engine::classify(
                &pdc,
                FragilityContext {
                    current_date,
                    refills_remaining: refill_forecast.remaining_refills,
                    is_multiple_ma,
                    is_new_patient,
                },
                &self.settings.fragility,
            );

            let observation_id = match measure_observation_id {
                Some(parent_id) => {
                    match timeout(
                        self.config.observation_write_timeout,
                        writer.write_medication_observation(
                            patient_id,
                            measure,
                            parent_id,
                            Some(&rxnorm_code),
                            None,
                            &pdc,
                            &fragility,
                            &refill_forecast,
                            effective_date_time,
                        ),
                    )
                    .await
                    {
                        Ok(Ok(observation)) => Some(observation.id),
                        Ok(Err(e)) => {
                            errors.push(PatientItemError::drug_level(measure, Some(rxnorm_code.clone()), &e));
                            None
                        }
                        Err(_) => {
                            let e = AdherenceError::StoreWrite("observation write timed out".to_string());
                            errors.push(PatientItemError::drug_level(measure, Some(rxnorm_code.clone()), &e));
                            None
                        }
                    }
                }
                None => {
                    let e = AdherenceError::StoreWrite(
                        "skipped: parent measure observation was not written".to_string(),
                    );
                    errors.push(PatientItemError::drug_level(measure, Some(rxnorm_code.clone()), &e));
                    None
                }
            };

            drugs.push(DrugOutcome {
                rxnorm_code: Some(rxnorm_code),
                pdc,
                fragility,
                refill_forecast,
                observation_id,
            });
        }

        drugs
    }

    fn forecast_for(
        &self,
        fills: &[Fill],
        pdc: &crate::domain::entities::pdc_result::PdcResult,
        current_date: NaiveDate,
    ) -> refill_forecaster::RefillForecast {
        let last_fill = fills.iter().max_by_key(|f| f.fill_date);
        let days_elapsed_since_last_fill = last_fill
            .map(|f| (current_date - f.fill_date).num_days())
            .unwrap_or(0);

        let mut sorted: Vec<Fill> = fills.to_vec();
        sorted.sort_by_key(|f| f.fill_date);
        let recent: Vec<Fill> = sorted
            .iter()
            .rev()
            .take(self.config.recent_fills_window)
            .cloned()
            .collect();

        refill_forecaster::forecast_refills(
            last_fill,
            days_elapsed_since_last_fill,
            pdc.days_to_year_end,
            &recent,
            self.settings.pdc.default_days_supply,
        )
    }

    fn is_new_patient(&self, ipsd: NaiveDate, current_date: NaiveDate) -> bool {
        (current_date - ipsd).num_days() <= self.settings.fragility.new_patient_window_days
    }

    fn group_by_measure(dispenses: &[crate::domain::entities::dispense::Dispense], settings: &Settings) -> BTreeMap<Measure, Vec<Fill>> {
        let mut grouped: BTreeMap<Measure, Vec<Fill>> = BTreeMap::new();
        for dispense in dispenses {
            let Some(fill) = fill_extractor::extract_fill(dispense) else {
                continue;
            };
            let Some(measure) = measure_classifier::classify(fill.rxnorm_code.as_deref(), &settings.measure_codes)
            else {
                continue;
            };
            grouped.entry(measure).or_default().push(fill);
        }
        grouped
    }

    fn summary_from_measures(&self, measures: &[MeasureOutcome]) -> PatientSummary {
        PatientSummary {
            worst_tier: measures.iter().map(|m| m.fragility.tier).min(),
            min_days_until_runout: measures.iter().map(|m| m.pdc.days_until_runout).min(),
            enrolled_measures: measures.iter().map(|m| m.measure).collect(),
            calculated_at: self.clock.now(),
        }
    }

    fn empty_summary(&self) -> PatientSummary {
        PatientSummary {
            worst_tier: None,
            min_days_until_runout: None,
            enrolled_measures: Vec::new(),
            calculated_at: self.clock.now(),
        }
    }

    async fn write_summary(&self, patient_id: Uuid, summary: &PatientSummary, errors: &mut Vec<PatientItemError>) -> bool {
        let Some(patient_store) = self.patient_store else {
            return false;
        };

        match timeout(
            self.config.summary_write_timeout,
            patient_store.update_patient_summary(patient_id, summary.clone()),
        )
        .await
        {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                warn!(%patient_id, error = %e, "patient summary update failed");
                errors.push(PatientItemError::patient_level(&e));
                false
            }
            Err(_) => {
                let e = AdherenceError::SummaryUpdate("summary write timed out".to_string());
                errors.push(PatientItemError::patient_level(&e));
                false
            }
        }
    }
}
