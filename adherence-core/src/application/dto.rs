//! Result shapes returned by the orchestrator (C8), per §4.8/§7: calculations
//! never fail, so these carry both successful outputs and a list of per-item
//! errors rather than forcing the caller through a `Result`.

use uuid::Uuid;

use crate::domain::entities::fragility::FragilityResult;
use crate::domain::entities::measure::Measure;
use crate::domain::entities::patient_summary::PatientSummary;
use crate::domain::entities::pdc_result::PdcResult;
use crate::domain::services::refill_forecaster::RefillForecast;
use crate::shared::AdherenceError;

/// The calculated and (if writing succeeded) persisted outcome for one
/// `(patient, measure, drug)` combination.
#[derive(Debug, Clone)]
pub struct DrugOutcome {
    pub rxnorm_code: Option<String>,
    pub pdc: PdcResult,
    pub fragility: FragilityResult,
    pub refill_forecast: RefillForecast,
    pub observation_id: Option<Uuid>,
}

/// The calculated and persisted outcome for one `(patient, measure)`
/// combination, plus its per-drug children.
#[derive(Debug, Clone)]
pub struct MeasureOutcome {
    pub measure: Measure,
    pub pdc: PdcResult,
    pub fragility: FragilityResult,
    pub refill_forecast: RefillForecast,
    pub observation_id: Option<Uuid>,
    pub drugs: Vec<DrugOutcome>,
}

/// The full per-patient result of one orchestrator run (§4.8 step 5).
///
/// A patient with no qualifying dispenses appears with `measures` empty and
/// a `NoMaDispenses`-flavored error recorded (§7); a failure in one measure
/// or drug does not prevent the others from completing, so `measures` and
/// `errors` may both be non-empty.
#[derive(Debug, Clone)]
pub struct PatientCalculationResult {
    pub patient_id: Uuid,
    pub measures: Vec<MeasureOutcome>,
    pub summary: PatientSummary,
    pub summary_written: bool,
    pub errors: Vec<PatientItemError>,
}

/// One error encountered while processing a patient, tagged with the item
/// it occurred on so a caller can tell a whole-patient failure from a
/// single failed drug (§7).
#[derive(Debug, Clone)]
pub struct PatientItemError {
    pub measure: Option<Measure>,
    pub rxnorm_code: Option<String>,
    pub error: String,
}

impl PatientItemError {
    pub fn patient_level(error: &AdherenceError) -> Self {
        Self {
            measure: None,
            rxnorm_code: None,
            error: error.to_string(),
        }
    }

    pub fn measure_level(measure: Measure, error: &AdherenceError) -> Self {
        Self {
            measure: Some(measure),
            rxnorm_code: None,
            error: error.to_string(),
        }
    }

    pub fn drug_level(measure: Measure, rxnorm_code: Option<String>, error: &AdherenceError) -> Self {
        Self {
            measure: Some(measure),
            rxnorm_code,
            error: error.to_string(),
        }
    }
}

/// Aggregate result of a batch run over many patients (§4.8 batch function).
///
/// Per-patient calculations never raise (§7), so every processed patient
/// lands in `succeeded` — "failure" at batch granularity means a per-item
/// error recorded inside a patient's own `errors` list, not a missing
/// patient. `cancelled` is set when the batch stopped early because the
/// cancellation signal tripped at a patient boundary.
#[derive(Debug, Default)]
pub struct BatchResult {
    pub succeeded: Vec<PatientCalculationResult>,
    pub cancelled: bool,
}

impl BatchResult {
    pub fn patient_count(&self) -> usize {
        self.succeeded.len()
    }

    pub fn error_count(&self) -> usize {
        self.succeeded.iter().map(|p| p.errors.len()).sum()
    }
}
