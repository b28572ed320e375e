use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::fragility::FragilityTier;
use super::measure::Measure;

/// A small, fully-rewritten-on-each-run summary kept alongside the patient
/// resource (§3, §4.8 step 4). Unlike observations, this record has no
/// history: each orchestrator run replaces it wholesale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientSummary {
    /// Worst-case fragility tier across all of the patient's enrolled
    /// measures, using the ordering
    /// `T5_UNSALVAGEABLE < F1 < F2 < F3 < F4 < F5 < COMPLIANT`.
    pub worst_tier: Option<FragilityTier>,
    /// Minimum `daysUntilRunout` across enrolled measures.
    pub min_days_until_runout: Option<i64>,
    pub enrolled_measures: Vec<Measure>,
    pub calculated_at: DateTime<Utc>,
}
