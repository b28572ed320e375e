use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::coding::CodeableConcept;

/// A raw medication dispense record, as read from the external dispense store.
///
/// This is the input to the fill extractor (C2); it carries the vendor's raw
/// date fields so C2 can apply the preference rule in §4.2 rather than the
/// store having to pre-resolve it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dispense {
    pub id: Uuid,
    pub patient_id: Uuid,

    /// The date the medication was physically handed to the patient.
    /// Preferred fill-date source per §4.2.
    pub when_handed_over: Option<NaiveDate>,

    /// The date the dispense was prepared. Fallback fill-date source when
    /// `when_handed_over` is absent.
    pub when_prepared: Option<NaiveDate>,

    /// Days the dispensed quantity is intended to cover. A missing or
    /// non-positive value causes C2 to drop the dispense.
    pub days_supply: Option<i64>,

    /// The coded medication concept, carrying RxNorm codings.
    pub medication_codeable_concept: CodeableConcept,
}

/// A normalized fill extracted from a dispense: `(fillDate, daysSupply, rxnormCode)`.
///
/// Produced only by the fill extractor (C2); never constructed directly from
/// raw store data elsewhere in the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Fill {
    pub fill_date: NaiveDate,
    pub days_supply: i64,
    pub rxnorm_code: Option<String>,
}

impl Fill {
    pub fn new(fill_date: NaiveDate, days_supply: i64, rxnorm_code: Option<String>) -> Self {
        Self {
            fill_date,
            days_supply,
            rxnorm_code,
        }
    }

    /// Exclusive end of the coverage interval: `fillDate + daysSupply`.
    pub fn coverage_end(&self) -> NaiveDate {
        self.fill_date + chrono::Duration::days(self.days_supply)
    }
}
