use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The closed interval `[start, end]` a PDC calculation is measured over.
///
/// `end` is always 31 December of the measurement year; `start` is the Index
/// Prescription Start Date (IPSD) — the earliest valid fill in the year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeasurementPeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl MeasurementPeriod {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Length of the period in days, inclusive of both endpoints.
    pub fn length_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

/// The full per-drug or per-measure output of the PDC calculator (C4).
///
/// Invariants (§3): `coveredDays <= treatmentDays`; `gapDaysUsed + coveredDays
/// == treatmentDays`; `gapDaysAllowed == floor(treatmentDays * 0.20)`;
/// `pdc` in `[0, 100]`; `pdcStatusQuo <= pdcPerfect`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PdcResult {
    pub pdc: f64,
    pub covered_days: i64,
    pub treatment_days: i64,
    pub gap_days_used: i64,
    pub gap_days_allowed: i64,
    pub gap_days_remaining: i64,

    /// PDC projected to year-end assuming no fills beyond current supply.
    pub pdc_status_quo: f64,
    /// PDC projected to year-end assuming uninterrupted coverage.
    pub pdc_perfect: f64,

    pub days_until_runout: i64,
    pub current_supply: i64,
    pub refills_needed: i64,
    pub days_to_year_end: i64,

    pub last_fill_date: Option<NaiveDate>,
    pub fill_count: usize,
    pub measurement_period: MeasurementPeriod,
}
