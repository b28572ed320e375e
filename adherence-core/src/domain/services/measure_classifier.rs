//! Measure classifier (C1) — §4.1
//!
//! Thin wrapper over the configured RxNorm code sets. Kept as its own
//! component (rather than inlined into the orchestrator) so the "centralise
//! in C1 as three explicit sets" re-architecture note in the design notes has
//! a single, testable seam.

use crate::config::MeasureCodeSets;
use crate::domain::entities::measure::Measure;

/// Classifies an optional RxNorm code into a measure. Unknown or absent
/// codes classify to `None`, excluding the fill from all MA calculations.
pub fn classify(rxnorm_code: Option<&str>, code_sets: &MeasureCodeSets) -> Option<Measure> {
    code_sets.classify(rxnorm_code?)
}
