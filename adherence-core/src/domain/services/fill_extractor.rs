//! Fill extractor (C2) — §4.2

use crate::domain::entities::dispense::{Dispense, Fill};

/// Extracts a normalized [`Fill`] from a raw dispense, or drops it.
///
/// Date source preference: `when_handed_over`, falling back to
/// `when_prepared`. A dispense with neither date, or with a missing or
/// non-positive `days_supply`, is dropped. No deduplication is performed;
/// same-day duplicate fills are left for the interval merger (C3) to handle
/// naturally.
pub fn extract_fill(dispense: &Dispense) -> Option<Fill> {
    let fill_date = dispense.when_handed_over.or(dispense.when_prepared)?;
    let days_supply = dispense.days_supply?;
    if days_supply <= 0 {
        return None;
    }

    let rxnorm_code = dispense
        .medication_codeable_concept
        .rxnorm_code()
        .map(String::from);

    Some(Fill::new(fill_date, days_supply, rxnorm_code))
}

/// Extracts fills from a batch of dispenses, silently dropping invalid ones.
pub fn extract_fills(dispenses: &[Dispense]) -> Vec<Fill> {
    dispenses.iter().filter_map(extract_fill).collect()
}
