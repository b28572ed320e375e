//! PDC calculator (C4) — §4.4
//!
//! Combines the interval merger (C3) with the measurement period and current
//! date to produce the full [`PdcResult`], including both forward
//! projections. Never fails: every input, including an empty fill list,
//! collapses into a well-formed (possibly degenerate) result.

use chrono::NaiveDate;

use crate::domain::entities::dispense::Fill;
use crate::domain::entities::pdc_result::{MeasurementPeriod, PdcResult};
use crate::domain::services::interval_merger;

/// Computes the full PDC result for one drug or measure's fills.
pub fn calculate_pdc(
    fills: &[Fill],
    period: MeasurementPeriod,
    current_date: NaiveDate,
    default_days_supply: u32,
    gap_days_allowed_fraction: f64,
) -> PdcResult {
    let merged = interval_merger::merge_coverage(fills, period.end);

    let treatment_days = if merged.first_fill_date.is_some() {
        merged.treatment_days
    } else {
        period.length_days()
    };

    let days_to_year_end = ((period.end - current_date).num_days() + 1).max(0);

    let last_fill = sorted_last_fill(fills);
    let (last_fill_date, current_supply, days_until_runout) = match last_fill {
        Some(fill) => {
            let last_fill_end = fill.coverage_end();
            let until_runout = (last_fill_end - current_date).num_days();
            (Some(fill.fill_date), until_runout.max(0), until_runout)
        }
        None => (None, 0, -days_to_year_end),
    };

    let pdc = pct(merged.covered_days, treatment_days);
    let gap_days_used = treatment_days - merged.covered_days;
    let gap_days_allowed = ((treatment_days as f64) * gap_days_allowed_fraction).floor() as i64;
    let gap_days_remaining = gap_days_allowed - gap_days_used;

    let refills_needed = {
        let shortfall = days_to_year_end - current_supply;
        if shortfall <= 0 {
            0
        } else {
            (shortfall as f64 / default_days_supply as f64).ceil() as i64
        }
    };

    let pdc_status_quo = pct(
        merged.covered_days + current_supply.min(days_to_year_end),
        treatment_days,
    );
    let pdc_perfect = pct(merged.covered_days + days_to_year_end, treatment_days);

    PdcResult {
        pdc,
        covered_days: merged.covered_days,
        treatment_days,
        gap_days_used,
        gap_days_allowed,
        gap_days_remaining,
        pdc_status_quo,
        pdc_perfect,
        days_until_runout,
        current_supply,
        refills_needed,
        days_to_year_end,
        last_fill_date,
        fill_count: fills.len(),
        measurement_period: period,
    }
}

/// `coveredDays / treatmentDays * 100`, capped at 100 and floored at 0.
/// Guards against division by zero for a degenerate (non-positive) period.
fn pct(numerator: i64, denominator: i64) -> f64 {
    if denominator <= 0 {
        return 0.0;
    }
    (numerator as f64 / denominator as f64 * 100.0).clamp(0.0, 100.0)
}

fn sorted_last_fill(fills: &[Fill]) -> Option<Fill> {
    fills.iter().max_by_key(|f| f.fill_date).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn period_2025() -> MeasurementPeriod {
        MeasurementPeriod::new(date(2025, 1, 1), date(2025, 12, 31))
    }

    #[test]
    fn empty_fills_yield_degenerate_result() {
        let result = calculate_pdc(&[], period_2025(), date(2025, 6, 15), 30, 0.20);
        assert_eq!(result.pdc, 0.0);
        assert_eq!(result.pdc_status_quo, 0.0);
        assert!(result.last_fill_date.is_none());
        assert_eq!(result.treatment_days, period_2025().length_days());
    }

    #[test]
    fn invariants_hold_for_typical_case() {
        let fills = vec![
            Fill::new(date(2025, 1, 1), 30, None),
            Fill::new(date(2025, 2, 1), 30, None),
            Fill::new(date(2025, 3, 1), 30, None),
        ];
        let result = calculate_pdc(&fills, period_2025(), date(2025, 6, 15), 30, 0.20);
        assert!(result.pdc >= 0.0 && result.pdc <= 100.0);
        assert!(result.covered_days <= result.treatment_days);
        assert!(result.pdc_status_quo <= result.pdc_perfect);
        assert_eq!(result.gap_days_used + result.covered_days, result.treatment_days);
    }

    #[test]
    fn james_twelve_monthly_fills_is_compliant_level_pdc() {
        let mut fills = Vec::new();
        for month in 1..=12 {
            fills.push(Fill::new(date(2025, month, 1), 30, None));
        }
        let result = calculate_pdc(&fills, period_2025(), date(2025, 11, 29), 30, 0.20);
        assert!(result.pdc_status_quo >= 80.0, "pdc_status_quo = {}", result.pdc_status_quo);
    }

    #[test]
    fn robert_quarterly_fills_projects_below_eighty_perfect() {
        let fills = vec![
            Fill::new(date(2025, 1, 15), 30, None),
            Fill::new(date(2025, 4, 15), 30, None),
            Fill::new(date(2025, 7, 15), 30, None),
            Fill::new(date(2025, 10, 15), 30, None),
        ];
        let result = calculate_pdc(&fills, period_2025(), date(2025, 11, 29), 30, 0.20);
        assert!(result.pdc_perfect < 80.0, "pdc_perfect = {}", result.pdc_perfect);
    }
}
