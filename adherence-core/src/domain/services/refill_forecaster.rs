//! Refill forecaster (C5) — §4.5

use crate::domain::entities::dispense::Fill;

/// Forecasted coverage shortfall and remaining refills needed to reach
/// year-end, derived from supply-on-hand and historical fill cadence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RefillForecast {
    pub supply_on_hand: i64,
    pub coverage_shortfall: i64,
    pub estimated_days_per_refill: f64,
    pub remaining_refills: i64,
}

/// Forecasts remaining refills needed given the most recent fills, the
/// current date, and days remaining to year-end.
///
/// `recent_fills` should contain the fills most relevant to the patient's
/// present cadence (the orchestrator passes the measure's or drug's sorted
/// fill list); the mean `days_supply` over them estimates future cadence.
/// When no fills are available, 30 days is assumed.
pub fn forecast_refills(
    last_fill: Option<&Fill>,
    days_elapsed_since_last_fill: i64,
    days_to_year_end: i64,
    recent_fills: &[Fill],
    default_days_supply: u32,
) -> RefillForecast {
    let supply_on_hand = last_fill
        .map(|f| (f.days_supply - days_elapsed_since_last_fill).max(0))
        .unwrap_or(0);

    let coverage_shortfall = (days_to_year_end - supply_on_hand).max(0);

    let estimated_days_per_refill = if recent_fills.is_empty() {
        default_days_supply as f64
    } else {
        let total: i64 = recent_fills.iter().map(|f| f.days_supply).sum();
        total as f64 / recent_fills.len() as f64
    };

    let remaining_refills = if coverage_shortfall == 0 {
        0
    } else {
        (coverage_shortfall as f64 / estimated_days_per_refill).ceil() as i64
    };

    RefillForecast {
        supply_on_hand,
        coverage_shortfall,
        estimated_days_per_refill,
        remaining_refills,
    }
}
