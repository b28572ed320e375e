//! Fragility engine (C6) — classification. §4.6
//!
//! Derives a [`FragilityTier`], composite priority score, urgency level,
//! contact window, action, and Q4 adjustments from a [`PdcResult`] plus
//! refill context. Never fails: every input collapses into a well-formed
//! result, matching the calculation contract shared with C3/C4/C5.

use chrono::NaiveDate;

use crate::config::FragilityConfig;
use crate::domain::entities::fragility::{
    FragilityFlags, FragilityResult, FragilityTier, PriorityBonuses, UrgencyLevel,
};
use crate::domain::entities::pdc_result::PdcResult;

/// Context the orchestrator gathers across measures/drugs before classifying
/// a single `(patient, measure)` or `(patient, measure, drug)` combination.
#[derive(Debug, Clone, Copy)]
pub struct FragilityContext {
    pub current_date: NaiveDate,
    /// Refills remaining per the refill forecaster (C5); used as the
    /// denominator of `delayBudgetPerRefill`.
    pub refills_remaining: i64,
    /// True when the patient is enrolled in 2 or more MA measures within
    /// the same measurement year (§4.6 multipleMA bonus).
    pub is_multiple_ma: bool,
    /// True when the patient's first-ever fill falls within the configured
    /// new-patient window (§4.6 newPatient bonus; 90-day definition, §9).
    pub is_new_patient: bool,
}

/// Classifies a [`PdcResult`] into a [`FragilityResult`] (§4.6).
pub fn classify(pdc: &PdcResult, ctx: FragilityContext, config: &FragilityConfig) -> FragilityResult {
    let is_q4_month = matches!(ctx.current_date.format("%m").to_string().as_str(), "10" | "11" | "12");

    // Pre-classification short-circuits, in order (§4.6).
    if pdc.pdc_status_quo >= 80.0 {
        return compliant_result();
    }
    if pdc.pdc_perfect < 80.0 || pdc.gap_days_remaining < 0 {
        return unsalvageable_result();
    }

    let refills_for_budget = ctx.refills_remaining.max(1);
    let delay_budget_per_refill = pdc.gap_days_remaining as f64 / refills_for_budget as f64;

    let mut tier = tier_for_budget(delay_budget_per_refill);

    let q4_eligible_for_tightening = is_q4_month
        && pdc.gap_days_remaining <= config.q4_gap_days_threshold
        && pdc.days_to_year_end < config.q4_days_to_year_end_threshold;
    let q4_tightened = q4_eligible_for_tightening && matches!(
        tier,
        FragilityTier::F2Fragile | FragilityTier::F3Moderate | FragilityTier::F4Comfortable | FragilityTier::F5Safe
    );
    if q4_tightened {
        tier = tier.tighten_one_step();
    }

    let base = base_score(tier);
    let is_out_of_meds = pdc.days_until_runout <= 0;

    let bonuses = PriorityBonuses {
        base,
        out_of_meds: if is_out_of_meds { config.bonus_out_of_meds } else { 0 },
        q4: if is_q4_month { config.bonus_q4 } else { 0 },
        multiple_ma: if ctx.is_multiple_ma { config.bonus_multiple_ma } else { 0 },
        new_patient: if ctx.is_new_patient { config.bonus_new_patient } else { 0 },
    };
    let priority_score = bonuses.total();

    FragilityResult {
        tier,
        delay_budget_per_refill,
        priority_score,
        urgency_level: UrgencyLevel::from_priority_score(priority_score),
        contact_window: tier.contact_window().to_string(),
        action: tier.action(),
        bonuses,
        flags: FragilityFlags {
            is_compliant: false,
            is_unsalvageable: false,
            is_out_of_meds,
            is_q4: is_q4_month,
            is_multiple_ma: ctx.is_multiple_ma,
            is_new_patient: ctx.is_new_patient,
            q4_tightened,
        },
    }
}

fn compliant_result() -> FragilityResult {
    FragilityResult {
        tier: FragilityTier::Compliant,
        delay_budget_per_refill: 0.0,
        priority_score: 0,
        urgency_level: UrgencyLevel::from_priority_score(0),
        contact_window: FragilityTier::Compliant.contact_window().to_string(),
        action: FragilityTier::Compliant.action(),
        bonuses: PriorityBonuses::default(),
        flags: FragilityFlags {
            is_compliant: true,
            ..FragilityFlags::default()
        },
    }
}

fn unsalvageable_result() -> FragilityResult {
    FragilityResult {
        tier: FragilityTier::Unsalvageable,
        delay_budget_per_refill: 0.0,
        priority_score: 0,
        urgency_level: UrgencyLevel::from_priority_score(0),
        contact_window: FragilityTier::Unsalvageable.contact_window().to_string(),
        action: FragilityTier::Unsalvageable.action(),
        bonuses: PriorityBonuses::default(),
        flags: FragilityFlags {
            is_unsalvageable: true,
            ..FragilityFlags::default()
        },
    }
}

/// Tier boundary table (§4.6), inclusive bounds in days.
fn tier_for_budget(delay_budget_per_refill: f64) -> FragilityTier {
    if delay_budget_per_refill <= 2.0 {
        FragilityTier::F1Imminent
    } else if delay_budget_per_refill <= 5.0 {
        FragilityTier::F2Fragile
    } else if delay_budget_per_refill <= 10.0 {
        FragilityTier::F3Moderate
    } else if delay_budget_per_refill <= 20.0 {
        FragilityTier::F4Comfortable
    } else {
        FragilityTier::F5Safe
    }
}

fn base_score(tier: FragilityTier) -> i64 {
    match tier {
        FragilityTier::F1Imminent => 100,
        FragilityTier::F2Fragile => 80,
        FragilityTier::F3Moderate => 60,
        FragilityTier::F4Comfortable => 40,
        FragilityTier::F5Safe => 20,
        FragilityTier::Compliant | FragilityTier::Unsalvageable => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::pdc_result::MeasurementPeriod;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn base_pdc() -> PdcResult {
        PdcResult {
            pdc: 70.0,
            covered_days: 100,
            treatment_days: 200,
            gap_days_used: 100,
            gap_days_allowed: 40,
            gap_days_remaining: -60,
            pdc_status_quo: 70.0,
            pdc_perfect: 95.0,
            days_until_runout: 10,
            current_supply: 10,
            refills_needed: 1,
            days_to_year_end: 90,
            last_fill_date: Some(date(2025, 9, 1)),
            fill_count: 5,
            measurement_period: MeasurementPeriod::new(date(2025, 1, 1), date(2025, 12, 31)),
        }
    }

    fn ctx(current_date: NaiveDate) -> FragilityContext {
        FragilityContext {
            current_date,
            refills_remaining: 1,
            is_multiple_ma: false,
            is_new_patient: false,
        }
    }

    #[test]
    fn status_quo_above_eighty_is_compliant() {
        let mut pdc = base_pdc();
        pdc.pdc_status_quo = 85.0;
        pdc.gap_days_remaining = 5;
        let result = classify(&pdc, ctx(date(2025, 6, 1)), &FragilityConfig::default());
        assert_eq!(result.tier, FragilityTier::Compliant);
        assert_eq!(result.priority_score, 0);
        assert!(result.flags.is_compliant);
    }

    #[test]
    fn perfect_below_eighty_is_unsalvageable() {
        let mut pdc = base_pdc();
        pdc.pdc_perfect = 70.0;
        pdc.gap_days_remaining = 5;
        let result = classify(&pdc, ctx(date(2025, 6, 1)), &FragilityConfig::default());
        assert_eq!(result.tier, FragilityTier::Unsalvageable);
        assert!(result.flags.is_unsalvageable);
    }

    #[test]
    fn negative_gap_days_remaining_is_unsalvageable_even_with_good_projections() {
        let mut pdc = base_pdc();
        pdc.pdc_status_quo = 50.0;
        pdc.pdc_perfect = 90.0;
        pdc.gap_days_remaining = -1;
        let result = classify(&pdc, ctx(date(2025, 6, 1)), &FragilityConfig::default());
        assert_eq!(result.tier, FragilityTier::Unsalvageable);
    }

    #[test]
    fn tier_boundaries_are_inclusive_lower_bound() {
        let mut pdc = base_pdc();
        pdc.pdc_status_quo = 50.0;
        pdc.pdc_perfect = 90.0;

        pdc.gap_days_remaining = 2;
        let r = classify(&pdc, ctx(date(2025, 6, 1)), &FragilityConfig::default());
        assert_eq!(r.tier, FragilityTier::F1Imminent);

        pdc.gap_days_remaining = 3;
        let r = classify(&pdc, ctx(date(2025, 6, 1)), &FragilityConfig::default());
        assert_eq!(r.tier, FragilityTier::F2Fragile);

        pdc.gap_days_remaining = 21;
        let r = classify(&pdc, ctx(date(2025, 6, 1)), &FragilityConfig::default());
        assert_eq!(r.tier, FragilityTier::F5Safe);
    }

    #[test]
    fn q4_tightening_promotes_one_step_when_conditions_met() {
        let mut pdc = base_pdc();
        pdc.pdc_status_quo = 50.0;
        pdc.pdc_perfect = 90.0;
        pdc.gap_days_remaining = 8; // F3 territory
        pdc.days_to_year_end = 45; // < 60

        let result = classify(&pdc, ctx(date(2025, 11, 15)), &FragilityConfig::default());
        assert_eq!(result.tier, FragilityTier::F2Fragile);
        assert!(result.flags.q4_tightened);
        assert!(result.flags.is_q4);
    }

    #[test]
    fn q4_tightening_never_applies_outside_q4_months() {
        let mut pdc = base_pdc();
        pdc.pdc_status_quo = 50.0;
        pdc.pdc_perfect = 90.0;
        pdc.gap_days_remaining = 3;
        pdc.days_to_year_end = 45;

        let result = classify(&pdc, ctx(date(2025, 6, 15)), &FragilityConfig::default());
        assert!(!result.flags.q4_tightened);
        assert!(!result.flags.is_q4);
    }

    #[test]
    fn q4_tightening_never_crosses_into_f1_from_already_tight_budget_table() {
        // Already F1 (budget <= 2): tightening has nowhere further to go and
        // tighten_one_step is a no-op, but q4_tightened should not fire since
        // F1 isn't in the tightening match arm.
        let mut pdc = base_pdc();
        pdc.pdc_status_quo = 50.0;
        pdc.pdc_perfect = 90.0;
        pdc.gap_days_remaining = 1;
        pdc.days_to_year_end = 30;

        let result = classify(&pdc, ctx(date(2025, 11, 15)), &FragilityConfig::default());
        assert_eq!(result.tier, FragilityTier::F1Imminent);
        assert!(!result.flags.q4_tightened);
    }

    #[test]
    fn priority_score_equals_sum_of_bonuses() {
        let mut pdc = base_pdc();
        pdc.pdc_status_quo = 50.0;
        pdc.pdc_perfect = 90.0;
        pdc.gap_days_remaining = 8;
        pdc.days_to_year_end = 90;
        pdc.days_until_runout = -5; // out of meds

        let context = FragilityContext {
            current_date: date(2025, 12, 1),
            refills_remaining: 1,
            is_multiple_ma: true,
            is_new_patient: true,
        };
        let result = classify(&pdc, context, &FragilityConfig::default());
        let expected = result.bonuses.base
            + result.bonuses.out_of_meds
            + result.bonuses.q4
            + result.bonuses.multiple_ma
            + result.bonuses.new_patient;
        assert_eq!(result.priority_score, expected);
        assert!(result.flags.is_out_of_meds);
        assert!(result.flags.is_multiple_ma);
        assert!(result.flags.is_new_patient);
    }

    #[test]
    fn urgency_level_thresholds() {
        assert_eq!(UrgencyLevel::from_priority_score(150), UrgencyLevel::Extreme);
        assert_eq!(UrgencyLevel::from_priority_score(149), UrgencyLevel::High);
        assert_eq!(UrgencyLevel::from_priority_score(100), UrgencyLevel::High);
        assert_eq!(UrgencyLevel::from_priority_score(99), UrgencyLevel::Moderate);
        assert_eq!(UrgencyLevel::from_priority_score(50), UrgencyLevel::Moderate);
        assert_eq!(UrgencyLevel::from_priority_score(49), UrgencyLevel::Low);
    }

    #[test]
    fn refills_remaining_floor_of_one_avoids_division_by_zero() {
        let mut pdc = base_pdc();
        pdc.pdc_status_quo = 50.0;
        pdc.pdc_perfect = 90.0;
        pdc.gap_days_remaining = 10;

        let context = FragilityContext {
            current_date: date(2025, 6, 1),
            refills_remaining: 0,
            is_multiple_ma: false,
            is_new_patient: false,
        };
        let result = classify(&pdc, context, &FragilityConfig::default());
        assert_eq!(result.delay_budget_per_refill, 10.0);
    }
}
