use serde::{Deserialize, Serialize};

/// Intervention-urgency classification derived from a [`super::pdc_result::PdcResult`].
///
/// Ordering matches the worst-case comparison used by the orchestrator (§4.8):
/// `T5_UNSALVAGEABLE < F1 < F2 < F3 < F4 < F5 < COMPLIANT`, i.e. a *lower*
/// ordinal is *more* urgent except for `T5`, which sorts first as the
/// genuinely worst outcome (already lost, nothing left to protect this year).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FragilityTier {
    Unsalvageable,
    F1Imminent,
    F2Fragile,
    F3Moderate,
    F4Comfortable,
    F5Safe,
    Compliant,
}

impl FragilityTier {
    /// Ordinal used for display and for the `tierLevel` observation field.
    pub fn tier_level(&self) -> u8 {
        match self {
            FragilityTier::Unsalvageable => 0,
            FragilityTier::F1Imminent => 1,
            FragilityTier::F2Fragile => 2,
            FragilityTier::F3Moderate => 3,
            FragilityTier::F4Comfortable => 4,
            FragilityTier::F5Safe => 5,
            FragilityTier::Compliant => 6,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            FragilityTier::Unsalvageable => "T5_UNSALVAGEABLE",
            FragilityTier::F1Imminent => "F1_IMMINENT",
            FragilityTier::F2Fragile => "F2_FRAGILE",
            FragilityTier::F3Moderate => "F3_MODERATE",
            FragilityTier::F4Comfortable => "F4_COMFORTABLE",
            FragilityTier::F5Safe => "F5_SAFE",
            FragilityTier::Compliant => "COMPLIANT",
        }
    }

    /// One step toward F1, used by Q4 tightening. `COMPLIANT` and
    /// `T5_UNSALVAGEABLE` never tighten and return themselves unchanged.
    pub fn tighten_one_step(&self) -> FragilityTier {
        match self {
            FragilityTier::F5Safe => FragilityTier::F4Comfortable,
            FragilityTier::F4Comfortable => FragilityTier::F3Moderate,
            FragilityTier::F3Moderate => FragilityTier::F2Fragile,
            FragilityTier::F2Fragile => FragilityTier::F1Imminent,
            other => *other,
        }
    }

    pub fn contact_window(&self) -> &'static str {
        match self {
            FragilityTier::F1Imminent => "24 hours",
            FragilityTier::F2Fragile => "48 hours",
            FragilityTier::F3Moderate => "1 week",
            FragilityTier::F4Comfortable => "2 weeks",
            FragilityTier::F5Safe => "monthly",
            FragilityTier::Compliant => "no action",
            FragilityTier::Unsalvageable => "document loss, focus next year",
        }
    }

    pub fn action(&self) -> String {
        match self {
            FragilityTier::Compliant => "no action".to_string(),
            FragilityTier::Unsalvageable => "document loss, focus next year".to_string(),
            other => format!("outreach within {}", other.contact_window()),
        }
    }
}

impl std::fmt::Display for FragilityTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Categorical urgency derived from `priorityScore` (§4.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UrgencyLevel {
    Extreme,
    High,
    Moderate,
    Low,
}

impl UrgencyLevel {
    pub fn from_priority_score(priority_score: i64) -> Self {
        if priority_score >= 150 {
            UrgencyLevel::Extreme
        } else if priority_score >= 100 {
            UrgencyLevel::High
        } else if priority_score >= 50 {
            UrgencyLevel::Moderate
        } else {
            UrgencyLevel::Low
        }
    }
}

/// The individual priority-score contributions (§4.6). Their sum, plus the
/// tier's base score, is `priorityScore`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityBonuses {
    pub base: i64,
    pub out_of_meds: i64,
    pub q4: i64,
    pub multiple_ma: i64,
    pub new_patient: i64,
}

impl PriorityBonuses {
    pub fn total(&self) -> i64 {
        self.base + self.out_of_meds + self.q4 + self.multiple_ma + self.new_patient
    }
}

/// Boolean context flags carried alongside a [`FragilityResult`] (§3).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FragilityFlags {
    pub is_compliant: bool,
    pub is_unsalvageable: bool,
    pub is_out_of_meds: bool,
    pub is_q4: bool,
    pub is_multiple_ma: bool,
    pub is_new_patient: bool,
    pub q4_tightened: bool,
}

/// The full output of the fragility engine (C6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FragilityResult {
    pub tier: FragilityTier,
    pub delay_budget_per_refill: f64,
    pub priority_score: i64,
    pub urgency_level: UrgencyLevel,
    pub contact_window: String,
    pub action: String,
    pub bonuses: PriorityBonuses,
    pub flags: FragilityFlags,
}
