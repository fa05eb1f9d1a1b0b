use serde::{Deserialize, Serialize};
use shared::domain::RiskTier;

use crate::ledger::ReviewLedger;

const LOW_RISK_FLOOR: u8 = 90;
const MEDIUM_RISK_FLOOR: u8 = 70;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedMetrics {
    pub compliance_percentage: u8,
    pub risk_tier: RiskTier,
}

/// `round(100 * approved / total)` with halves rounded up; 0 for an empty
/// ledger.
pub fn compliance_percentage(approved: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let approved = approved.min(total) as u64;
    let total = total as u64;
    ((200 * approved + total) / (2 * total)) as u8
}

pub fn risk_tier(compliance_percentage: u8) -> RiskTier {
    if compliance_percentage >= LOW_RISK_FLOOR {
        RiskTier::Low
    } else if compliance_percentage >= MEDIUM_RISK_FLOOR {
        RiskTier::Medium
    } else {
        RiskTier::High
    }
}

pub fn derive(ledger: &ReviewLedger) -> DerivedMetrics {
    let compliance_percentage = compliance_percentage(ledger.approved_count(), ledger.len());
    DerivedMetrics {
        compliance_percentage,
        risk_tier: risk_tier(compliance_percentage),
    }
}

#[cfg(test)]
#[path = "tests/metrics_tests.rs"]
mod tests;
