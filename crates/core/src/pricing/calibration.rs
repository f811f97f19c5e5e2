use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::weights::{TierSpread, DEFAULT_SPREAD, LOW_CONFIDENCE_SPREAD};
use crate::domain::metrics::{CalibrationSnapshot, ConfidenceBand};

/// Applied factors are kept within this band around 1.0.
pub fn max_upward_factor() -> Decimal {
    Decimal::new(125, 2)
}

/// Lower edge of the guardrail. History may cut a price by at most the same
/// 25% it may add.
pub fn max_downward_factor() -> Decimal {
    Decimal::new(75, 2)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalibrationPolicy {
    pub min_segment_samples: u32,
    pub min_creator_samples: u32,
}

impl Default for CalibrationPolicy {
    fn default() -> Self {
        Self { min_segment_samples: 10, min_creator_samples: 3 }
    }
}

impl CalibrationPolicy {
    pub fn is_usable(&self, snapshot: &CalibrationSnapshot) -> bool {
        snapshot.confidence_band != ConfidenceBand::Baixa
            && snapshot.segment_sample_size >= self.min_segment_samples
            && snapshot.creator_sample_size >= self.min_creator_samples
    }
}

/// Calibration block echoed in every result.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalibrationOutcome {
    pub enabled: bool,
    pub factor_raw: Decimal,
    pub factor_applied: Decimal,
    pub confidence_band: Option<ConfidenceBand>,
    pub guardrail_applied: bool,
    pub low_confidence_range_expanded: bool,
}

impl CalibrationOutcome {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            factor_raw: Decimal::ONE,
            factor_applied: Decimal::ONE,
            confidence_band: None,
            guardrail_applied: false,
            low_confidence_range_expanded: false,
        }
    }

    pub fn spread(&self) -> TierSpread {
        if self.low_confidence_range_expanded {
            LOW_CONFIDENCE_SPREAD
        } else {
            DEFAULT_SPREAD
        }
    }
}

/// Decides the factor applied to `justo`. A missing snapshot is treated as a
/// low-confidence one.
pub fn resolve(policy: &CalibrationPolicy, snapshot: Option<&CalibrationSnapshot>) -> CalibrationOutcome {
    let Some(snapshot) = snapshot else {
        return CalibrationOutcome {
            enabled: true,
            factor_raw: Decimal::ONE,
            factor_applied: Decimal::ONE,
            confidence_band: None,
            guardrail_applied: false,
            low_confidence_range_expanded: true,
        };
    };

    if !policy.is_usable(snapshot) {
        return CalibrationOutcome {
            enabled: true,
            factor_raw: snapshot.factor_raw,
            factor_applied: Decimal::ONE,
            confidence_band: Some(snapshot.confidence_band),
            guardrail_applied: false,
            low_confidence_range_expanded: true,
        };
    }

    let factor_applied =
        snapshot.factor_raw.clamp(max_downward_factor(), max_upward_factor());

    CalibrationOutcome {
        enabled: true,
        factor_raw: snapshot.factor_raw,
        factor_applied,
        confidence_band: Some(snapshot.confidence_band),
        guardrail_applied: factor_applied != snapshot.factor_raw,
        low_confidence_range_expanded: false,
    }
}
