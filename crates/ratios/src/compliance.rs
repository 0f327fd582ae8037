//! Compliance band classification.

use liquidity_core::config::ThresholdConfig;
use liquidity_core::RatioResult;
use serde::{Deserialize, Serialize};

/// Where a ratio sits relative to its regulatory thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplianceBand {
    /// Below the regulatory minimum.
    Breach,
    /// At or above the minimum but inside the management buffer.
    Watch,
    /// At or above the buffer.
    Compliant,
}

impl ComplianceBand {
    pub fn as_str(self) -> &'static str {
        match self {
            ComplianceBand::Breach => "breach",
            ComplianceBand::Watch => "watch",
            ComplianceBand::Compliant => "compliant",
        }
    }

    /// LCR band: breach below the minimum, watch below the buffer.
    pub fn for_lcr(lcr: f64, thresholds: &ThresholdConfig) -> Self {
        if lcr < thresholds.lcr_minimum {
            ComplianceBand::Breach
        } else if lcr < thresholds.lcr_buffer {
            ComplianceBand::Watch
        } else {
            ComplianceBand::Compliant
        }
    }

    /// NSFR band: there is no watch zone.
    pub fn for_nsfr(nsfr: f64, thresholds: &ThresholdConfig) -> Self {
        if nsfr < thresholds.nsfr_minimum {
            ComplianceBand::Breach
        } else {
            ComplianceBand::Compliant
        }
    }
}

/// Bands for both ratios.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceAssessment {
    pub lcr: ComplianceBand,
    pub nsfr: ComplianceBand,
}

impl ComplianceAssessment {
    pub fn new(ratios: &RatioResult, thresholds: &ThresholdConfig) -> Self {
        Self {
            lcr: ComplianceBand::for_lcr(ratios.lcr, thresholds),
            nsfr: ComplianceBand::for_nsfr(ratios.nsfr, thresholds),
        }
    }

    pub fn is_compliant(&self) -> bool {
        self.lcr != ComplianceBand::Breach && self.nsfr != ComplianceBand::Breach
    }
}
