//! Assessment report.
//!
//! The report is the presentation-facing record of one run. It carries the
//! `is_estimated` flag so that synthetic buckets are always disclosed.

use chrono::{NaiveDate, Utc};
use liquidity_core::{BucketMapping, MappedBuckets, RatioResult, StressScenario};
use serde::{Deserialize, Serialize};

use crate::compliance::ComplianceAssessment;

/// Summary of a liquidity assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiquidityReport {
    /// Reporting entity (ticker or name).
    pub entity: String,
    /// Statement period the buckets were taken from.
    pub as_of: Option<NaiveDate>,
    /// Date the report was produced.
    pub generated_on: NaiveDate,
    /// Human-readable scenario label.
    pub scenario: String,
    pub stress: StressScenario,
    pub lcr: f64,
    pub nsfr: f64,
    pub compliance: ComplianceAssessment,
    /// Buckets are fallback estimates, not reconciled statement data.
    pub is_estimated: bool,
    /// Why the fallback was used, if it was.
    pub fallback_reason: Option<String>,
    pub buckets: BucketMapping,
}

impl LiquidityReport {
    pub fn new(
        entity: impl Into<String>,
        as_of: Option<NaiveDate>,
        mapped: &MappedBuckets,
        stress: StressScenario,
        ratios: RatioResult,
        compliance: ComplianceAssessment,
    ) -> Self {
        Self {
            entity: entity.into(),
            as_of,
            generated_on: Utc::now().date_naive(),
            scenario: scenario_label(&stress),
            stress,
            lcr: ratios.lcr,
            nsfr: ratios.nsfr,
            compliance,
            is_estimated: mapped.is_estimated(),
            fallback_reason: mapped.fallback.as_ref().map(ToString::to_string),
            buckets: mapped.buckets.clone(),
        }
    }

    pub fn ratios(&self) -> RatioResult {
        RatioResult {
            lcr: self.lcr,
            nsfr: self.nsfr,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// "Baseline" for unstressed runs, otherwise the multipliers.
pub fn scenario_label(stress: &StressScenario) -> String {
    if *stress == StressScenario::baseline() {
        "Baseline".to_string()
    } else {
        format!(
            "Custom Stress (run-off x{:.2}, haircut x{:.2})",
            stress.runoff_stress, stress.haircut_stress
        )
    }
}
