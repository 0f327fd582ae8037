//! LCR and NSFR calculation.
//!
//! Both ratios are pure functions of the bucket mapping, the regulatory
//! settings and the stress scenario. Missing buckets read as zero and a zero
//! denominator yields a ratio of 0, so every valid input produces a finite
//! result.

use liquidity_core::config::RegulatorySettings;
use liquidity_core::{round2, BaselCategory, BucketMapping, RatioResult, Result, StressScenario};
use serde::{Deserialize, Serialize};

/// Base haircut on Level 1 HQLA.
pub const LEVEL_1_HAIRCUT: f64 = 0.00;
/// Base haircut on Level 2A HQLA, scaled by the haircut stress.
pub const LEVEL_2A_HAIRCUT: f64 = 0.15;
/// ASF factor for equity capital.
pub const ASF_EQUITY_CAPITAL: f64 = 1.00;
/// ASF factor for stable retail deposits.
pub const ASF_RETAIL_STABLE: f64 = 0.90;
/// RSF factor for retail loans.
pub const RSF_LOANS_TO_RETAIL: f64 = 0.85;

/// Intermediate LCR quantities.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LcrBreakdown {
    /// Level 1 HQLA after haircut.
    pub level1_adjusted: f64,
    /// Level 2A HQLA after stressed haircut.
    pub level2a_adjusted: f64,
    /// Total stressed HQLA.
    pub hqla: f64,
    /// Stressed retail run-off rate.
    pub outflow_rate: f64,
    /// Stressed outflows.
    pub outflows: f64,
    /// LCR in percent, rounded to two decimals.
    pub ratio: f64,
}

/// Intermediate NSFR quantities.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NsfrBreakdown {
    /// Available stable funding.
    pub asf: f64,
    /// Required stable funding.
    pub rsf: f64,
    /// NSFR in percent, rounded to two decimals.
    pub ratio: f64,
}

/// Percentage ratio, 0 when the denominator is not positive.
#[inline]
fn percent_or_zero(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        round2(numerator / denominator * 100.0)
    } else {
        0.0
    }
}

/// Haircut multiplier, floored at zero so extreme stress cannot turn an
/// asset into a liability.
#[inline]
fn retained_fraction(base_haircut: f64, haircut_stress: f64) -> f64 {
    (1.0 - base_haircut * haircut_stress).max(0.0)
}

/// Stress-adjusted liquidity coverage ratio.
pub fn lcr(
    buckets: &BucketMapping,
    settings: &RegulatorySettings,
    stress: &StressScenario,
) -> LcrBreakdown {
    let level1_adjusted = buckets.get(&BaselCategory::Level1Hqla)
        * retained_fraction(LEVEL_1_HAIRCUT, stress.haircut_stress);
    let level2a_adjusted = buckets.get(&BaselCategory::Level2aHqla)
        * retained_fraction(LEVEL_2A_HAIRCUT, stress.haircut_stress);
    let hqla = level1_adjusted + level2a_adjusted;

    let outflow_rate = settings.retail_stable_run_off() * stress.runoff_stress;
    let outflows = buckets.get(&BaselCategory::RetailStable) * outflow_rate;

    LcrBreakdown {
        level1_adjusted,
        level2a_adjusted,
        hqla,
        outflow_rate,
        outflows,
        ratio: percent_or_zero(hqla, outflows),
    }
}

/// Net stable funding ratio. Independent of stress.
pub fn nsfr(buckets: &BucketMapping) -> NsfrBreakdown {
    let asf = buckets.get(&BaselCategory::EquityCapital) * ASF_EQUITY_CAPITAL
        + buckets.get(&BaselCategory::RetailStable) * ASF_RETAIL_STABLE;
    let rsf = buckets.get(&BaselCategory::LoansToRetail) * RSF_LOANS_TO_RETAIL;

    NsfrBreakdown {
        asf,
        rsf,
        ratio: percent_or_zero(asf, rsf),
    }
}

/// Ratio calculator bound to a set of regulatory settings.
#[derive(Debug, Clone)]
pub struct RatioCalculator {
    settings: RegulatorySettings,
}

impl RatioCalculator {
    /// Create a calculator. Fails if the settings are out of range.
    pub fn new(settings: RegulatorySettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self { settings })
    }

    pub fn settings(&self) -> &RegulatorySettings {
        &self.settings
    }

    /// LCR and NSFR for one scenario.
    pub fn calculate(&self, buckets: &BucketMapping, stress: &StressScenario) -> Result<RatioResult> {
        stress.validate()?;
        Ok(RatioResult {
            lcr: lcr(buckets, &self.settings, stress).ratio,
            nsfr: nsfr(buckets).ratio,
        })
    }

    /// Full breakdown for one scenario.
    pub fn breakdown(
        &self,
        buckets: &BucketMapping,
        stress: &StressScenario,
    ) -> Result<(LcrBreakdown, NsfrBreakdown)> {
        stress.validate()?;
        Ok((lcr(buckets, &self.settings, stress), nsfr(buckets)))
    }
}

/// Compute (LCR, NSFR) for the given buckets, settings and stress multipliers.
pub fn calculate_ratios(
    buckets: &BucketMapping,
    settings: &RegulatorySettings,
    runoff_stress: f64,
    haircut_stress: f64,
) -> Result<RatioResult> {
    let stress = StressScenario::new(runoff_stress, haircut_stress)?;
    RatioCalculator::new(settings.clone())?.calculate(buckets, &stress)
}
