//! Liquidity ratio engine.
//!
//! This crate provides:
//! - Stress-adjusted LCR and stress-invariant NSFR calculation
//! - Compliance band classification
//! - Parallel sensitivity sweeps over stress grids, with a result cache
//! - The statement-to-report assessment pipeline

pub mod calculator;
pub mod compliance;
pub mod pipeline;
pub mod report;
pub mod sensitivity;

pub use calculator::{calculate_ratios, LcrBreakdown, NsfrBreakdown, RatioCalculator};
pub use compliance::{ComplianceBand, ComplianceAssessment};
pub use pipeline::{Assessment, Assessor};
pub use report::LiquidityReport;
pub use sensitivity::{sweep, RatioCache, SensitivityGrid, SensitivityMatrix};
