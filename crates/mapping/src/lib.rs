//! Category mapping for the liquidity engine.
//!
//! This crate handles:
//! - Joining statement line items to Basel categories by normalized label
//! - Aggregating matched amounts into buckets
//! - Validating that the critical buckets are present
//! - Substituting fallback estimates when reconciliation fails

pub mod fallback;
pub mod mapper;

pub use fallback::FallbackEstimator;
pub use mapper::{map_to_buckets, CategoryMapper, Reconciliation};
