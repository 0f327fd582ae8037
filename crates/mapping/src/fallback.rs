//! Fallback bucket estimation.
//!
//! When a statement cannot be reconciled, buckets are estimated as fixed
//! fractions of a scale anchor: the first positive statement amount (read as a
//! total-assets proxy), or a configured default magnitude.

use liquidity_core::config::{FallbackConfig, FallbackFractions};
use liquidity_core::{BucketMapping, RawLineItem};

/// Synthetic bucket estimator.
#[derive(Debug, Clone)]
pub struct FallbackEstimator {
    default_scale: f64,
    fractions: FallbackFractions,
}

impl Default for FallbackEstimator {
    fn default() -> Self {
        Self::new(&FallbackConfig::default())
    }
}

impl FallbackEstimator {
    pub fn new(config: &FallbackConfig) -> Self {
        Self {
            default_scale: config.default_scale,
            fractions: config.fractions.clone(),
        }
    }

    /// Scale anchor for a statement.
    pub fn scale_anchor(&self, items: &[RawLineItem]) -> f64 {
        items
            .iter()
            .map(|item| item.amount)
            .find(|amount| amount.is_finite() && *amount > 0.0)
            .unwrap_or(self.default_scale)
    }

    /// Estimated buckets; always contains every fallback category.
    pub fn estimate(&self, items: &[RawLineItem]) -> BucketMapping {
        let scale = self.scale_anchor(items);
        self.fractions
            .entries()
            .into_iter()
            .map(|(category, fraction)| (category, scale * fraction))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use liquidity_core::{BaselCategory, CRITICAL_CATEGORIES};

    #[test]
    fn test_estimate_from_scale_anchor() {
        let items = vec![
            RawLineItem::new("Total Assets", 10_000.0),
            RawLineItem::new("Cash", 500.0),
        ];
        let buckets = FallbackEstimator::default().estimate(&items);

        assert_eq!(buckets.len(), 5);
        assert_relative_eq!(buckets.get(&BaselCategory::Level1Hqla), 1_800.0);
        assert_relative_eq!(buckets.get(&BaselCategory::Level2aHqla), 400.0);
        assert_relative_eq!(buckets.get(&BaselCategory::RetailStable), 7_000.0);
        assert_relative_eq!(buckets.get(&BaselCategory::EquityCapital), 1_200.0);
        assert_relative_eq!(buckets.get(&BaselCategory::LoansToRetail), 7_500.0);
        assert!(buckets.missing(&CRITICAL_CATEGORIES).is_empty());
    }

    #[test]
    fn test_anchor_skips_unusable_amounts() {
        let items = vec![
            RawLineItem::new("Treasury Shares", -20.0),
            RawLineItem::new("Goodwill", f64::NAN),
            RawLineItem::new("Total Assets", 2_000.0),
        ];
        assert_eq!(FallbackEstimator::default().scale_anchor(&items), 2_000.0);
    }

    #[test]
    fn test_default_scale_for_empty_statement() {
        let estimator = FallbackEstimator::default();
        assert_eq!(estimator.scale_anchor(&[]), 1_000_000.0);
        assert_relative_eq!(
            estimator.estimate(&[]).get(&BaselCategory::RetailStable),
            700_000.0
        );
    }

    #[test]
    fn test_custom_fractions() {
        let config = FallbackConfig {
            default_scale: 100.0,
            fractions: FallbackFractions {
                level_1_hqla: 0.5,
                ..FallbackFractions::default()
            },
        };
        let buckets = FallbackEstimator::new(&config).estimate(&[]);
        assert_relative_eq!(buckets.get(&BaselCategory::Level1Hqla), 50.0);
    }
}
