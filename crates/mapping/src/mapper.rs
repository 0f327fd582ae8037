//! Statement-to-bucket reconciliation.
//!
//! Joins raw line items to the mapping table on normalized labels (inner
//! join), sums matched amounts per category, and checks the critical set.
//! Every failure resolves to fallback estimates; [`CategoryMapper::map`]
//! never returns an error.

use liquidity_core::config::{FallbackConfig, MappingConfig};
use liquidity_core::{
    BaselCategory, BucketMapping, Config, Error, FallbackReason, MappedBuckets, MappingTable,
    RawLineItem, ReconciliationStats, Result, CRITICAL_CATEGORIES,
};
use liquidity_ingestion::MappingSource;
use tracing::{debug, info, warn};

use crate::fallback::FallbackEstimator;

/// Result of joining a statement to a mapping table, before validation.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    pub buckets: BucketMapping,
    pub stats: ReconciliationStats,
}

/// Maps statement line items to Basel buckets with fallback.
#[derive(Debug, Clone)]
pub struct CategoryMapper {
    /// Categories that must all be present.
    critical: Vec<BaselCategory>,
    /// Estimator used when reconciliation is rejected.
    fallback: FallbackEstimator,
}

impl Default for CategoryMapper {
    fn default() -> Self {
        Self {
            critical: CRITICAL_CATEGORIES.to_vec(),
            fallback: FallbackEstimator::default(),
        }
    }
}

impl CategoryMapper {
    pub fn new(mapping: &MappingConfig, fallback: &FallbackConfig) -> Self {
        Self {
            critical: mapping.critical_categories.clone(),
            fallback: FallbackEstimator::new(fallback),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.mapping, &config.fallback)
    }

    /// Map line items to buckets. Falls back to estimates when the table
    /// cannot be loaded, the join is malformed, or a critical bucket is absent.
    pub fn map(&self, items: &[RawLineItem], source: &dyn MappingSource) -> MappedBuckets {
        let table = match source.load_table() {
            Ok(table) => table,
            Err(err) => {
                return self.fall_back(items, err, ReconciliationStats::default(), source)
            }
        };

        let reconciliation = self.join(items, &table);

        if let Err(err) = self.validate(&reconciliation.buckets) {
            return self.fall_back(items, err, reconciliation.stats, source);
        }

        info!(
            source = %source.describe(),
            matched = reconciliation.stats.matched_items,
            unmatched = reconciliation.stats.unmatched_items,
            buckets = reconciliation.buckets.len(),
            "statement reconciled"
        );

        MappedBuckets {
            buckets: reconciliation.buckets,
            stats: reconciliation.stats,
            fallback: None,
        }
    }

    /// Join and aggregate without validating the buckets.
    ///
    /// Items whose amount is not finite are skipped.
    pub fn join(&self, items: &[RawLineItem], table: &MappingTable) -> Reconciliation {
        let mut stats = ReconciliationStats {
            total_items: items.len(),
            ..ReconciliationStats::default()
        };
        let mut matched = Vec::new();

        for item in items {
            if !item.amount.is_finite() {
                debug!(label = %item.label, "skipping line item with non-finite amount");
                stats.skipped_items += 1;
                continue;
            }

            let categories = table.categories_for(&item.normalized_label());
            if categories.is_empty() {
                debug!(label = %item.label, "no mapping for line item");
                stats.unmatched_items += 1;
                stats.unmatched_labels.push(item.label.clone());
                continue;
            }

            stats.matched_items += 1;
            stats.matched_amount += item.amount;
            matched.extend(categories.iter().map(|c| (c.clone(), item.amount)));
        }

        Reconciliation {
            buckets: matched.into_iter().collect(),
            stats,
        }
    }

    /// Reject negative bucket totals, then check that every critical
    /// category has a key.
    pub fn validate(&self, buckets: &BucketMapping) -> Result<()> {
        if let Some((category, amount)) = buckets.iter().find(|(_, amount)| **amount < 0.0) {
            return Err(Error::malformed_input(format!(
                "bucket {category} aggregates to a negative amount ({amount})"
            )));
        }

        let missing = buckets.missing(&self.critical);
        if missing.is_empty() {
            Ok(())
        } else {
            Err(Error::MappingIncomplete { missing })
        }
    }

    fn fall_back(
        &self,
        items: &[RawLineItem],
        err: Error,
        stats: ReconciliationStats,
        source: &dyn MappingSource,
    ) -> MappedBuckets {
        let reason = FallbackReason::from(err);
        let anchor = self.fallback.scale_anchor(items);
        warn!(
            source = %source.describe(),
            %reason,
            anchor,
            "mapping rejected, using estimated buckets"
        );

        MappedBuckets {
            buckets: self.fallback.estimate(items),
            stats,
            fallback: Some(reason),
        }
    }
}

/// Map line items with the default critical set and fallback parameters.
pub fn map_to_buckets(items: &[RawLineItem], source: &dyn MappingSource) -> MappedBuckets {
    CategoryMapper::default().map(items, source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use liquidity_core::MappingRow;
    use liquidity_ingestion::CsvMappingSource;
    use proptest::prelude::*;

    fn make_table() -> MappingTable {
        MappingTable::from_rows(
            [
                ("Cash And Cash Equivalents", "Level_1_HQLA"),
                ("Cash Financial", "Level_1_HQLA"),
                ("Available For Sale Securities", "Level_2A_HQLA"),
                ("Total Deposits", "Retail_Stable"),
                ("Stockholders Equity", "Equity_Capital"),
                ("Net Loan", "Loans_to_Retail"),
            ]
            .into_iter()
            .map(|(label, category)| MappingRow {
                external_label: label.to_string(),
                category: BaselCategory::parse(category),
            }),
        )
    }

    fn make_items() -> Vec<RawLineItem> {
        vec![
            RawLineItem::new("Total Assets", 5_000.0),
            RawLineItem::new("Cash And Cash Equivalents", 150.0),
            RawLineItem::new("Cash Financial", 50.0),
            RawLineItem::new("Available For Sale Securities", 100.0),
            RawLineItem::new("Total Deposits", 1_000.0),
            RawLineItem::new("Stockholders Equity", 150.0),
            RawLineItem::new("Net Loan", 800.0),
        ]
    }

    #[test]
    fn test_full_reconciliation() {
        let mapped = map_to_buckets(&make_items(), &make_table());

        assert!(!mapped.is_estimated());
        assert_eq!(mapped.buckets.get(&BaselCategory::Level1Hqla), 200.0);
        assert_eq!(mapped.buckets.get(&BaselCategory::Level2aHqla), 100.0);
        assert_eq!(mapped.buckets.get(&BaselCategory::RetailStable), 1_000.0);
        assert_eq!(mapped.buckets.get(&BaselCategory::EquityCapital), 150.0);
        assert_eq!(mapped.buckets.get(&BaselCategory::LoansToRetail), 800.0);
        assert_eq!(mapped.stats.matched_items, 6);
        assert_eq!(mapped.stats.unmatched_labels, vec!["Total Assets".to_string()]);
        assert_relative_eq!(mapped.stats.match_rate(), 6.0 / 7.0);
    }

    #[test]
    fn test_absent_category_has_no_key() {
        let items: Vec<_> = make_items()
            .into_iter()
            .filter(|i| i.label != "Available For Sale Securities")
            .collect();
        let mapped = map_to_buckets(&items, &make_table());

        assert!(!mapped.is_estimated());
        assert!(!mapped.buckets.contains(&BaselCategory::Level2aHqla));
        assert_eq!(mapped.buckets.len(), 4);
    }

    #[test]
    fn test_messy_labels_match() {
        let items = vec![
            RawLineItem::new("  CASH AND CASH EQUIVALENTS ", 200.0),
            RawLineItem::new("total deposits", 1_000.0),
            RawLineItem::new("\tStockholders equity", 150.0),
            RawLineItem::new("NET LOAN\n", 800.0),
        ];
        let mapped = map_to_buckets(&items, &make_table());
        assert!(!mapped.is_estimated());
        assert_eq!(mapped.buckets.get(&BaselCategory::Level1Hqla), 200.0);
    }

    #[test]
    fn test_incomplete_mapping_falls_back() {
        let items = vec![
            RawLineItem::new("Total Assets", 10_000.0),
            RawLineItem::new("Cash Financial", 300.0),
        ];
        let mapped = map_to_buckets(&items, &make_table());

        assert!(mapped.is_estimated());
        match &mapped.fallback {
            Some(FallbackReason::Incomplete { missing }) => assert_eq!(missing.len(), 3),
            other => panic!("unexpected fallback: {other:?}"),
        }
        assert_eq!(mapped.stats.matched_items, 1);
        assert_relative_eq!(mapped.buckets.get(&BaselCategory::Level1Hqla), 1_800.0);
        assert_relative_eq!(mapped.buckets.get(&BaselCategory::LoansToRetail), 7_500.0);
    }

    #[test]
    fn test_zero_matches_falls_back_with_all_critical_keys() {
        let items = vec![
            RawLineItem::new("Total Assets", 4_000.0),
            RawLineItem::new("Goodwill", 12.0),
        ];
        let mapped = map_to_buckets(&items, &make_table());

        assert!(mapped.is_estimated());
        assert!(mapped.buckets.missing(&CRITICAL_CATEGORIES).is_empty());
        assert_relative_eq!(mapped.buckets.get(&BaselCategory::RetailStable), 2_800.0);
        assert_relative_eq!(mapped.buckets.get(&BaselCategory::EquityCapital), 480.0);
    }

    #[test]
    fn test_empty_statement_falls_back_to_default_scale() {
        let mapped = map_to_buckets(&[], &make_table());
        assert!(mapped.is_estimated());
        assert_relative_eq!(mapped.buckets.get(&BaselCategory::Level1Hqla), 180_000.0);
    }

    #[test]
    fn test_unresolvable_path_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let source = CsvMappingSource::new(dir.path().join("data/mapping/bank_map.csv"));
        let items = vec![RawLineItem::new("Total Assets", 1_000.0)];
        let mapped = map_to_buckets(&items, &source);

        assert!(matches!(
            mapped.fallback,
            Some(FallbackReason::ResourceUnavailable { .. })
        ));
        for category in CRITICAL_CATEGORIES.iter() {
            assert!(mapped.buckets.get(category) > 0.0);
        }
        assert_relative_eq!(mapped.buckets.get(&BaselCategory::Level1Hqla), 180.0);
    }

    #[test]
    fn test_negative_bucket_is_malformed() {
        let mut items = make_items();
        items.push(RawLineItem::new("Stockholders Equity", -400.0));
        let mapped = map_to_buckets(&items, &make_table());
        assert!(matches!(mapped.fallback, Some(FallbackReason::Malformed { .. })));
    }

    #[test]
    fn test_malformed_fallback_keeps_reconciliation_stats() {
        let items = vec![
            RawLineItem::new("Stockholders Equity", -400.0),
            RawLineItem::new("Goodwill", 5.0),
        ];
        let mapped = map_to_buckets(&items, &make_table());

        assert!(matches!(mapped.fallback, Some(FallbackReason::Malformed { .. })));
        assert_eq!(mapped.stats.total_items, 2);
        assert_eq!(mapped.stats.matched_items, 1);
        assert_eq!(mapped.stats.unmatched_items, 1);
        assert_eq!(mapped.stats.unmatched_labels, vec!["Goodwill".to_string()]);
        assert_relative_eq!(mapped.stats.matched_amount, -400.0);
    }

    #[test]
    fn test_non_finite_amounts_skipped() {
        let mut items = make_items();
        items.insert(0, RawLineItem::new("Net Loan", f64::NAN));
        let mapped = map_to_buckets(&items, &make_table());

        assert!(!mapped.is_estimated());
        assert_eq!(mapped.stats.skipped_items, 1);
        assert_eq!(mapped.buckets.get(&BaselCategory::LoansToRetail), 800.0);
    }

    #[test]
    fn test_custom_critical_set() {
        let mapping = MappingConfig {
            critical_categories: vec![BaselCategory::Level1Hqla],
            ..MappingConfig::default()
        };
        let mapper = CategoryMapper::new(&mapping, &FallbackConfig::default());
        let items = vec![RawLineItem::new("Cash Financial", 300.0)];
        assert!(!mapper.map(&items, &make_table()).is_estimated());
    }

    fn messy(label: &str, pad_left: usize, pad_right: usize, upper: bool) -> String {
        let cased = if upper {
            label.to_uppercase()
        } else {
            label.to_lowercase()
        };
        format!("{}{}{}", " ".repeat(pad_left), cased, "\t".repeat(pad_right))
    }

    proptest! {
        #[test]
        fn prop_label_normalization_invariant(
            pads in proptest::collection::vec((0usize..4, 0usize..4, any::<bool>()), 6),
            amounts in proptest::collection::vec(1.0f64..1e9, 6),
        ) {
            let clean: Vec<RawLineItem> = make_items()
                .into_iter()
                .skip(1)
                .zip(amounts.iter())
                .map(|(item, amount)| RawLineItem::new(item.label, *amount))
                .collect();
            let noisy: Vec<RawLineItem> = clean
                .iter()
                .zip(pads.iter())
                .map(|(item, (l, r, upper))| RawLineItem::new(messy(&item.label, *l, *r, *upper), item.amount))
                .collect();

            let a = map_to_buckets(&clean, &make_table());
            let b = map_to_buckets(&noisy, &make_table());
            prop_assert!(!a.is_estimated());
            prop_assert_eq!(a.buckets, b.buckets);
            prop_assert_eq!(a.fallback, b.fallback);
        }
    }
}
