//! Core data types for the liquidity engine.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Monetary amount in statement currency units.
pub type Amount = f64;

/// Normalize a statement or mapping-table label for comparison.
///
/// Trims surrounding whitespace and case-folds. Both sides of every label
/// comparison must go through this function.
#[inline]
pub fn normalize_label(label: &str) -> String {
    label.trim().to_lowercase()
}

/// A single (label, amount) row from a financial statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawLineItem {
    /// Label as reported by the statement source.
    pub label: String,
    /// Reported amount.
    pub amount: Amount,
}

impl RawLineItem {
    pub fn new(label: impl Into<String>, amount: Amount) -> Self {
        Self {
            label: label.into(),
            amount,
        }
    }

    /// Normalized label used for joining against the mapping table.
    #[inline]
    pub fn normalized_label(&self) -> String {
        normalize_label(&self.label)
    }
}

/// Basel III regulatory bucket.
///
/// The five named variants are the buckets the ratio formulas read. Any other
/// category name found in a mapping table is carried as `Other`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BaselCategory {
    /// Level 1 high-quality liquid assets (no haircut).
    Level1Hqla,
    /// Level 2A high-quality liquid assets (15% base haircut).
    Level2aHqla,
    /// Stable retail deposits.
    RetailStable,
    /// Equity capital.
    EquityCapital,
    /// Loans to retail customers.
    LoansToRetail,
    /// Any other category name, stored lowercased.
    Other(String),
}

/// Categories that must all be present for a reconciliation to be accepted.
pub const CRITICAL_CATEGORIES: [BaselCategory; 4] = [
    BaselCategory::Level1Hqla,
    BaselCategory::RetailStable,
    BaselCategory::EquityCapital,
    BaselCategory::LoansToRetail,
];

impl BaselCategory {
    /// Parse a category name. Matching is case-insensitive and ignores
    /// surrounding whitespace; unknown names become `Other` under their
    /// lowercased spelling, so case variants share one bucket.
    pub fn parse(name: &str) -> Self {
        let trimmed = name.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "level_1_hqla" => BaselCategory::Level1Hqla,
            "level_2a_hqla" => BaselCategory::Level2aHqla,
            "retail_stable" => BaselCategory::RetailStable,
            "equity_capital" => BaselCategory::EquityCapital,
            "loans_to_retail" => BaselCategory::LoansToRetail,
            _ => BaselCategory::Other(trimmed.to_ascii_lowercase()),
        }
    }

    /// Canonical category name.
    pub fn as_str(&self) -> &str {
        match self {
            BaselCategory::Level1Hqla => "Level_1_HQLA",
            BaselCategory::Level2aHqla => "Level_2A_HQLA",
            BaselCategory::RetailStable => "Retail_Stable",
            BaselCategory::EquityCapital => "Equity_Capital",
            BaselCategory::LoansToRetail => "Loans_to_Retail",
            BaselCategory::Other(name) => name,
        }
    }
}

impl fmt::Display for BaselCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for BaselCategory {
    fn from(name: String) -> Self {
        BaselCategory::parse(&name)
    }
}

impl From<&str> for BaselCategory {
    fn from(name: &str) -> Self {
        BaselCategory::parse(name)
    }
}

impl From<BaselCategory> for String {
    fn from(category: BaselCategory) -> Self {
        category.as_str().to_string()
    }
}

/// Aggregated amount per Basel category.
///
/// Built once per reconciliation and read-only afterwards. Absent keys read
/// as zero through [`BucketMapping::get`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BucketMapping {
    amounts: BTreeMap<BaselCategory, Amount>,
}

impl BucketMapping {
    /// Amount for a category, zero when absent.
    #[inline]
    pub fn get(&self, category: &BaselCategory) -> Amount {
        self.amounts.get(category).copied().unwrap_or(0.0)
    }

    /// Amount for a category, `None` when absent.
    pub fn amount(&self, category: &BaselCategory) -> Option<Amount> {
        self.amounts.get(category).copied()
    }

    pub fn contains(&self, category: &BaselCategory) -> bool {
        self.amounts.contains_key(category)
    }

    /// Categories from `required` that have no key in this mapping.
    pub fn missing(&self, required: &[BaselCategory]) -> Vec<BaselCategory> {
        required
            .iter()
            .filter(|c| !self.contains(c))
            .cloned()
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&BaselCategory, &Amount)> {
        self.amounts.iter()
    }

    pub fn len(&self) -> usize {
        self.amounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.amounts.is_empty()
    }
}

/// Sums amounts for repeated categories.
impl FromIterator<(BaselCategory, Amount)> for BucketMapping {
    fn from_iter<I: IntoIterator<Item = (BaselCategory, Amount)>>(iter: I) -> Self {
        let mut amounts = BTreeMap::new();
        for (category, amount) in iter {
            *amounts.entry(category).or_insert(0.0) += amount;
        }
        Self { amounts }
    }
}

/// One row of the label mapping table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingRow {
    /// Label as written in the mapping table.
    pub external_label: String,
    /// Target Basel category.
    pub category: BaselCategory,
}

/// Label-to-category dictionary, indexed by normalized label.
#[derive(Debug, Clone, Default)]
pub struct MappingTable {
    rows: Vec<MappingRow>,
    index: HashMap<String, Vec<BaselCategory>>,
}

impl MappingTable {
    /// Build a table from rows. Identical (label, category) pairs after
    /// normalization collapse to one entry; a label listed under several
    /// distinct categories joins to each of them.
    pub fn from_rows(rows: impl IntoIterator<Item = MappingRow>) -> Self {
        let mut table = Self::default();
        for row in rows {
            let key = normalize_label(&row.external_label);
            let categories = table.index.entry(key).or_default();
            if !categories.contains(&row.category) {
                categories.push(row.category.clone());
                table.rows.push(row);
            }
        }
        table
    }

    /// Categories a normalized label maps to (empty if unmapped).
    pub fn categories_for(&self, normalized_label: &str) -> &[BaselCategory] {
        self.index
            .get(normalized_label)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn rows(&self) -> &[MappingRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Why the fallback estimator replaced a reconciliation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FallbackReason {
    /// Mapping table could not be loaded.
    ResourceUnavailable { detail: String },
    /// Critical categories were absent after the join.
    Incomplete { missing: Vec<BaselCategory> },
    /// Input failed a sanity check.
    Malformed { detail: String },
}

impl From<Error> for FallbackReason {
    fn from(err: Error) -> Self {
        match err {
            Error::MappingIncomplete { missing } => FallbackReason::Incomplete { missing },
            Error::MalformedInput(detail) => FallbackReason::Malformed { detail },
            other => FallbackReason::ResourceUnavailable {
                detail: other.to_string(),
            },
        }
    }
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FallbackReason::ResourceUnavailable { detail } => {
                write!(f, "mapping table unavailable ({detail})")
            }
            FallbackReason::Incomplete { missing } => {
                let names: Vec<&str> = missing.iter().map(BaselCategory::as_str).collect();
                write!(f, "critical categories missing ({})", names.join(", "))
            }
            FallbackReason::Malformed { detail } => write!(f, "malformed input ({detail})"),
        }
    }
}

/// Diagnostics collected while joining a statement against a mapping table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationStats {
    /// Line items seen.
    pub total_items: usize,
    /// Line items that joined to at least one category.
    pub matched_items: usize,
    /// Line items with no mapping row.
    pub unmatched_items: usize,
    /// Line items skipped because the amount was not finite.
    pub skipped_items: usize,
    /// Sum of amounts that joined to a category.
    pub matched_amount: Amount,
    /// Raw labels that did not match, in statement order.
    pub unmatched_labels: Vec<String>,
}

impl ReconciliationStats {
    /// Fraction of usable line items that matched.
    pub fn match_rate(&self) -> f64 {
        let usable = self.total_items - self.skipped_items;
        if usable > 0 {
            self.matched_items as f64 / usable as f64
        } else {
            0.0
        }
    }
}

/// Output of the category mapper: buckets plus how they were obtained.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappedBuckets {
    /// Bucket amounts handed to the ratio calculator.
    pub buckets: BucketMapping,
    /// Join diagnostics (empty when the table could not be loaded).
    pub stats: ReconciliationStats,
    /// Set when the buckets are synthetic estimates.
    pub fallback: Option<FallbackReason>,
}

impl MappedBuckets {
    /// Buckets are synthetic and must be disclosed as estimates.
    #[inline]
    pub fn is_estimated(&self) -> bool {
        self.fallback.is_some()
    }
}

/// Stress multipliers applied to the LCR.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StressScenario {
    /// Multiplier on the retail run-off rate.
    pub runoff_stress: f64,
    /// Multiplier on the Level 2A haircut.
    pub haircut_stress: f64,
}

impl StressScenario {
    /// Create a validated scenario. Both multipliers must be finite and >= 1.0.
    pub fn new(runoff_stress: f64, haircut_stress: f64) -> Result<Self> {
        let scenario = Self {
            runoff_stress,
            haircut_stress,
        };
        scenario.validate()?;
        Ok(scenario)
    }

    /// Unstressed scenario (both multipliers 1.0).
    pub fn baseline() -> Self {
        Self {
            runoff_stress: 1.0,
            haircut_stress: 1.0,
        }
    }

    pub fn validate(&self) -> Result<()> {
        check_multiplier("runoff_stress", self.runoff_stress)?;
        check_multiplier("haircut_stress", self.haircut_stress)
    }
}

impl Default for StressScenario {
    fn default() -> Self {
        Self::baseline()
    }
}

fn check_multiplier(name: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 1.0 {
        Ok(())
    } else {
        Err(Error::InvalidStress { name, value })
    }
}

/// LCR and NSFR percentages, rounded to two decimals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatioResult {
    pub lcr: f64,
    pub nsfr: f64,
}

/// Round a percentage to two decimal places.
#[inline]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_label() {
        assert_eq!(normalize_label("  Cash And Cash Equivalents \t"), "cash and cash equivalents");
        assert_eq!(normalize_label("TOTAL DEBT"), normalize_label("total debt "));
    }

    #[test]
    fn test_category_parse_roundtrip_names() {
        for category in CRITICAL_CATEGORIES.iter().chain([BaselCategory::Level2aHqla].iter()) {
            assert_eq!(&BaselCategory::parse(category.as_str()), category);
        }
        assert_eq!(BaselCategory::parse(" level_1_hqla "), BaselCategory::Level1Hqla);
        assert_eq!(
            BaselCategory::parse("Wholesale_Funding"),
            BaselCategory::Other("wholesale_funding".to_string())
        );
        assert_eq!(
            BaselCategory::parse(" WHOLESALE_FUNDING"),
            BaselCategory::parse("wholesale_funding")
        );
    }

    #[test]
    fn test_bucket_mapping_sums_and_defaults() {
        let buckets: BucketMapping = vec![
            (BaselCategory::Level1Hqla, 100.0),
            (BaselCategory::Level1Hqla, 50.0),
            (BaselCategory::RetailStable, 10.0),
        ]
        .into_iter()
        .collect();

        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets.get(&BaselCategory::Level1Hqla), 150.0);
        assert_eq!(buckets.get(&BaselCategory::EquityCapital), 0.0);
        assert_eq!(buckets.amount(&BaselCategory::EquityCapital), None);
        assert_eq!(
            buckets.missing(&CRITICAL_CATEGORIES),
            vec![BaselCategory::EquityCapital, BaselCategory::LoansToRetail]
        );
    }

    #[test]
    fn test_mapping_table_dedup() {
        let table = MappingTable::from_rows(vec![
            MappingRow {
                external_label: "Cash Financial".to_string(),
                category: BaselCategory::Level1Hqla,
            },
            MappingRow {
                external_label: " cash financial".to_string(),
                category: BaselCategory::Level1Hqla,
            },
            MappingRow {
                external_label: "Cash Financial".to_string(),
                category: BaselCategory::Other("Cash".to_string()),
            },
        ]);

        assert_eq!(table.len(), 2);
        assert_eq!(table.categories_for("cash financial").len(), 2);
        assert!(table.categories_for("Cash Financial").is_empty());
    }

    #[test]
    fn test_bucket_mapping_serializes_as_map() {
        let buckets: BucketMapping = vec![(BaselCategory::RetailStable, 1000.0)]
            .into_iter()
            .collect();
        let json = serde_json::to_string(&buckets).unwrap();
        assert_eq!(json, r#"{"Retail_Stable":1000.0}"#);

        let back: BucketMapping = serde_json::from_str(&json).unwrap();
        assert_eq!(back, buckets);
    }

    #[test]
    fn test_stress_validation() {
        assert!(StressScenario::new(1.0, 1.0).is_ok());
        assert!(StressScenario::new(3.0, 2.0).is_ok());
        assert!(matches!(
            StressScenario::new(0.9, 1.0),
            Err(Error::InvalidStress { name: "runoff_stress", .. })
        ));
        assert!(StressScenario::new(1.0, f64::NAN).is_err());
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(154.41176470588235), 154.41);
        assert_eq!(round2(570.0000000001), 570.0);
    }

    #[test]
    fn test_fallback_reason_from_error() {
        let reason = FallbackReason::from(Error::mapping_resource("no such file"));
        assert!(matches!(reason, FallbackReason::ResourceUnavailable { .. }));
        assert_eq!(
            FallbackReason::from(Error::MappingIncomplete {
                missing: vec![BaselCategory::EquityCapital]
            })
            .to_string(),
            "critical categories missing (Equity_Capital)"
        );
    }
}
