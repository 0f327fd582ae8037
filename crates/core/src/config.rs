//! Configuration structures for the liquidity engine.
//!
//! Only `regulatory_settings.lcr.run_off_rates.retail_stable` is required;
//! every other section falls back to its `Default`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::types::{BaselCategory, CRITICAL_CATEGORIES};

/// Dotted paths that must be present in every configuration document.
const REQUIRED_PATHS: &[&str] = &["regulatory_settings.lcr.run_off_rates.retail_stable"];

/// Main configuration for the liquidity engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Baseline regulatory rates.
    pub regulatory_settings: RegulatorySettings,
    /// Mapping table location and critical bucket set.
    #[serde(default)]
    pub mapping: MappingConfig,
    /// Fallback estimator parameters.
    #[serde(default)]
    pub fallback: FallbackConfig,
    /// Compliance band thresholds.
    #[serde(default)]
    pub thresholds: ThresholdConfig,
    /// Default stress grid for sensitivity sweeps.
    #[serde(default)]
    pub sensitivity: SensitivityConfig,
}

impl Config {
    /// Configuration with the given retail run-off rate and default sections.
    pub fn with_retail_stable(retail_stable: f64) -> Self {
        Self {
            regulatory_settings: RegulatorySettings::new(retail_stable),
            mapping: MappingConfig::default(),
            fallback: FallbackConfig::default(),
            thresholds: ThresholdConfig::default(),
            sensitivity: SensitivityConfig::default(),
        }
    }

    /// Load from a YAML or JSON file, chosen by extension (YAML otherwise).
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::from_json_str(&contents),
            _ => Self::from_yaml_str(&contents),
        }
    }

    pub fn from_yaml_str(contents: &str) -> Result<Self> {
        let value: Value = serde_yaml::from_str(contents)?;
        Self::from_value(value)
    }

    pub fn from_json_str(contents: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(contents)?;
        Self::from_value(value)
    }

    fn from_value(value: Value) -> Result<Self> {
        for path in REQUIRED_PATHS {
            if lookup(&value, path).map_or(true, Value::is_null) {
                return Err(Error::configuration_missing(*path));
            }
        }
        let config: Config = serde_json::from_value(value)?;
        config.validate()?;
        Ok(config)
    }

    /// Range-check every section.
    pub fn validate(&self) -> Result<()> {
        self.regulatory_settings.validate()?;
        self.mapping.validate()?;
        self.fallback.validate()?;
        self.thresholds.validate()?;
        self.sensitivity.validate()
    }
}

fn lookup<'a>(value: &'a Value, dotted: &str) -> Option<&'a Value> {
    dotted
        .split('.')
        .try_fold(value, |node, key| node.as_object()?.get(key))
}

fn check_fraction(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(Error::invalid_config(format!(
            "{name} must be a fraction in [0, 1], got {value}"
        )))
    }
}

/// Baseline regulatory rates, passed explicitly into the ratio calculator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegulatorySettings {
    pub lcr: LcrSettings,
}

impl RegulatorySettings {
    pub fn new(retail_stable: f64) -> Self {
        Self {
            lcr: LcrSettings {
                run_off_rates: RunOffRates { retail_stable },
            },
        }
    }

    /// Baseline run-off rate for stable retail deposits.
    #[inline]
    pub fn retail_stable_run_off(&self) -> f64 {
        self.lcr.run_off_rates.retail_stable
    }

    pub fn validate(&self) -> Result<()> {
        check_fraction(
            "regulatory_settings.lcr.run_off_rates.retail_stable",
            self.retail_stable_run_off(),
        )
    }
}

/// LCR baseline settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LcrSettings {
    pub run_off_rates: RunOffRates,
}

/// Baseline run-off rates per funding source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunOffRates {
    /// Fraction of stable retail deposits withdrawn (e.g. 0.05).
    pub retail_stable: f64,
}

/// Mapping table configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MappingConfig {
    /// Path of the label mapping CSV.
    pub table_path: PathBuf,
    /// Categories that must all be present to accept a reconciliation.
    pub critical_categories: Vec<BaselCategory>,
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            table_path: PathBuf::from("data/mapping/bank_map.csv"),
            critical_categories: CRITICAL_CATEGORIES.to_vec(),
        }
    }
}

impl MappingConfig {
    pub fn validate(&self) -> Result<()> {
        if self.critical_categories.is_empty() {
            return Err(Error::invalid_config(
                "mapping.critical_categories must not be empty",
            ));
        }
        Ok(())
    }
}

/// Fallback estimator configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackConfig {
    /// Scale anchor used when the statement has no usable amount.
    pub default_scale: f64,
    /// Bucket sizes as fractions of the scale anchor.
    pub fractions: FallbackFractions,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            default_scale: 1_000_000.0,
            fractions: FallbackFractions::default(),
        }
    }
}

impl FallbackConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.default_scale.is_finite() && self.default_scale > 0.0) {
            return Err(Error::invalid_config(format!(
                "fallback.default_scale must be positive, got {}",
                self.default_scale
            )));
        }
        for (category, fraction) in self.fractions.entries() {
            check_fraction(&format!("fallback.fractions.{category}"), fraction)?;
        }
        Ok(())
    }
}

/// Per-bucket fractions of the scale anchor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackFractions {
    pub level_1_hqla: f64,
    pub level_2a_hqla: f64,
    pub retail_stable: f64,
    pub equity_capital: f64,
    pub loans_to_retail: f64,
}

impl Default for FallbackFractions {
    fn default() -> Self {
        Self {
            level_1_hqla: 0.18,
            level_2a_hqla: 0.04,
            retail_stable: 0.70,
            equity_capital: 0.12,
            loans_to_retail: 0.75,
        }
    }
}

impl FallbackFractions {
    /// (category, fraction) pairs in a fixed order.
    pub fn entries(&self) -> [(BaselCategory, f64); 5] {
        [
            (BaselCategory::Level1Hqla, self.level_1_hqla),
            (BaselCategory::Level2aHqla, self.level_2a_hqla),
            (BaselCategory::RetailStable, self.retail_stable),
            (BaselCategory::EquityCapital, self.equity_capital),
            (BaselCategory::LoansToRetail, self.loans_to_retail),
        ]
    }
}

/// Compliance band thresholds, in percent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    /// LCR below this is a breach.
    pub lcr_minimum: f64,
    /// LCR below this (and above the minimum) is on watch.
    pub lcr_buffer: f64,
    /// NSFR below this is a breach.
    pub nsfr_minimum: f64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            lcr_minimum: 100.0,
            lcr_buffer: 120.0,
            nsfr_minimum: 100.0,
        }
    }
}

impl ThresholdConfig {
    pub fn validate(&self) -> Result<()> {
        let all_positive = [self.lcr_minimum, self.lcr_buffer, self.nsfr_minimum]
            .iter()
            .all(|v| v.is_finite() && *v > 0.0);
        if !all_positive {
            return Err(Error::invalid_config("thresholds must be positive"));
        }
        if self.lcr_buffer < self.lcr_minimum {
            return Err(Error::invalid_config(format!(
                "thresholds.lcr_buffer ({}) must not be below thresholds.lcr_minimum ({})",
                self.lcr_buffer, self.lcr_minimum
            )));
        }
        Ok(())
    }
}

/// Inclusive, evenly spaced range of stress multipliers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StressRange {
    pub start: f64,
    pub end: f64,
    /// Number of points, including both ends.
    pub steps: usize,
}

impl StressRange {
    pub fn new(start: f64, end: f64, steps: usize) -> Self {
        Self { start, end, steps }
    }

    pub fn validate(&self, name: &str) -> Result<()> {
        if !(self.start.is_finite() && self.end.is_finite()) || self.start < 1.0 {
            return Err(Error::invalid_config(format!(
                "{name} must start at a finite multiplier >= 1.0"
            )));
        }
        if self.end < self.start {
            return Err(Error::invalid_config(format!(
                "{name} end ({}) is below start ({})",
                self.end, self.start
            )));
        }
        if self.steps == 0 {
            return Err(Error::invalid_config(format!("{name} needs at least one step")));
        }
        Ok(())
    }

    /// Grid points from `start` to `end`. A single step yields `start`.
    pub fn values(&self) -> Vec<f64> {
        if self.steps == 1 {
            return vec![self.start];
        }
        let width = (self.end - self.start) / (self.steps - 1) as f64;
        (0..self.steps)
            .map(|i| {
                if i == self.steps - 1 {
                    self.end
                } else {
                    self.start + width * i as f64
                }
            })
            .collect()
    }
}

/// Default sensitivity grid, matching the dashboard slider ranges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensitivityConfig {
    pub runoff: StressRange,
    pub haircut: StressRange,
}

impl Default for SensitivityConfig {
    fn default() -> Self {
        Self {
            runoff: StressRange::new(1.0, 3.0, 5),
            haircut: StressRange::new(1.0, 2.0, 5),
        }
    }
}

impl SensitivityConfig {
    pub fn validate(&self) -> Result<()> {
        self.runoff.validate("sensitivity.runoff")?;
        self.haircut.validate("sensitivity.haircut")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const MINIMAL_YAML: &str = "
regulatory_settings:
  lcr:
    run_off_rates:
      retail_stable: 0.05
";

    #[test]
    fn test_default_sections() {
        let config = Config::with_retail_stable(0.05);
        assert_eq!(config.fallback.fractions.level_1_hqla, 0.18);
        assert_eq!(config.fallback.default_scale, 1_000_000.0);
        assert_eq!(config.thresholds.lcr_buffer, 120.0);
        assert_eq!(config.mapping.critical_categories.len(), 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_minimal_yaml() {
        let config = Config::from_yaml_str(MINIMAL_YAML).unwrap();
        assert_eq!(config.regulatory_settings.retail_stable_run_off(), 0.05);
        assert_eq!(config.mapping, MappingConfig::default());
    }

    #[test]
    fn test_missing_rate_is_fatal() {
        let yaml = "
regulatory_settings:
  lcr:
    run_off_rates:
      retail_less_stable: 0.10
";
        let err = Config::from_yaml_str(yaml).unwrap_err();
        match err {
            Error::ConfigurationMissing(path) => {
                assert_eq!(path, "regulatory_settings.lcr.run_off_rates.retail_stable")
            }
            other => panic!("unexpected error: {other}"),
        }

        let err = Config::from_yaml_str("other_settings: {}").unwrap_err();
        assert!(matches!(err, Error::ConfigurationMissing(_)));
    }

    #[test]
    fn test_null_rate_is_missing() {
        let yaml = "
regulatory_settings:
  lcr:
    run_off_rates:
      retail_stable: ~
";
        assert!(matches!(
            Config::from_yaml_str(yaml),
            Err(Error::ConfigurationMissing(_))
        ));
    }

    #[test]
    fn test_out_of_range_rate() {
        let json = r#"{"regulatory_settings":{"lcr":{"run_off_rates":{"retail_stable":1.5}}}}"#;
        assert!(matches!(
            Config::from_json_str(json),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_partial_override() {
        let yaml = format!(
            "{MINIMAL_YAML}
fallback:
  fractions:
    level_1_hqla: 0.2
thresholds:
  lcr_buffer: 130.0
"
        );
        let config = Config::from_yaml_str(&yaml).unwrap();
        assert_eq!(config.fallback.fractions.level_1_hqla, 0.2);
        assert_eq!(config.fallback.fractions.retail_stable, 0.70);
        assert_eq!(config.thresholds.lcr_buffer, 130.0);
        assert_eq!(config.thresholds.lcr_minimum, 100.0);
    }

    #[test]
    fn test_load_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let yaml_path = dir.path().join("config.yaml");
        std::fs::write(&yaml_path, MINIMAL_YAML).unwrap();
        assert!(Config::load(&yaml_path).is_ok());

        let json_path = dir.path().join("config.json");
        std::fs::write(
            &json_path,
            r#"{"regulatory_settings":{"lcr":{"run_off_rates":{"retail_stable":0.1}}}}"#,
        )
        .unwrap();
        assert_eq!(
            Config::load(&json_path).unwrap().regulatory_settings.retail_stable_run_off(),
            0.1
        );

        assert!(matches!(
            Config::load(dir.path().join("absent.yaml")),
            Err(Error::Io(_))
        ));
    }

    #[test]
    fn test_stress_range_values() {
        let values = StressRange::new(1.0, 3.0, 5).values();
        assert_eq!(values.len(), 5);
        assert_relative_eq!(values[1], 1.5);
        assert_eq!(values[4], 3.0);
        assert_eq!(StressRange::new(2.0, 2.0, 1).values(), vec![2.0]);
        assert!(StressRange::new(0.5, 2.0, 3).validate("r").is_err());
        assert!(StressRange::new(2.0, 1.0, 3).validate("r").is_err());
    }

    #[test]
    fn test_threshold_ordering() {
        let thresholds = ThresholdConfig {
            lcr_minimum: 120.0,
            lcr_buffer: 100.0,
            nsfr_minimum: 100.0,
        };
        assert!(thresholds.validate().is_err());
    }
}
