//! Stress sensitivity sweeps.
//!
//! A sweep evaluates the ratio calculator over every (run-off, haircut)
//! pair of a grid. Cells are independent, so they are computed in parallel;
//! the output is row-major and does not depend on scheduling.

use std::collections::HashMap;

use liquidity_core::config::{SensitivityConfig, StressRange};
use liquidity_core::{BucketMapping, Error, RatioResult, Result, StressScenario};
use ordered_float::OrderedFloat;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculator::{nsfr, RatioCalculator};

/// Stress grid: rows are run-off multipliers, columns haircut multipliers.
///
/// Both axes are non-empty and hold valid stresses; deserialization goes
/// through [`SensitivityGrid::new`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GridAxes")]
pub struct SensitivityGrid {
    runoff_values: Vec<f64>,
    haircut_values: Vec<f64>,
}

#[derive(Deserialize)]
struct GridAxes {
    runoff_values: Vec<f64>,
    haircut_values: Vec<f64>,
}

impl TryFrom<GridAxes> for SensitivityGrid {
    type Error = Error;

    fn try_from(axes: GridAxes) -> Result<Self> {
        Self::new(axes.runoff_values, axes.haircut_values)
    }
}

impl SensitivityGrid {
    /// Grid from explicit multiplier lists. Every value must be a valid stress.
    pub fn new(runoff_values: Vec<f64>, haircut_values: Vec<f64>) -> Result<Self> {
        if runoff_values.is_empty() || haircut_values.is_empty() {
            return Err(Error::invalid_config("sensitivity grid needs at least one value per axis"));
        }
        for &runoff in &runoff_values {
            StressScenario::new(runoff, 1.0)?;
        }
        for &haircut in &haircut_values {
            StressScenario::new(1.0, haircut)?;
        }
        Ok(Self {
            runoff_values,
            haircut_values,
        })
    }

    /// Grid spanning two inclusive ranges.
    pub fn from_ranges(runoff: &StressRange, haircut: &StressRange) -> Result<Self> {
        runoff.validate("runoff range")?;
        haircut.validate("haircut range")?;
        Self::new(runoff.values(), haircut.values())
    }

    pub fn from_config(config: &SensitivityConfig) -> Result<Self> {
        Self::from_ranges(&config.runoff, &config.haircut)
    }

    pub fn runoff_values(&self) -> &[f64] {
        &self.runoff_values
    }

    pub fn haircut_values(&self) -> &[f64] {
        &self.haircut_values
    }

    pub fn rows(&self) -> usize {
        self.runoff_values.len()
    }

    pub fn cols(&self) -> usize {
        self.haircut_values.len()
    }

    /// Scenario for a row-major cell index.
    fn scenario(&self, index: usize) -> StressScenario {
        StressScenario {
            runoff_stress: self.runoff_values[index / self.cols()],
            haircut_stress: self.haircut_values[index % self.cols()],
        }
    }
}

/// LCR values over a stress grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityMatrix {
    pub grid: SensitivityGrid,
    /// Row-major LCR values.
    pub lcr: Vec<f64>,
    /// NSFR, identical in every cell.
    pub nsfr: f64,
}

impl SensitivityMatrix {
    /// LCR at (run-off row, haircut column).
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        if row < self.grid.rows() && col < self.grid.cols() {
            self.lcr.get(row * self.grid.cols() + col).copied()
        } else {
            None
        }
    }

    /// LCR rows, one per run-off multiplier.
    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.lcr.chunks(self.grid.cols())
    }

    /// Smallest LCR across the grid.
    pub fn min_lcr(&self) -> f64 {
        self.lcr.iter().copied().fold(f64::INFINITY, f64::min)
    }
}

/// Evaluate LCR over every cell of the grid.
pub fn sweep(
    calculator: &RatioCalculator,
    buckets: &BucketMapping,
    grid: &SensitivityGrid,
) -> Result<SensitivityMatrix> {
    let cells = grid.rows() * grid.cols();
    debug!(rows = grid.rows(), cols = grid.cols(), "running sensitivity sweep");

    let lcr = (0..cells)
        .into_par_iter()
        .map(|index| {
            calculator
                .calculate(buckets, &grid.scenario(index))
                .map(|result| result.lcr)
        })
        .collect::<Result<Vec<f64>>>()?;

    Ok(SensitivityMatrix {
        grid: grid.clone(),
        lcr,
        nsfr: nsfr(buckets).ratio,
    })
}

type StressKey = (OrderedFloat<f64>, OrderedFloat<f64>);

/// Memoized ratios for one bucket mapping across repeated stress queries.
#[derive(Debug, Clone)]
pub struct RatioCache {
    calculator: RatioCalculator,
    buckets: BucketMapping,
    entries: HashMap<StressKey, RatioResult>,
    hits: u64,
    misses: u64,
}

impl RatioCache {
    pub fn new(calculator: RatioCalculator, buckets: BucketMapping) -> Self {
        Self {
            calculator,
            buckets,
            entries: HashMap::new(),
            hits: 0,
            misses: 0,
        }
    }

    /// Cached result for a scenario, computing it on first use.
    pub fn get(&mut self, stress: &StressScenario) -> Result<RatioResult> {
        let key = (
            OrderedFloat(stress.runoff_stress),
            OrderedFloat(stress.haircut_stress),
        );
        if let Some(result) = self.entries.get(&key) {
            self.hits += 1;
            return Ok(*result);
        }
        let result = self.calculator.calculate(&self.buckets, stress)?;
        self.misses += 1;
        self.entries.insert(key, result);
        Ok(result)
    }

    /// Sweep a grid, reusing cached cells and computing the rest in parallel.
    pub fn sweep(&mut self, grid: &SensitivityGrid) -> Result<SensitivityMatrix> {
        let cells = grid.rows() * grid.cols();
        let pending: Vec<StressScenario> = (0..cells)
            .map(|index| grid.scenario(index))
            .filter(|s| {
                !self
                    .entries
                    .contains_key(&(OrderedFloat(s.runoff_stress), OrderedFloat(s.haircut_stress)))
            })
            .collect();

        let computed = pending
            .par_iter()
            .map(|s| self.calculator.calculate(&self.buckets, s).map(|r| (*s, r)))
            .collect::<Result<Vec<_>>>()?;

        self.hits += (cells - computed.len()) as u64;
        self.misses += computed.len() as u64;
        for (s, result) in computed {
            self.entries.insert(
                (OrderedFloat(s.runoff_stress), OrderedFloat(s.haircut_stress)),
                result,
            );
        }

        let lcr = (0..cells)
            .map(|index| {
                let s = grid.scenario(index);
                self.entries
                    .get(&(OrderedFloat(s.runoff_stress), OrderedFloat(s.haircut_stress)))
                    .map(|r| r.lcr)
                    .unwrap_or_default()
            })
            .collect();

        Ok(SensitivityMatrix {
            grid: grid.clone(),
            lcr,
            nsfr: nsfr(&self.buckets).ratio,
        })
    }

    /// (hits, misses) since creation.
    pub fn stats(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use liquidity_core::config::RegulatorySettings;
    use liquidity_core::BaselCategory;

    fn make_buckets() -> BucketMapping {
        vec![
            (BaselCategory::Level1Hqla, 200.0),
            (BaselCategory::Level2aHqla, 100.0),
            (BaselCategory::RetailStable, 1_000.0),
            (BaselCategory::EquityCapital, 150.0),
            (BaselCategory::LoansToRetail, 800.0),
        ]
        .into_iter()
        .collect()
    }

    fn make_calculator() -> RatioCalculator {
        RatioCalculator::new(RegulatorySettings::new(0.05)).unwrap()
    }

    #[test]
    fn test_sweep_matches_individual_calls() {
        let grid = SensitivityGrid::new(vec![1.0, 2.0, 3.0], vec![1.0, 2.0]).unwrap();
        let calculator = make_calculator();
        let matrix = sweep(&calculator, &make_buckets(), &grid).unwrap();

        assert_eq!(matrix.lcr.len(), 6);
        assert_relative_eq!(matrix.get(0, 0).unwrap(), 570.0, epsilon = 1e-9);
        assert_relative_eq!(matrix.get(0, 1).unwrap(), 540.0, epsilon = 1e-9);
        assert_relative_eq!(matrix.get(1, 0).unwrap(), 285.0, epsilon = 1e-9);
        assert_relative_eq!(matrix.nsfr, 154.41, epsilon = 1e-9);
        assert_eq!(matrix.get(3, 0), None);

        for (row, &runoff) in grid.runoff_values().iter().enumerate() {
            for (col, &haircut) in grid.haircut_values().iter().enumerate() {
                let single = calculator
                    .calculate(&make_buckets(), &StressScenario::new(runoff, haircut).unwrap())
                    .unwrap();
                assert_eq!(matrix.get(row, col), Some(single.lcr));
            }
        }
    }

    #[test]
    fn test_sweep_rows_are_monotone() {
        let grid = SensitivityGrid::from_config(&SensitivityConfig::default()).unwrap();
        let matrix = sweep(&make_calculator(), &make_buckets(), &grid).unwrap();

        assert_eq!(matrix.rows().count(), 5);
        for row in matrix.rows() {
            assert!(row.windows(2).all(|w| w[1] <= w[0]));
        }
        assert_eq!(matrix.min_lcr(), matrix.get(4, 4).unwrap());
    }

    #[test]
    fn test_sweep_is_deterministic() {
        let grid = SensitivityGrid::from_ranges(
            &StressRange::new(1.0, 3.0, 21),
            &StressRange::new(1.0, 2.0, 11),
        )
        .unwrap();
        let a = sweep(&make_calculator(), &make_buckets(), &grid).unwrap();
        let b = sweep(&make_calculator(), &make_buckets(), &grid).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_invalid_grid() {
        assert!(SensitivityGrid::new(vec![], vec![1.0]).is_err());
        assert!(matches!(
            SensitivityGrid::new(vec![0.5], vec![1.0]),
            Err(Error::InvalidStress { .. })
        ));
    }

    #[test]
    fn test_grid_deserialization_is_validated() {
        let grid = SensitivityGrid::new(vec![1.0, 2.0], vec![1.5]).unwrap();
        let json = serde_json::to_string(&grid).unwrap();
        let back: SensitivityGrid = serde_json::from_str(&json).unwrap();
        assert_eq!(back, grid);

        let empty_axis = r#"{"runoff_values":[1.0],"haircut_values":[]}"#;
        assert!(serde_json::from_str::<SensitivityGrid>(empty_axis).is_err());
        let relief = r#"{"runoff_values":[0.5],"haircut_values":[1.0]}"#;
        assert!(serde_json::from_str::<SensitivityGrid>(relief).is_err());
    }

    #[test]
    fn test_cache_hits() {
        let mut cache = RatioCache::new(make_calculator(), make_buckets());
        let stress = StressScenario::new(1.0, 2.0).unwrap();

        let first = cache.get(&stress).unwrap();
        let second = cache.get(&stress).unwrap();
        assert_eq!(first, second);
        assert_eq!(cache.stats(), (1, 1));

        let grid = SensitivityGrid::new(vec![1.0], vec![1.0, 2.0]).unwrap();
        let matrix = cache.sweep(&grid).unwrap();
        assert_relative_eq!(matrix.get(0, 1).unwrap(), 540.0, epsilon = 1e-9);
        assert_eq!(cache.stats(), (2, 2));
        assert_eq!(cache.len(), 2);
    }
}
