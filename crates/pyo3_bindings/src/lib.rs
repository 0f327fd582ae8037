//! PyO3 bindings for the Basel III liquidity engine.
//!
//! Exposes the Rust engine to the Python dashboard:
//! - Configuration loading
//! - Category mapping with fallback disclosure
//! - LCR / NSFR calculation under stress
//! - Sensitivity grids and full statement assessments

use std::collections::HashMap;
use std::path::PathBuf;

use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;

use liquidity_core::config::{MappingConfig, RegulatorySettings};
use liquidity_core::{
    BaselCategory, BucketMapping, Config as RustConfig, Error, MappedBuckets as RustMappedBuckets,
    RatioResult as RustRatioResult, RawLineItem, StressScenario,
};
use liquidity_ingestion::{CsvMappingSource, StatementReader};
use liquidity_ratios::{sweep, Assessor, RatioCalculator, SensitivityGrid};

// ============================================================================
// Error Mapping
// ============================================================================

/// Bad inputs become `ValueError`; data and I/O problems `RuntimeError`.
fn to_py_err(err: Error) -> PyErr {
    match err {
        Error::ConfigurationMissing(_)
        | Error::InvalidConfig(_)
        | Error::InvalidStress { .. }
        | Error::MalformedInput(_) => PyValueError::new_err(err.to_string()),
        _ => PyRuntimeError::new_err(err.to_string()),
    }
}

fn buckets_from_py(buckets: HashMap<String, f64>) -> BucketMapping {
    buckets
        .into_iter()
        .map(|(name, amount)| (BaselCategory::from(name), amount))
        .collect()
}

fn buckets_to_py(buckets: &BucketMapping) -> HashMap<String, f64> {
    buckets
        .iter()
        .map(|(category, amount)| (category.as_str().to_string(), *amount))
        .collect()
}

fn calculator_for(retail_stable_run_off: f64) -> PyResult<RatioCalculator> {
    RatioCalculator::new(RegulatorySettings::new(retail_stable_run_off)).map_err(to_py_err)
}

// ============================================================================
// Python-exposed Types
// ============================================================================

/// Engine configuration loaded from YAML or JSON.
#[pyclass(name = "Config")]
#[derive(Clone)]
pub struct LiquidityConfig {
    inner: RustConfig,
}

#[pymethods]
impl LiquidityConfig {
    #[getter]
    fn retail_stable_run_off(&self) -> f64 {
        self.inner.regulatory_settings.retail_stable_run_off()
    }

    #[getter]
    fn mapping_path(&self) -> String {
        self.inner.mapping.table_path.display().to_string()
    }

    #[getter]
    fn lcr_minimum(&self) -> f64 {
        self.inner.thresholds.lcr_minimum
    }

    #[getter]
    fn lcr_buffer(&self) -> f64 {
        self.inner.thresholds.lcr_buffer
    }

    #[getter]
    fn nsfr_minimum(&self) -> f64 {
        self.inner.thresholds.nsfr_minimum
    }

    fn __repr__(&self) -> String {
        format!(
            "Config(retail_stable_run_off={}, mapping_path='{}')",
            self.retail_stable_run_off(),
            self.mapping_path()
        )
    }
}

/// Basel buckets produced by the category mapper.
#[pyclass]
#[derive(Clone)]
pub struct MappedBuckets {
    #[pyo3(get)]
    pub buckets: HashMap<String, f64>,
    /// True when the buckets are fallback estimates.
    #[pyo3(get)]
    pub is_estimated: bool,
    #[pyo3(get)]
    pub fallback_reason: Option<String>,
    #[pyo3(get)]
    pub unmatched_labels: Vec<String>,
    #[pyo3(get)]
    pub matched_items: usize,
    #[pyo3(get)]
    pub total_items: usize,
}

#[pymethods]
impl MappedBuckets {
    fn __repr__(&self) -> String {
        format!(
            "MappedBuckets(categories={}, is_estimated={})",
            self.buckets.len(),
            self.is_estimated
        )
    }
}

impl From<RustMappedBuckets> for MappedBuckets {
    fn from(m: RustMappedBuckets) -> Self {
        MappedBuckets {
            buckets: buckets_to_py(&m.buckets),
            is_estimated: m.is_estimated(),
            fallback_reason: m.fallback.as_ref().map(ToString::to_string),
            unmatched_labels: m.stats.unmatched_labels,
            matched_items: m.stats.matched_items,
            total_items: m.stats.total_items,
        }
    }
}

/// LCR and NSFR as percentages rounded to two decimals.
#[pyclass]
#[derive(Clone)]
pub struct RatioResult {
    #[pyo3(get)]
    pub lcr: f64,
    #[pyo3(get)]
    pub nsfr: f64,
}

#[pymethods]
impl RatioResult {
    fn __repr__(&self) -> String {
        format!("RatioResult(lcr={:.2}, nsfr={:.2})", self.lcr, self.nsfr)
    }
}

impl From<RustRatioResult> for RatioResult {
    fn from(r: RustRatioResult) -> Self {
        RatioResult {
            lcr: r.lcr,
            nsfr: r.nsfr,
        }
    }
}

// ============================================================================
// Functions
// ============================================================================

/// Load and validate a configuration file.
#[pyfunction]
fn load_config(path: PathBuf) -> PyResult<LiquidityConfig> {
    let inner = RustConfig::load(&path).map_err(to_py_err)?;
    Ok(LiquidityConfig { inner })
}

/// Map (label, amount) pairs to Basel buckets. Never raises: failures
/// produce fallback estimates flagged with `is_estimated`.
#[pyfunction]
#[pyo3(signature = (items, mapping_path = None))]
fn map_to_buckets(items: Vec<(String, f64)>, mapping_path: Option<PathBuf>) -> MappedBuckets {
    let items: Vec<RawLineItem> = items
        .into_iter()
        .map(|(label, amount)| RawLineItem::new(label, amount))
        .collect();
    let path = mapping_path.unwrap_or_else(|| MappingConfig::default().table_path);
    liquidity_mapping::map_to_buckets(&items, &CsvMappingSource::new(path)).into()
}

/// Stress-adjusted LCR and NSFR for a bucket dict.
#[pyfunction]
#[pyo3(signature = (buckets, retail_stable_run_off, runoff_stress = 1.0, haircut_stress = 1.0))]
fn calculate_ratios(
    buckets: HashMap<String, f64>,
    retail_stable_run_off: f64,
    runoff_stress: f64,
    haircut_stress: f64,
) -> PyResult<RatioResult> {
    liquidity_ratios::calculate_ratios(
        &buckets_from_py(buckets),
        &RegulatorySettings::new(retail_stable_run_off),
        runoff_stress,
        haircut_stress,
    )
    .map(Into::into)
    .map_err(to_py_err)
}

/// LCR grid: one row per run-off value, one column per haircut value.
#[pyfunction]
fn sensitivity_matrix(
    buckets: HashMap<String, f64>,
    retail_stable_run_off: f64,
    runoff_values: Vec<f64>,
    haircut_values: Vec<f64>,
) -> PyResult<Vec<Vec<f64>>> {
    let calculator = calculator_for(retail_stable_run_off)?;
    let grid = SensitivityGrid::new(runoff_values, haircut_values).map_err(to_py_err)?;
    let matrix = sweep(&calculator, &buckets_from_py(buckets), &grid).map_err(to_py_err)?;
    Ok(matrix.rows().map(<[f64]>::to_vec).collect())
}

/// Assess a statement CSV end to end and return the report as JSON.
#[pyfunction]
#[pyo3(signature = (
    statement_path,
    config,
    entity = None,
    runoff_stress = 1.0,
    haircut_stress = 1.0,
    mapping_path = None
))]
fn assess_statement(
    statement_path: PathBuf,
    config: &LiquidityConfig,
    entity: Option<String>,
    runoff_stress: f64,
    haircut_stress: f64,
    mapping_path: Option<PathBuf>,
) -> PyResult<String> {
    let stress = StressScenario::new(runoff_stress, haircut_stress).map_err(to_py_err)?;
    let statement = StatementReader::new()
        .read_path(&statement_path)
        .map_err(to_py_err)?;
    let source = CsvMappingSource::new(
        mapping_path.unwrap_or_else(|| config.inner.mapping.table_path.clone()),
    );
    let entity = entity.unwrap_or_else(|| {
        statement_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    });

    let assessor = Assessor::new(config.inner.clone()).map_err(to_py_err)?;
    let assessment = assessor
        .assess(&entity, &statement, &source, stress)
        .map_err(to_py_err)?;
    assessment
        .report
        .to_json()
        .map_err(|e| PyRuntimeError::new_err(e.to_string()))
}

// ============================================================================
// Module Definition
// ============================================================================

/// Liquidity Engine - Basel III LCR/NSFR components for Python.
#[pymodule]
fn liquidity_engine(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Types
    m.add_class::<LiquidityConfig>()?;
    m.add_class::<MappedBuckets>()?;
    m.add_class::<RatioResult>()?;

    // Functions
    m.add_function(wrap_pyfunction!(load_config, m)?)?;
    m.add_function(wrap_pyfunction!(map_to_buckets, m)?)?;
    m.add_function(wrap_pyfunction!(calculate_ratios, m)?)?;
    m.add_function(wrap_pyfunction!(sensitivity_matrix, m)?)?;
    m.add_function(wrap_pyfunction!(assess_statement, m)?)?;

    Ok(())
}
