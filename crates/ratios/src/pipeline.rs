//! Statement-to-report assessment pipeline.
//!
//! Runs statement → category mapper → ratio calculator and assembles the
//! report. Configuration and stress problems and an empty statement are
//! returned as errors before any mapping happens; mapping problems are
//! absorbed by the mapper's fallback and show up as `is_estimated`.

use liquidity_core::{Config, Error, MappedBuckets, RatioResult, Result, StressScenario};
use liquidity_ingestion::{MappingSource, Statement};
use liquidity_mapping::CategoryMapper;
use tracing::info;

use crate::calculator::RatioCalculator;
use crate::compliance::ComplianceAssessment;
use crate::report::LiquidityReport;
use crate::sensitivity::{sweep, SensitivityGrid, SensitivityMatrix};

/// Output of one assessment.
#[derive(Debug, Clone)]
pub struct Assessment {
    pub mapped: MappedBuckets,
    pub ratios: RatioResult,
    pub report: LiquidityReport,
}

/// Wires a mapper and calculator from one configuration.
#[derive(Debug, Clone)]
pub struct Assessor {
    config: Config,
    mapper: CategoryMapper,
    calculator: RatioCalculator,
}

impl Assessor {
    /// Build from a configuration; fails if the configuration is invalid.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let mapper = CategoryMapper::from_config(&config);
        let calculator = RatioCalculator::new(config.regulatory_settings.clone())?;
        Ok(Self {
            config,
            mapper,
            calculator,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn calculator(&self) -> &RatioCalculator {
        &self.calculator
    }

    /// Map a statement, rejecting one with no line items.
    pub fn map_statement(
        &self,
        statement: &Statement,
        source: &dyn MappingSource,
    ) -> Result<MappedBuckets> {
        if statement.items.is_empty() {
            return Err(Error::data_unavailable("statement contains no line items"));
        }
        Ok(self.mapper.map(&statement.items, source))
    }

    /// Full assessment for one stress scenario.
    pub fn assess(
        &self,
        entity: &str,
        statement: &Statement,
        source: &dyn MappingSource,
        stress: StressScenario,
    ) -> Result<Assessment> {
        stress.validate()?;
        let mapped = self.map_statement(statement, source)?;
        let ratios = self.calculator.calculate(&mapped.buckets, &stress)?;
        let compliance = ComplianceAssessment::new(&ratios, &self.config.thresholds);

        info!(
            entity,
            lcr = ratios.lcr,
            nsfr = ratios.nsfr,
            estimated = mapped.is_estimated(),
            "assessment complete"
        );

        let report =
            LiquidityReport::new(entity, statement.period, &mapped, stress, ratios, compliance);
        Ok(Assessment {
            mapped,
            ratios,
            report,
        })
    }

    /// Map a statement once and sweep the LCR over a stress grid.
    pub fn sensitivity(
        &self,
        statement: &Statement,
        source: &dyn MappingSource,
        grid: &SensitivityGrid,
    ) -> Result<(MappedBuckets, SensitivityMatrix)> {
        let mapped = self.map_statement(statement, source)?;
        let matrix = sweep(&self.calculator, &mapped.buckets, grid)?;
        Ok((mapped, matrix))
    }
}
