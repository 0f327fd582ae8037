//! Output formatting utilities.

use liquidity_core::MappedBuckets;
use liquidity_ratios::{Assessment, SensitivityMatrix};
use serde::Serialize;
use tabled::{
    builder::Builder,
    settings::{object::Columns, Alignment, Modify, Style},
    Table, Tabled,
};

use crate::cli::OutputFormat;

/// A key-value pair for display.
#[derive(Debug, Clone, Serialize, Tabled)]
pub struct KeyValue {
    #[tabled(rename = "Metric")]
    pub key: String,
    #[tabled(rename = "Value")]
    pub value: String,
}

impl KeyValue {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Prints rows as a rounded table.
pub fn print_table<T: Tabled>(data: &[T]) {
    if data.is_empty() {
        println!("No results.");
        return;
    }

    let table = Table::new(data)
        .with(Style::rounded())
        .with(Modify::new(Columns::first()).with(Alignment::left()))
        .to_string();

    println!("{}", table);
}

pub fn print_success(message: &str) {
    println!("ok: {}", message);
}

pub fn print_warning(message: &str) {
    println!("warning: {}", message);
}

pub fn print_error(message: &str) {
    eprintln!("error: {}", message);
}

fn percent(value: f64) -> String {
    format!("{:.2}%", value)
}

/// Estimated buckets are always disclosed ahead of the figures.
fn disclose_estimate(mapped: &MappedBuckets) {
    if let Some(reason) = &mapped.fallback {
        print_warning(&format!(
            "ESTIMATED: buckets are fallback estimates, not statement data ({})",
            reason
        ));
    }
}

/// Prints an assessment report.
pub fn print_assessment(assessment: &Assessment, format: OutputFormat) -> anyhow::Result<()> {
    let report = &assessment.report;
    if format == OutputFormat::Json {
        println!("{}", report.to_json()?);
        return Ok(());
    }

    disclose_estimate(&assessment.mapped);

    let stats = &assessment.mapped.stats;
    let mut rows = vec![
        KeyValue::new("Entity", report.entity.clone()),
        KeyValue::new(
            "As of",
            report
                .as_of
                .map(|d| d.to_string())
                .unwrap_or_else(|| "-".to_string()),
        ),
        KeyValue::new("Scenario", report.scenario.clone()),
        KeyValue::new("LCR", percent(report.lcr)),
        KeyValue::new("LCR status", report.compliance.lcr.as_str()),
        KeyValue::new("NSFR", percent(report.nsfr)),
        KeyValue::new("NSFR status", report.compliance.nsfr.as_str()),
    ];
    for (category, amount) in report.buckets.iter() {
        rows.push(KeyValue::new(category.as_str(), format!("{:.2}", amount)));
    }
    if !report.is_estimated {
        rows.push(KeyValue::new(
            "Matched items",
            format!(
                "{}/{} ({:.0}%)",
                stats.matched_items,
                stats.total_items,
                stats.match_rate() * 100.0
            ),
        ));
    }

    print_table(&rows);
    Ok(())
}

#[derive(Serialize)]
struct SweepOutput<'a> {
    is_estimated: bool,
    fallback_reason: Option<String>,
    #[serde(flatten)]
    matrix: &'a SensitivityMatrix,
}

/// Prints an LCR sensitivity grid: rows are run-off, columns haircut stress.
pub fn print_sweep(
    mapped: &MappedBuckets,
    matrix: &SensitivityMatrix,
    format: OutputFormat,
) -> anyhow::Result<()> {
    if format == OutputFormat::Json {
        let out = SweepOutput {
            is_estimated: mapped.is_estimated(),
            fallback_reason: mapped.fallback.as_ref().map(ToString::to_string),
            matrix,
        };
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    disclose_estimate(mapped);

    let mut builder = Builder::default();
    let mut header = vec!["run-off \\ haircut".to_string()];
    header.extend(matrix.grid.haircut_values().iter().map(|h| format!("x{:.2}", h)));
    builder.push_record(header);

    for (runoff, row) in matrix.grid.runoff_values().iter().zip(matrix.rows()) {
        let mut record = vec![format!("x{:.2}", runoff)];
        record.extend(row.iter().map(|lcr| percent(*lcr)));
        builder.push_record(record);
    }

    let table = builder.build().with(Style::rounded()).to_string();
    println!("LCR sensitivity");
    println!("{}", table);
    println!("NSFR (stress-invariant): {}", percent(matrix.nsfr));
    Ok(())
}
