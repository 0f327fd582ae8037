//! Balance-sheet statement reader.
//!
//! Accepts either a long CSV (`label,amount`) or a wide CSV whose first
//! column holds line-item labels and whose remaining columns are reporting
//! periods. For wide files the most recent period is selected.

use std::io::Read;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use liquidity_core::{Error, RawLineItem, Result};
use tracing::debug;

/// Line items for a single reporting period.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    /// Reporting period, when the column header was a date.
    pub period: Option<NaiveDate>,
    /// Header of the column the amounts were read from.
    pub column: String,
    /// Line items in file order.
    pub items: Vec<RawLineItem>,
    /// Rows dropped because the amount cell was empty or not a number.
    pub skipped_rows: usize,
}

/// CSV statement reader.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatementReader;

impl StatementReader {
    pub fn new() -> Self {
        Self
    }

    /// Read a statement file. Any failure is reported as data unavailability.
    pub fn read_path(&self, path: impl AsRef<Path>) -> Result<Statement> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|e| {
            Error::data_unavailable(format!("cannot open statement {}: {e}", path.display()))
        })?;
        self.read(file)
            .map_err(|e| match e {
                Error::DataUnavailable(msg) => {
                    Error::data_unavailable(format!("{}: {msg}", path.display()))
                }
                other => other,
            })
    }

    /// Read a statement from any CSV source.
    pub fn read<R: Read>(&self, source: R) -> Result<Statement> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::Headers)
            .from_reader(source);

        let headers = reader
            .headers()
            .map_err(|e| Error::data_unavailable(format!("unreadable header: {e}")))?
            .clone();
        if headers.len() < 2 {
            return Err(Error::data_unavailable(
                "statement needs a label column and at least one amount column",
            ));
        }

        let (column, period) = select_period_column(&headers);
        let column_name = headers.get(column).unwrap_or_default().to_string();
        debug!(column = %column_name, ?period, "selected statement period column");

        let mut items = Vec::new();
        let mut skipped_rows = 0;
        for record in reader.records() {
            let record =
                record.map_err(|e| Error::data_unavailable(format!("unreadable row: {e}")))?;
            let label = match record.get(0) {
                Some(label) if !label.trim().is_empty() => label,
                _ => continue,
            };
            match record.get(column).and_then(parse_amount) {
                Some(amount) => items.push(RawLineItem::new(label, amount)),
                None => {
                    debug!(label, "skipping statement row without a usable amount");
                    skipped_rows += 1;
                }
            }
        }

        if items.is_empty() {
            return Err(Error::data_unavailable("statement contains no line items"));
        }

        Ok(Statement {
            period,
            column: column_name,
            items,
            skipped_rows,
        })
    }
}

/// Pick the amount column: the latest dated column, else the first one.
fn select_period_column(headers: &csv::StringRecord) -> (usize, Option<NaiveDate>) {
    headers
        .iter()
        .enumerate()
        .skip(1)
        .filter_map(|(idx, header)| parse_period(header).map(|date| (idx, date)))
        // Earliest index wins among equal dates.
        .max_by(|a, b| a.1.cmp(&b.1).then(b.0.cmp(&a.0)))
        .map(|(idx, date)| (idx, Some(date)))
        .unwrap_or((1, None))
}

fn parse_period(header: &str) -> Option<NaiveDate> {
    let header = header.trim();
    NaiveDate::parse_from_str(header, "%Y-%m-%d")
        .or_else(|_| NaiveDateTime::parse_from_str(header, "%Y-%m-%d %H:%M:%S").map(|dt| dt.date()))
        .ok()
}

fn parse_amount(cell: &str) -> Option<f64> {
    let cell = cell.trim();
    if cell.is_empty() {
        return None;
    }
    // Quoted cells may carry thousands separators.
    cell.replace(',', "")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}
