//! Label mapping table loading.
//!
//! The mapping table is a two-column CSV pairing statement labels with Basel
//! categories. Any problem reading it is a `MappingResource` error, which the
//! category mapper resolves through its fallback estimator.

use std::borrow::Cow;
use std::io::Read;
use std::path::{Path, PathBuf};

use liquidity_core::{normalize_label, BaselCategory, Error, MappingRow, MappingTable, Result};
use tracing::debug;

/// Accepted header names for the label column (normalized).
const LABEL_HEADERS: &[&str] = &["yahoo_finance_label", "external_label", "label"];
/// Accepted header names for the category column (normalized).
const CATEGORY_HEADERS: &[&str] = &["basel_iii_category", "basel_category", "category"];

/// Something the category mapper can obtain a mapping table from.
pub trait MappingSource {
    /// Load the table. Errors are treated as resource failures by the mapper.
    fn load_table(&self) -> Result<Cow<'_, MappingTable>>;

    /// Short description for diagnostics.
    fn describe(&self) -> String;
}

impl MappingSource for MappingTable {
    fn load_table(&self) -> Result<Cow<'_, MappingTable>> {
        Ok(Cow::Borrowed(self))
    }

    fn describe(&self) -> String {
        format!("in-memory table ({} rows)", self.len())
    }
}

/// Mapping table read from a CSV file on every load.
#[derive(Debug, Clone)]
pub struct CsvMappingSource {
    path: PathBuf,
}

impl CsvMappingSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl MappingSource for CsvMappingSource {
    fn load_table(&self) -> Result<Cow<'_, MappingTable>> {
        load_mapping_table(&self.path).map(Cow::Owned)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Load a mapping table from a CSV file.
pub fn load_mapping_table(path: impl AsRef<Path>) -> Result<MappingTable> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).map_err(|e| {
        Error::mapping_resource(format!("cannot open {}: {e}", path.display()))
    })?;
    parse_mapping_table(file).map_err(|e| match e {
        Error::MappingResource(msg) => {
            Error::mapping_resource(format!("{}: {msg}", path.display()))
        }
        other => other,
    })
}

/// Parse a mapping table from any CSV source.
pub fn parse_mapping_table<R: Read>(source: R) -> Result<MappingTable> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(source);

    let headers = reader
        .headers()
        .map_err(|e| Error::mapping_resource(format!("unreadable header: {e}")))?
        .clone();
    let label_idx = find_column(&headers, LABEL_HEADERS)
        .ok_or_else(|| Error::mapping_resource("no label column in header"))?;
    let category_idx = find_column(&headers, CATEGORY_HEADERS)
        .ok_or_else(|| Error::mapping_resource("no category column in header"))?;

    let mut rows = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record =
            record.map_err(|e| Error::mapping_resource(format!("unreadable row: {e}")))?;
        let label = record.get(label_idx).unwrap_or_default();
        let category = record.get(category_idx).unwrap_or_default();
        match (label.is_empty(), category.is_empty()) {
            (true, true) => continue,
            (false, false) => rows.push(MappingRow {
                external_label: label.to_string(),
                category: BaselCategory::parse(category),
            }),
            // Header is line 1.
            _ => {
                return Err(Error::mapping_resource(format!(
                    "incomplete mapping row at line {}",
                    line + 2
                )))
            }
        }
    }

    let table = MappingTable::from_rows(rows);
    if table.is_empty() {
        return Err(Error::mapping_resource("mapping table has no rows"));
    }
    debug!(rows = table.len(), "loaded mapping table");
    Ok(table)
}

fn find_column(headers: &csv::StringRecord, accepted: &[&str]) -> Option<usize> {
    headers
        .iter()
        .position(|h| accepted.contains(&normalize_label(h).as_str()))
}
