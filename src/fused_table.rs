//! # Fused table
//!
//! Aligned collection of named `f64` columns co-indexed with the master time index.
//!
//! ## Invariants
//!
//! * Every column holds exactly `index.len()` values. Constructors and column setters
//!   reject anything else with [`FusionError::RaggedColumn`].
//! * Tables are plain owned values. Selection and editing build **new** tables; the
//!   only in-place updates are the explicit ones ([`FusedTable::set_column`] and the
//!   `apply_inplace` path of [`crate::editing::TableOperator`]).
//!
//! ## Output
//!
//! * [`FusedTable::write_csv`] – one row per index entry, first column `timestamp`.
//! * [`FusedTable::summary`] / [`FusedTable::write_summary_csv`] – per column statistics.
//! * [`std::fmt::Display`] – the summary rendered as a `comfy-table` table.
//!
//! ## See also
//! ------------
//! * [`crate::fusion::fuse`] – builds a table from raw telemetry and autopilot logs.
//! * [`crate::editing`] – operators producing new or updated tables.
use std::collections::BTreeMap;
use std::fmt;
use std::io::Write;

use camino::Utf8Path;
use comfy_table::{presets::UTF8_FULL, Cell, CellAlignment, ContentArrangement, Row, Table};
use hifitime::Epoch;
use serde::Serialize;

use crate::constants::Seconds;
use crate::fusion_errors::FusionError;
use crate::time::elapsed_seconds;

/// Named columns sharing one time index.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FusedTable {
    index: Vec<Epoch>,
    columns: BTreeMap<String, Vec<f64>>,
}

/// Statistics of one column, NaN values excluded from `min`, `max` and `mean`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSummary {
    pub column: String,
    pub count: usize,
    pub nan_count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}

impl ColumnSummary {
    fn from_values(column: &str, values: &[f64]) -> Self {
        let valid: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
        let (min, max, mean) = if valid.is_empty() {
            (f64::NAN, f64::NAN, f64::NAN)
        } else {
            (
                valid.iter().copied().fold(f64::INFINITY, f64::min),
                valid.iter().copied().fold(f64::NEG_INFINITY, f64::max),
                valid.iter().sum::<f64>() / valid.len() as f64,
            )
        };
        ColumnSummary {
            column: column.to_string(),
            count: values.len(),
            nan_count: values.len() - valid.len(),
            min,
            max,
            mean,
        }
    }
}

impl FusedTable {
    /// Build a table from an index and its columns.
    ///
    /// Return
    /// ----------
    /// * the table, or [`FusionError::RaggedColumn`] for the first column whose length
    ///   differs from the index length
    pub fn new(index: Vec<Epoch>, columns: BTreeMap<String, Vec<f64>>) -> Result<Self, FusionError> {
        for (name, values) in &columns {
            check_length(name, values, index.len())?;
        }
        Ok(FusedTable { index, columns })
    }

    /// A table with an index and no column.
    pub fn with_index(index: Vec<Epoch>) -> Self {
        FusedTable {
            index,
            columns: BTreeMap::new(),
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn index(&self) -> &[Epoch] {
        &self.index
    }

    pub fn has_column(&self, key: &str) -> bool {
        self.columns.contains_key(key)
    }

    /// Column names in lexicographic order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.keys().map(String::as_str)
    }

    pub fn columns(&self) -> &BTreeMap<String, Vec<f64>> {
        &self.columns
    }

    /// Values of a column, [`FusionError::UnknownColumn`] if absent.
    pub fn column(&self, key: &str) -> Result<&[f64], FusionError> {
        self.columns
            .get(key)
            .map(Vec::as_slice)
            .ok_or_else(|| FusionError::UnknownColumn(key.to_string()))
    }

    /// Add or replace a column in place.
    pub fn set_column(&mut self, key: &str, values: Vec<f64>) -> Result<(), FusionError> {
        check_length(key, &values, self.len())?;
        self.columns.insert(key.to_string(), values);
        Ok(())
    }

    /// Copy of the table with one column added or replaced.
    pub fn with_column(&self, key: &str, values: Vec<f64>) -> Result<Self, FusionError> {
        let mut table = self.clone();
        table.set_column(key, values)?;
        Ok(table)
    }

    /// Seconds elapsed since the first row.
    pub fn elapsed_seconds(&self) -> Vec<Seconds> {
        elapsed_seconds(&self.index)
    }

    /// New table holding the rows where `mask` is `true`, in the original order.
    ///
    /// Return
    /// ----------
    /// * the selection, or [`FusionError::LengthMismatch`] if `mask` does not have one
    ///   entry per row
    pub fn select_rows(&self, mask: &[bool]) -> Result<Self, FusionError> {
        if mask.len() != self.len() {
            return Err(FusionError::LengthMismatch {
                name: "row mask".into(),
                expected: self.len(),
                actual: mask.len(),
            });
        }
        Ok(self.masked(mask))
    }

    /// Rows with `begin <= t < end`, as a new table.
    ///
    /// Empty, inverted or out-of-range intervals yield a table with zero rows and the
    /// same columns. The source table is left untouched.
    pub fn time_selection(&self, begin: Epoch, end: Epoch) -> Self {
        let mask: Vec<bool> = self.index.iter().map(|t| begin <= *t && *t < end).collect();
        self.masked(&mask)
    }

    fn masked(&self, mask: &[bool]) -> Self {
        FusedTable {
            index: keep_rows(&self.index, mask),
            columns: self
                .columns
                .iter()
                .map(|(name, values)| (name.clone(), keep_rows(values, mask)))
                .collect(),
        }
    }

    /// Per-column statistics, in column name order.
    pub fn summary(&self) -> Vec<ColumnSummary> {
        self.columns
            .iter()
            .map(|(name, values)| ColumnSummary::from_values(name, values))
            .collect()
    }

    /// Write the table as CSV: a `timestamp` column followed by every column.
    pub fn write_csv_to<W: Write>(&self, writer: W) -> Result<(), FusionError> {
        let mut wtr = csv::Writer::from_writer(writer);

        let mut header = vec!["timestamp"];
        header.extend(self.column_names());
        wtr.write_record(&header)?;

        for (row, t) in self.index.iter().enumerate() {
            let mut record = Vec::with_capacity(self.columns.len() + 1);
            record.push(t.to_string());
            record.extend(self.columns.values().map(|v| v[row].to_string()));
            wtr.write_record(&record)?;
        }
        wtr.flush()?;
        Ok(())
    }

    pub fn write_csv(&self, path: &Utf8Path) -> Result<(), FusionError> {
        let file = std::fs::File::create(path)?;
        self.write_csv_to(file)
    }

    /// Write [`FusedTable::summary`] as CSV (one row per column).
    pub fn write_summary_csv(&self, path: &Utf8Path) -> Result<(), FusionError> {
        let mut wtr = csv::Writer::from_path(path)?;
        for summary in self.summary() {
            wtr.serialize(summary)?;
        }
        wtr.flush()?;
        Ok(())
    }
}

fn keep_rows<T: Copy>(values: &[T], mask: &[bool]) -> Vec<T> {
    values
        .iter()
        .zip(mask)
        .filter_map(|(v, m)| m.then_some(*v))
        .collect()
}

fn check_length(name: &str, values: &[f64], expected: usize) -> Result<(), FusionError> {
    if values.len() != expected {
        return Err(FusionError::RaggedColumn {
            name: name.to_string(),
            expected,
            actual: values.len(),
        });
    }
    Ok(())
}

impl fmt::Display for FusedTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.index.first(), self.index.last()) {
            (Some(first), Some(last)) => {
                writeln!(f, "{} rows from {first} to {last}", self.len())?
            }
            _ => writeln!(f, "0 rows")?,
        }

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec![
            Cell::new("Column"),
            Cell::new("Count"),
            Cell::new("NaN"),
            Cell::new("Min"),
            Cell::new("Max"),
            Cell::new("Mean"),
        ]);

        for s in self.summary() {
            table.add_row(Row::from(vec![
                Cell::new(s.column),
                Cell::new(s.count).set_alignment(CellAlignment::Right),
                Cell::new(s.nan_count).set_alignment(CellAlignment::Right),
                Cell::new(format!("{:.6}", s.min)).set_alignment(CellAlignment::Right),
                Cell::new(format!("{:.6}", s.max)).set_alignment(CellAlignment::Right),
                Cell::new(format!("{:.6}", s.mean)).set_alignment(CellAlignment::Right),
            ]));
        }

        write!(f, "{table}")
    }
}
