//! Row-by-row traversal of a fused table.
//!
//! A [`TableCursor`] keeps a current row and exposes the history up to it, e.g. to
//! replay a flight sample by sample.
use hifitime::Epoch;

use crate::fused_table::FusedTable;
use crate::fusion_errors::FusionError;

#[derive(Debug, Clone)]
pub struct TableCursor<'a> {
    table: &'a FusedTable,
    position: usize,
}

impl<'a> TableCursor<'a> {
    /// Cursor on the first row of `table`.
    pub fn new(table: &'a FusedTable) -> Self {
        TableCursor { table, position: 0 }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn reset(&mut self) {
        self.position = 0;
    }

    /// Move to the next row.
    ///
    /// On the last row the cursor wraps to the first one when `looping` is set, otherwise
    /// it stays in place and `false` is returned. An empty table never moves.
    pub fn advance(&mut self, looping: bool) -> bool {
        if self.position + 1 < self.table.len() {
            self.position += 1;
            true
        } else if looping && !self.table.is_empty() {
            self.position = 0;
            true
        } else {
            false
        }
    }

    /// Timestamp of the current row, `None` for an empty table.
    pub fn current_time(&self) -> Option<Epoch> {
        self.table.index().get(self.position).copied()
    }

    /// Value of a column at the current row.
    pub fn current_value(&self, key: &str) -> Result<f64, FusionError> {
        self.table
            .column(key)?
            .get(self.position)
            .copied()
            .ok_or(FusionError::EmptySeries)
    }

    /// Values of a column on the rows before the current one.
    pub fn past_values(&self, key: &str) -> Result<&'a [f64], FusionError> {
        Ok(&self.table.column(key)?[..self.position])
    }

    /// Timestamps of the rows before the current one.
    pub fn past_times(&self) -> &'a [Epoch] {
        &self.table.index()[..self.position]
    }
}
