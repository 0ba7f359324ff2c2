//! Table comparison report
//!
//! Field names are part of the JSON output and should stay stable.

use crate::value::Value;
use serde::Serialize;
use std::collections::BTreeMap;

/// One differing row of one column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowDiff {
    /// Row label (from the left table's index)
    pub row: String,

    /// Zero-based position in the left table
    pub position: usize,

    /// Value in the left table
    pub left: Value,

    /// Value in the right table
    pub right: Value,
}

impl RowDiff {
    pub fn new(row: impl Into<String>, position: usize, left: Value, right: Value) -> Self {
        Self {
            row: row.into(),
            position,
            left,
            right,
        }
    }
}

/// Result of comparing two tables
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct DiffReport {
    /// Row or column counts differ
    pub shape_mismatch: bool,

    /// Column name sets differ
    pub columns_mismatch: bool,

    /// Row indexes differ
    pub index_mismatch: bool,

    /// Numeric columns: rows outside tolerance
    pub numeric_diffs: BTreeMap<String, Vec<RowDiff>>,

    /// Non-numeric columns: rows that are not exactly equal
    pub non_numeric_diffs: BTreeMap<String, Vec<RowDiff>>,
}

impl DiffReport {
    /// Create an empty report
    pub fn new() -> Self {
        Self::default()
    }

    /// True when the tables are equivalent within tolerance
    pub fn is_equivalent(&self) -> bool {
        !self.shape_mismatch
            && !self.columns_mismatch
            && !self.index_mismatch
            && self.numeric_diffs.is_empty()
            && self.non_numeric_diffs.is_empty()
    }

    /// Total number of differing cells
    pub fn diff_count(&self) -> usize {
        self.numeric_diffs.values().map(Vec::len).sum::<usize>()
            + self.non_numeric_diffs.values().map(Vec::len).sum::<usize>()
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Save to file
    pub fn save_to_file(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let json = self.to_json().map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }
}
