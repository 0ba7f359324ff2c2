//! Table comparison
//!
//! The right table is treated as the one that came back from the foreign
//! runtime: it alone goes through the repair layer. Both sides then have
//! their string NA tokens normalized and their dtypes aligned before any
//! cell is compared.

use crate::normalize::{align_dtypes, common_columns};
use crate::repair::{normalize_table_string_na, repair_table};
use rbridge_core::{Column, Config, DiffReport, RepairConfig, RowDiff, Table, Value};
use std::collections::{HashMap, HashSet};

/// Comparison settings
#[derive(Debug, Clone, PartialEq)]
pub struct CompareOptions {
    /// Absolute tolerance for numeric columns
    pub float_tol: f64,

    /// Whether `index_mismatch` is computed at all
    pub check_index: bool,

    /// Repair applied to the right table
    pub repair: RepairConfig,
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            float_tol: 1e-8,
            check_index: true,
            repair: RepairConfig::default(),
        }
    }
}

impl From<&Config> for CompareOptions {
    fn from(config: &Config) -> Self {
        Self {
            float_tol: config.compare.float_tol,
            check_index: config.compare.check_index,
            repair: config.repair.clone(),
        }
    }
}

/// Compares a native table against a converted foreign table
#[derive(Debug, Clone, Default)]
pub struct TableComparator {
    options: CompareOptions,
}

impl TableComparator {
    pub fn new(options: CompareOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &CompareOptions {
        &self.options
    }

    /// Compare two tables
    ///
    /// Inputs are not modified. Diff entries carry the values as they were
    /// in the inputs, before any repair or normalization.
    pub fn compare(&self, left: &Table, right: &Table) -> DiffReport {
        let tokens = &self.options.repair.na_tokens;

        let repaired = repair_table(right, &self.options.repair);
        let left_norm = normalize_table_string_na(left, tokens);
        let right_norm = normalize_table_string_na(&repaired, tokens);
        let (left_norm, right_norm) = align_dtypes(&left_norm, &right_norm);

        let mut report = DiffReport::new();
        report.shape_mismatch = left_norm.shape() != right_norm.shape();

        let left_names: HashSet<&str> = left_norm.column_names().into_iter().collect();
        let right_names: HashSet<&str> = right_norm.column_names().into_iter().collect();
        report.columns_mismatch = left_names != right_names;

        let left_labels = left_norm.index().labels();
        let right_labels = right_norm.index().labels();
        report.index_mismatch = self.options.check_index && left_labels != right_labels;

        let rows = align_rows(&left_labels, &right_labels);

        for name in common_columns(&left_norm, &right_norm) {
            let (Some(l), Some(r)) = (left_norm.column(name), right_norm.column(name)) else {
                continue;
            };
            let numeric = l.dtype().is_numeric() && r.dtype().is_numeric();

            let diffs: Vec<RowDiff> = rows
                .iter()
                .filter(|&&(i, j)| {
                    let (a, b) = (l.get(i), r.get(j));
                    if numeric {
                        !within_tolerance(&a, &b, self.options.float_tol)
                    } else {
                        !values_equal(&a, &b)
                    }
                })
                .map(|&(i, j)| {
                    RowDiff::new(
                        left_labels[i].clone(),
                        i,
                        original_value(left.column(name), i),
                        original_value(right.column(name), j),
                    )
                })
                .collect();

            if diffs.is_empty() {
                continue;
            }

            tracing::debug!(column = name, rows = diffs.len(), numeric, "Column differs");
            if numeric {
                report.numeric_diffs.insert(name.to_string(), diffs);
            } else {
                report.non_numeric_diffs.insert(name.to_string(), diffs);
            }
        }

        report
    }
}

/// Compare with default options
pub fn compare_tables(left: &Table, right: &Table) -> DiffReport {
    TableComparator::default().compare(left, right)
}

/// Pairs of `(left_row, right_row)` to compare
///
/// Identical indexes pair up positionally. When both hold the same unique
/// labels in a different order, rows are matched by label. Otherwise rows are
/// paired positionally over the shorter table.
fn align_rows(left: &[String], right: &[String]) -> Vec<(usize, usize)> {
    if left == right {
        return (0..left.len()).map(|i| (i, i)).collect();
    }

    if left.len() == right.len() {
        let positions: HashMap<&str, usize> = right
            .iter()
            .enumerate()
            .map(|(j, label)| (label.as_str(), j))
            .collect();
        let unique = positions.len() == right.len()
            && left.iter().collect::<HashSet<_>>().len() == left.len();

        if unique && left.iter().all(|label| positions.contains_key(label.as_str())) {
            return left
                .iter()
                .enumerate()
                .map(|(i, label)| (i, positions[label.as_str()]))
                .collect();
        }
    }

    let common = left.len().min(right.len());
    (0..common).map(|i| (i, i)).collect()
}

fn within_tolerance(a: &Value, b: &Value, tol: f64) -> bool {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => (x - y).abs() <= tol,
        (None, None) => a.is_missing() && b.is_missing(),
        _ => false,
    }
}

fn values_equal(a: &Value, b: &Value) -> bool {
    match (a.is_missing(), b.is_missing()) {
        (true, true) => true,
        (false, false) => a == b,
        _ => false,
    }
}

fn original_value(column: Option<&Column>, row: usize) -> Value {
    column.map(|c| c.get(row)).unwrap_or(Value::Missing)
}
