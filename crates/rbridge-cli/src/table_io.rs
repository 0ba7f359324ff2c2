//! Delimited text → Table
//!
//! Column types are inferred from the non-empty cells: integer, then
//! float, then boolean, falling back to text. Empty cells become missing in
//! typed columns and stay empty strings in text columns, where the repair
//! layer decides what they mean.

use anyhow::{Context, Result};
use rbridge_core::{Column, ColumnData, RowIndex, Table};
use rbridge_engine::coerce::{parse_bool, parse_float, parse_int};
use std::path::Path;

/// Read a CSV file with a header row
///
/// A first column with an empty header (how data frames write their row
/// names) becomes the row index.
pub fn read_csv(path: &Path) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    let headers: Vec<String> = reader
        .headers()
        .with_context(|| format!("Failed to read header of {}", path.display()))?
        .iter()
        .map(str::to_string)
        .collect();

    let mut cells: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
    for (line, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("{}: bad record {}", path.display(), line + 1))?;
        for (column, cell) in cells.iter_mut().zip(record.iter()) {
            column.push(cell.to_string());
        }
    }

    let has_row_names = headers.first().is_some_and(|h| h.is_empty());
    let mut columns = headers.into_iter().zip(cells);

    let index = if has_row_names {
        let (_, labels) = columns.next().unwrap_or_default();
        RowIndex::Labels(labels)
    } else {
        RowIndex::Range(0)
    };

    let columns: Vec<Column> = columns
        .map(|(name, values)| Column::new(name, infer_column(&values)))
        .collect();

    let table = match index {
        RowIndex::Labels(_) => Table::new(columns, index)?,
        _ => Table::from_columns(columns)?,
    };
    tracing::debug!(
        "Read {} rows x {} columns from {}",
        table.n_rows(),
        table.n_cols(),
        path.display()
    );
    Ok(table)
}

/// Typed storage for one column of raw cells
pub fn infer_column(cells: &[String]) -> ColumnData {
    let present = || cells.iter().filter(|c| !c.is_empty());

    if present().next().is_some() {
        if present().all(|c| parse_int(c).is_some()) {
            return ColumnData::Integer(typed(cells, parse_int));
        }
        if present().all(|c| parse_float(c).is_some()) {
            return ColumnData::Float(typed(cells, parse_float));
        }
        if present().all(|c| parse_bool(c).is_some()) {
            return ColumnData::Boolean(typed(cells, parse_bool));
        }
    }

    ColumnData::String(cells.iter().cloned().map(Some).collect())
}

fn typed<T>(cells: &[String], parse: fn(&str) -> Option<T>) -> Vec<Option<T>> {
    cells
        .iter()
        .map(|c| if c.is_empty() { None } else { parse(c) })
        .collect()
}
