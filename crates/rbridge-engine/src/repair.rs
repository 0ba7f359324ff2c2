//! Table repair: undo the encoding artifacts of foreign → native conversion
//!
//! Steps run in a fixed order and each one only touches columns that meet
//! its precondition:
//! 1. integer NA sentinel → missing
//! 2. epoch-day numeric columns → datetime
//! 3. timezone-aware datetimes → naive wall-clock
//! 4. string NA tokens → missing
//! 5. 1-based string row index → zero-based positions
//!
//! Nothing here mutates its input; every function returns new data.

use crate::coerce::{column_to_numeric, numeric_to_epoch_days};
use rbridge_core::{Column, ColumnData, DatetimeData, RepairConfig, RowIndex, Table, NA_INTEGER};

/// Run every enabled repair step
pub fn repair_table(table: &Table, options: &RepairConfig) -> Table {
    let repaired = table.map_columns(|column| repair_column(column, options));

    if !options.renumber_index {
        return repaired;
    }

    match renumber_index(repaired.index()) {
        // Same length by construction, so this cannot fail.
        Some(index) => repaired.with_index(index).unwrap_or(repaired),
        None => repaired,
    }
}

/// Run the enabled column-level steps on one column
pub fn repair_column(column: &Column, options: &RepairConfig) -> Column {
    let mut column = column.clone();

    if options.integer_sentinel {
        column = repair_integer_sentinels(&column);
    }
    if options.epoch_days {
        column = repair_epoch_days(&column, options.epoch_day_min, options.epoch_day_max);
    }
    if options.strip_timezone {
        column = strip_timezone(&column);
    }
    if options.string_na {
        column = normalize_string_na(&column, &options.na_tokens);
    }

    column
}

/// Replace the foreign integer NA sentinel with missing
pub fn repair_integer_sentinels(column: &Column) -> Column {
    let ColumnData::Integer(values) = &column.data else {
        return column.clone();
    };

    let sentinel = i64::from(NA_INTEGER);
    if !values.contains(&Some(sentinel)) {
        return column.clone();
    }

    tracing::debug!(column = %column.name, "Replacing integer NA sentinel");
    column.with_data(ColumnData::Integer(
        values.iter().map(|v| v.filter(|&i| i != sentinel)).collect(),
    ))
}

/// Reinterpret a numeric column of epoch-day counts as datetimes
///
/// Applies only when the column has at least one non-missing value and all
/// of them lie in `[min, max]`. Any conversion failure leaves the column as is.
pub fn repair_epoch_days(column: &Column, min: f64, max: f64) -> Column {
    if !column.dtype().is_numeric() {
        return column.clone();
    }
    let Some(numbers) = column_to_numeric(&column.data) else {
        return column.clone();
    };

    let mut present = numbers.iter().flatten().peekable();
    if present.peek().is_none() || !present.all(|&v| (min..=max).contains(&v)) {
        return column.clone();
    }

    match numeric_to_epoch_days(&column.data) {
        Some(values) => {
            tracing::debug!(column = %column.name, "Reinterpreting epoch-day column as dates");
            column.with_data(ColumnData::Datetime(DatetimeData::naive(values)))
        }
        None => column.clone(),
    }
}

/// Drop the timezone of a datetime column, keeping local wall-clock values
pub fn strip_timezone(column: &Column) -> Column {
    let ColumnData::Datetime(data) = &column.data else {
        return column.clone();
    };
    if data.tz.is_none() {
        return column.clone();
    }

    let values = (0..data.values.len()).map(|row| data.local(row)).collect();
    column.with_data(ColumnData::Datetime(DatetimeData::naive(values)))
}

/// Replace string NA tokens with missing
pub fn normalize_string_na(column: &Column, tokens: &[String]) -> Column {
    let ColumnData::String(values) = &column.data else {
        return column.clone();
    };

    column.with_data(ColumnData::String(
        values
            .iter()
            .map(|v| v.clone().filter(|s| !tokens.iter().any(|t| t == s)))
            .collect(),
    ))
}

/// Apply [`normalize_string_na`] to every column of a table
pub fn normalize_table_string_na(table: &Table, tokens: &[String]) -> Table {
    table.map_columns(|column| normalize_string_na(column, tokens))
}

/// Zero-based positional index for a `"1".."n"` string index
///
/// Returns `None` when the index is not string-typed or any label is not the
/// next integer in sequence.
pub fn renumber_index(index: &RowIndex) -> Option<RowIndex> {
    let RowIndex::Labels(labels) = index else {
        return None;
    };

    for (position, label) in labels.iter().enumerate() {
        let parsed: i64 = label.trim().parse().ok()?;
        if usize::try_from(parsed).ok()? != position + 1 {
            return None;
        }
    }

    Some(RowIndex::Range(labels.len()))
}
