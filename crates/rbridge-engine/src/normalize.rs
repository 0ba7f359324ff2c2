//! Dtype normalization of two tables before comparison
//!
//! Only columns present in both tables are touched. Columns that exist on
//! one side only are left as they are and excluded by the comparator.

use crate::coerce::{column_to_numeric, numeric_to_epoch_days};
use rbridge_core::{Column, ColumnData, ColumnType, DatetimeData, Table};
use std::collections::{HashMap, HashSet};

/// Names present in both tables, in left order
pub fn common_columns<'a>(left: &'a Table, right: &Table) -> Vec<&'a str> {
    left.column_names()
        .into_iter()
        .filter(|name| right.column(name).is_some())
        .collect()
}

/// Try numeric coercion on every integer/float/string column pair
///
/// Values that do not parse become missing. A pair is kept as float columns
/// when at least one side yields a number; otherwise both sides revert to
/// their originals. Returns the new tables and the names of accepted columns.
pub fn coerce_numeric_first(left: &Table, right: &Table) -> (Table, Table, HashSet<String>) {
    let mut left_out = HashMap::new();
    let mut right_out = HashMap::new();
    let mut handled = HashSet::new();

    for name in common_columns(left, right) {
        let (Some(l), Some(r)) = (left.column(name), right.column(name)) else {
            continue;
        };
        if !is_coercible(l.dtype()) || !is_coercible(r.dtype()) {
            continue;
        }

        let (Some(l_num), Some(r_num)) = (column_to_numeric(&l.data), column_to_numeric(&r.data))
        else {
            continue;
        };
        if l_num.iter().chain(&r_num).all(Option::is_none) {
            continue;
        }

        left_out.insert(name.to_string(), as_float(l, l_num));
        right_out.insert(name.to_string(), as_float(r, r_num));
        handled.insert(name.to_string());
    }

    if !handled.is_empty() {
        tracing::debug!(columns = ?handled, "Coerced columns to numeric");
    }

    (
        replace_columns(left, &left_out),
        replace_columns(right, &right_out),
        handled,
    )
}

/// Reconcile the dtypes of the remaining common columns
///
/// Columns named in `skip` are left alone.
pub fn normalize_dtypes(left: &Table, right: &Table, skip: &HashSet<String>) -> (Table, Table) {
    let mut left_out = HashMap::new();
    let mut right_out = HashMap::new();

    for name in common_columns(left, right) {
        if skip.contains(name) {
            continue;
        }
        let (Some(l), Some(r)) = (left.column(name), right.column(name)) else {
            continue;
        };

        let l = empty_strings_to_missing(l);
        let r = empty_strings_to_missing(r);
        let (l, r) = reconcile_pair(l, r);

        left_out.insert(name.to_string(), l);
        right_out.insert(name.to_string(), r);
    }

    (
        replace_columns(left, &left_out),
        replace_columns(right, &right_out),
    )
}

/// Both normalization passes
pub fn align_dtypes(left: &Table, right: &Table) -> (Table, Table) {
    let (left, right, handled) = coerce_numeric_first(left, right);
    normalize_dtypes(&left, &right, &handled)
}

fn reconcile_pair(left: Column, right: Column) -> (Column, Column) {
    let (l, r) = (left.dtype(), right.dtype());

    if (l.is_numeric() && r == ColumnType::String) || (l == ColumnType::String && r.is_numeric()) {
        return (lossy_float(&left), lossy_float(&right));
    }
    if l.is_numeric() && r.is_numeric() && l != r {
        return (lossy_float(&left), lossy_float(&right));
    }
    if is_textual_pair(l, r) || is_textual_pair(r, l) {
        return (stringify(&left), stringify(&right));
    }
    if l == ColumnType::Datetime && r.is_numeric() {
        let right = epoch_days(&right).unwrap_or(right);
        return (left, right);
    }
    if l.is_numeric() && r == ColumnType::Datetime {
        let left = epoch_days(&left).unwrap_or(left);
        return (left, right);
    }

    (left, right)
}

/// String against string, boolean or datetime
fn is_textual_pair(a: ColumnType, b: ColumnType) -> bool {
    a == ColumnType::String
        && matches!(
            b,
            ColumnType::String | ColumnType::Boolean | ColumnType::Datetime
        )
}

fn is_coercible(dtype: ColumnType) -> bool {
    matches!(
        dtype,
        ColumnType::Integer | ColumnType::Float | ColumnType::String
    )
}

fn lossy_float(column: &Column) -> Column {
    match column_to_numeric(&column.data) {
        Some(numbers) => as_float(column, numbers),
        None => column.clone(),
    }
}

fn as_float(column: &Column, values: Vec<Option<f64>>) -> Column {
    column.with_data(ColumnData::Float(values))
}

fn stringify(column: &Column) -> Column {
    column.with_data(ColumnData::String(
        (0..column.len()).map(|row| column.get(row).render()).collect(),
    ))
}

fn epoch_days(column: &Column) -> Option<Column> {
    let values = numeric_to_epoch_days(&column.data)?;
    Some(column.with_data(ColumnData::Datetime(DatetimeData::naive(values))))
}

fn empty_strings_to_missing(column: &Column) -> Column {
    match &column.data {
        ColumnData::String(values) => column.with_data(ColumnData::String(
            values
                .iter()
                .map(|v| v.clone().filter(|s| !s.is_empty()))
                .collect(),
        )),
        _ => column.clone(),
    }
}

fn replace_columns(table: &Table, replacements: &HashMap<String, Column>) -> Table {
    if replacements.is_empty() {
        return table.clone();
    }
    table.map_columns(|column| {
        replacements
            .get(&column.name)
            .cloned()
            .unwrap_or_else(|| column.clone())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use rbridge_core::Value;

    fn table(columns: Vec<Column>) -> Table {
        Table::from_columns(columns).unwrap()
    }

    #[test]
    fn common_columns_follow_left_order() {
        let left = table(vec![
            Column::integer("b", vec![Some(1)]),
            Column::integer("a", vec![Some(1)]),
            Column::integer("only_left", vec![Some(1)]),
        ]);
        let right = table(vec![
            Column::integer("a", vec![Some(1)]),
            Column::integer("b", vec![Some(1)]),
        ]);

        assert_eq!(common_columns(&left, &right), vec!["b", "a"]);
    }

    #[test]
    fn numeric_strings_are_coerced_first() {
        let left = table(vec![Column::integer("n", vec![Some(1), None])]);
        let right = table(vec![Column::string("n", vec![Some("1"), None])]);

        let (l, r, handled) = coerce_numeric_first(&left, &right);

        assert!(handled.contains("n"));
        assert_eq!(l.column("n").unwrap().data, ColumnData::Float(vec![Some(1.0), None]));
        assert_eq!(r.column("n").unwrap().data, ColumnData::Float(vec![Some(1.0), None]));
    }

    #[test]
    fn unparseable_values_become_missing() {
        let left = table(vec![Column::string("s", vec![Some("1"), Some("x")])]);
        let right = table(vec![Column::string("s", vec![Some("1"), Some("y")])]);

        let (l, r, handled) = coerce_numeric_first(&left, &right);

        assert!(handled.contains("s"));
        assert_eq!(l.column("s").unwrap().data, ColumnData::Float(vec![Some(1.0), None]));
        assert_eq!(r.column("s").unwrap().data, ColumnData::Float(vec![Some(1.0), None]));
    }

    #[test]
    fn text_without_numbers_is_reverted() {
        let left = table(vec![Column::string("s", vec![Some("a"), Some("b")])]);
        let right = table(vec![Column::string("s", vec![Some("a"), Some("c")])]);

        let (l, r, handled) = coerce_numeric_first(&left, &right);

        assert!(handled.is_empty());
        assert_eq!(l, left);
        assert_eq!(r, right);
    }

    #[test]
    fn all_missing_pair_is_not_handled() {
        let left = table(vec![Column::string("s", vec![None::<&str>])]);
        let right = table(vec![Column::string("s", vec![None::<&str>])]);

        let (_, _, handled) = coerce_numeric_first(&left, &right);
        assert!(handled.is_empty());
    }

    #[test]
    fn numeric_vs_string_coerces_lossily() {
        let left = table(vec![Column::float("n", vec![Some(1.5), Some(2.0)])]);
        let right = table(vec![Column::string("n", vec![Some("1.5"), Some("oops")])]);

        let (l, r) = align_dtypes(&left, &right);

        assert_eq!(l.column("n").unwrap().dtype(), ColumnType::Float);
        assert_eq!(r.column("n").unwrap().data, ColumnData::Float(vec![Some(1.5), None]));
    }

    #[test]
    fn integer_and_float_unify() {
        let left = table(vec![Column::integer("n", vec![Some(2)])]);
        let right = table(vec![Column::float("n", vec![Some(2.0)])]);

        let (l, r) = normalize_dtypes(&left, &right, &HashSet::new());
        assert_eq!(l.column("n").unwrap().data, r.column("n").unwrap().data);
    }

    #[test]
    fn string_vs_boolean_is_stringified() {
        let left = table(vec![Column::string("flag", vec![Some("True"), Some("")])]);
        let right = table(vec![Column::boolean("flag", vec![Some(true), None])]);

        let (l, r) = align_dtypes(&left, &right);

        assert_eq!(l.column("flag").unwrap().get(1), Value::Missing);
        assert_eq!(l.column("flag").unwrap().data, r.column("flag").unwrap().data);
    }

    #[test]
    fn datetime_vs_string_is_stringified() {
        let day = NaiveDate::from_ymd_opt(2022, 1, 8)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let left = table(vec![Column::string("d", vec![Some("2022-01-08")])]);
        let right = table(vec![Column::datetime("d", vec![Some(day)])]);

        let (l, r) = align_dtypes(&left, &right);
        assert_eq!(l.column("d").unwrap().get(0), r.column("d").unwrap().get(0));
    }

    #[test]
    fn numeric_side_of_datetime_pair_becomes_dates() {
        let day = NaiveDate::from_ymd_opt(2022, 1, 8)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let left = table(vec![Column::float("d", vec![Some(19000.0)])]);
        let right = table(vec![Column::datetime("d", vec![Some(day)])]);

        let (l, _) = align_dtypes(&left, &right);
        assert_eq!(l.column("d").unwrap().get(0), Value::Datetime(day));
    }

    #[test]
    fn one_sided_columns_are_untouched() {
        let left = table(vec![Column::string("x", vec![Some("")])]);
        let right = table(vec![Column::string("y", vec![Some("")])]);

        let (l, r) = align_dtypes(&left, &right);
        assert_eq!(l, left);
        assert_eq!(r, right);
    }
}
