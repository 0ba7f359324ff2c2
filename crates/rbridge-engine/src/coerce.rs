//! Best-effort coercions
//!
//! Every helper here is pure and returns `None` when it does not apply.
//! Callers chain them first-success-wins and leave data untouched on `None`.

use chrono::{NaiveDate, NaiveDateTime};
use rbridge_core::{ColumnData, Value};

/// Seconds in one day
const SECONDS_PER_DAY: f64 = 86_400.0;

/// Parse an integer, tolerating surrounding whitespace
pub fn parse_int(text: &str) -> Option<i64> {
    text.trim().parse().ok()
}

/// Parse a finite float, tolerating surrounding whitespace
pub fn parse_float(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|f| f.is_finite())
}

/// Parse the common boolean spellings
pub fn parse_bool(text: &str) -> Option<bool> {
    match text.trim() {
        "TRUE" | "True" | "true" | "T" => Some(true),
        "FALSE" | "False" | "false" | "F" => Some(false),
        _ => None,
    }
}

/// Try each parser in order and return the first success
pub fn first_success<T>(text: &str, parsers: &[fn(&str) -> Option<T>]) -> Option<T> {
    parsers.iter().find_map(|parse| parse(text))
}

/// Parse text as a number, integers first
pub fn parse_number(text: &str) -> Option<f64> {
    let parsers: [fn(&str) -> Option<f64>; 2] = [|t| parse_int(t).map(|i| i as f64), parse_float];
    first_success(text, &parsers)
}

/// Numeric view of a single value
pub fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Str(s) => parse_number(s),
        other => other.as_f64(),
    }
}

/// Numeric view of a whole column
///
/// Returns `None` for column types that never coerce (booleans, datetimes).
/// Entries that fail to coerce become `None` inside the vector.
pub fn column_to_numeric(data: &ColumnData) -> Option<Vec<Option<f64>>> {
    match data {
        ColumnData::Integer(values) => Some(values.iter().map(|v| v.map(|i| i as f64)).collect()),
        ColumnData::Float(values) => Some(values.iter().map(|v| v.filter(|f| !f.is_nan())).collect()),
        ColumnData::String(values) => Some(
            values
                .iter()
                .map(|v| v.as_deref().and_then(parse_number))
                .collect(),
        ),
        ColumnData::Boolean(_) | ColumnData::Datetime(_) => None,
    }
}

/// `1970-01-01 + days`, fractional days becoming time of day
pub fn epoch_days_to_datetime(days: f64) -> Option<NaiveDateTime> {
    if !days.is_finite() {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1)?.and_hms_opt(0, 0, 0)?;
    let seconds = (days * SECONDS_PER_DAY).round();
    if seconds.abs() > i64::MAX as f64 {
        return None;
    }
    let delta = chrono::Duration::try_seconds(seconds as i64)?;
    epoch.checked_add_signed(delta)
}

/// Reinterpret a numeric column as epoch-day datetimes
///
/// All non-missing values must convert, otherwise `None`.
pub fn numeric_to_epoch_days(data: &ColumnData) -> Option<Vec<Option<NaiveDateTime>>> {
    let numbers = match data {
        ColumnData::Integer(_) | ColumnData::Float(_) => column_to_numeric(data)?,
        _ => return None,
    };
    numbers
        .into_iter()
        .map(|v| match v {
            Some(days) => epoch_days_to_datetime(days).map(Some),
            None => Some(None),
        })
        .collect()
}
