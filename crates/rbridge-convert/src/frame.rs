//! Data frame conversion
//!
//! Mirrors what the platform's data frame converter produces, including the
//! artifacts the repair layer later fixes: integer columns keep the NA
//! sentinel, `Date` columns arrive as plain day counts and row names arrive
//! as string labels.

use crate::error::ConversionError;
use chrono::{DateTime, NaiveDateTime};
use rbridge_core::{
    Column, ColumnData, DatetimeData, ForeignColumn, ForeignTable, RowIndex, Table, Timezone,
    VectorData,
};

/// Converts a foreign data frame into a native table
pub trait TableConverter {
    /// Convert one data frame
    fn to_table(&self, table: &ForeignTable) -> Result<Table, ConversionError>;
}

/// Default column-by-column converter
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameConverter;

impl FrameConverter {
    pub fn new() -> Self {
        Self
    }

    fn convert_column(&self, column: &ForeignColumn) -> Result<Column, ConversionError> {
        let data = match &column.data {
            VectorData::Integer(values) if column.inherits("factor") => {
                factor_to_strings(column, values)?
            }
            VectorData::Integer(values) => {
                ColumnData::Integer(values.iter().map(|&v| Some(i64::from(v))).collect())
            }
            VectorData::Double(values) if column.inherits("POSIXct") => {
                posixct_to_datetimes(column, values)?
            }
            // Date columns stay day counts; see `repair_epoch_days`.
            VectorData::Double(values) => ColumnData::Float(
                values
                    .iter()
                    .map(|v| v.filter(|f| !f.is_nan()))
                    .collect(),
            ),
            VectorData::Logical(values) => ColumnData::Boolean(values.clone()),
            VectorData::Character(values) => ColumnData::String(values.clone()),
        };

        Ok(Column::new(column.name.clone(), data))
    }
}

impl TableConverter for FrameConverter {
    fn to_table(&self, table: &ForeignTable) -> Result<Table, ConversionError> {
        let columns = table
            .columns
            .iter()
            .map(|c| self.convert_column(c))
            .collect::<Result<Vec<_>, _>>()?;

        let index = match &table.row_names {
            Some(names) => RowIndex::Labels(names.clone()),
            None => RowIndex::Range(table.n_rows()),
        };

        Ok(Table::new(columns, index)?)
    }
}

fn factor_to_strings(column: &ForeignColumn, codes: &[i32]) -> Result<ColumnData, ConversionError> {
    let levels = column
        .levels
        .as_ref()
        .ok_or_else(|| ConversionError::MissingLevels(column.name.clone()))?;

    let values = codes
        .iter()
        .map(|&code| {
            if code == rbridge_core::NA_INTEGER {
                return Ok(None);
            }
            usize::try_from(code)
                .ok()
                .and_then(|c| c.checked_sub(1))
                .and_then(|i| levels.get(i))
                .cloned()
                .map(Some)
                .ok_or_else(|| ConversionError::InvalidFactorCode {
                    column: column.name.clone(),
                    code,
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ColumnData::String(values))
}

fn posixct_to_datetimes(
    column: &ForeignColumn,
    seconds: &[Option<f64>],
) -> Result<ColumnData, ConversionError> {
    let values = seconds
        .iter()
        .map(|s| match s {
            Some(secs) if !secs.is_nan() => timestamp_to_naive(*secs)
                .map(Some)
                .ok_or_else(|| ConversionError::TimestampOutOfRange {
                    column: column.name.clone(),
                    seconds: *secs,
                }),
            _ => Ok(None),
        })
        .collect::<Result<Vec<_>, _>>()?;

    let tz = match column.tzone.as_deref() {
        None | Some("") => None,
        Some(zone) => Some(
            Timezone::parse(zone)
                .ok_or_else(|| ConversionError::UnsupportedTimezone(zone.to_string()))?,
        ),
    };

    Ok(ColumnData::Datetime(DatetimeData { values, tz }))
}

/// Seconds since the epoch to a UTC naive datetime
pub fn timestamp_to_naive(seconds: f64) -> Option<NaiveDateTime> {
    let whole = seconds.floor();
    let nanos = ((seconds - whole) * 1e9).round() as u32;
    // The rounding above can carry into a whole second.
    let (whole, nanos) = if nanos >= 1_000_000_000 {
        (whole + 1.0, 0)
    } else {
        (whole, nanos)
    };
    if !whole.is_finite() || whole.abs() > i64::MAX as f64 {
        return None;
    }
    DateTime::from_timestamp(whole as i64, nanos).map(|dt| dt.naive_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rbridge_core::{ColumnType, NA_INTEGER};

    #[test]
    fn converts_plain_columns_with_artifacts() {
        let frame = ForeignTable::new(vec![
            ForeignColumn::new("id", VectorData::Integer(vec![1, NA_INTEGER])),
            ForeignColumn::new("visit", VectorData::Double(vec![Some(19000.0), None]))
                .with_class(&["Date"]),
            ForeignColumn::new("ok", VectorData::Logical(vec![Some(true), None])),
        ]);

        let table = FrameConverter::new().to_table(&frame).unwrap();

        assert_eq!(
            table.column("id").unwrap().data,
            ColumnData::Integer(vec![Some(1), Some(i64::from(NA_INTEGER))])
        );
        assert_eq!(table.column("visit").unwrap().dtype(), ColumnType::Float);
        assert_eq!(
            table.index(),
            &RowIndex::Labels(vec!["1".to_string(), "2".to_string()])
        );
    }

    #[test]
    fn factors_become_strings() {
        let frame = ForeignTable::new(vec![ForeignColumn::new(
            "arm",
            VectorData::Integer(vec![2, 1, NA_INTEGER]),
        )
        .with_class(&["factor"])
        .with_levels(vec!["A".to_string(), "B".to_string()])]);

        let table = FrameConverter::new().to_table(&frame).unwrap();
        assert_eq!(
            table.column("arm").unwrap().data,
            ColumnData::String(vec![Some("B".to_string()), Some("A".to_string()), None])
        );
    }

    #[test]
    fn bad_factor_code_fails() {
        let frame = ForeignTable::new(vec![ForeignColumn::new("arm", VectorData::Integer(vec![3]))
            .with_class(&["factor"])
            .with_levels(vec!["A".to_string()])]);

        let err = FrameConverter::new().to_table(&frame).unwrap_err();
        assert!(matches!(err, ConversionError::InvalidFactorCode { code: 3, .. }));
    }

    #[test]
    fn posixct_keeps_timezone() {
        let frame = ForeignTable::new(vec![ForeignColumn::new(
            "ts",
            VectorData::Double(vec![Some(0.0), None]),
        )
        .with_class(&["POSIXct", "POSIXt"])
        .with_tzone("+02:00")]);

        let table = FrameConverter::new().to_table(&frame).unwrap();
        let ColumnData::Datetime(data) = &table.column("ts").unwrap().data else {
            panic!("expected datetime column");
        };

        assert_eq!(data.tz, Timezone::parse("+02:00"));
        assert_eq!(data.local(0).unwrap().to_string(), "1970-01-01 02:00:00");
        assert_eq!(data.values[1], None);
    }

    #[test]
    fn named_timezone_keeps_wall_clock_across_dst() {
        // 2024-01-15 12:00 EST and 2024-07-15 12:00 EDT
        let frame = ForeignTable::new(vec![ForeignColumn::new(
            "ts",
            VectorData::Double(vec![Some(1_705_338_000.0), Some(1_721_059_200.0)]),
        )
        .with_class(&["POSIXct", "POSIXt"])
        .with_tzone("America/New_York")]);

        let table = FrameConverter::new().to_table(&frame).unwrap();
        let column = table.column("ts").unwrap();

        assert_eq!(column.get(0).to_string(), "2024-01-15 12:00:00");
        assert_eq!(column.get(1).to_string(), "2024-07-15 12:00:00");
    }

    #[test]
    fn unknown_timezone_fails() {
        let frame = ForeignTable::new(vec![ForeignColumn::new(
            "ts",
            VectorData::Double(vec![Some(0.0)]),
        )
        .with_class(&["POSIXct", "POSIXt"])
        .with_tzone("Mars/Olympus_Mons")]);

        let err = FrameConverter::new().to_table(&frame).unwrap_err();
        assert!(matches!(err, ConversionError::UnsupportedTimezone(_)));
    }

    #[test]
    fn ragged_frame_fails() {
        let frame = ForeignTable {
            columns: vec![
                ForeignColumn::new("a", VectorData::Integer(vec![1, 2])),
                ForeignColumn::new("b", VectorData::Integer(vec![1])),
            ],
            row_names: None,
        };

        assert!(matches!(
            FrameConverter::new().to_table(&frame),
            Err(ConversionError::Table(_))
        ));
    }
}
