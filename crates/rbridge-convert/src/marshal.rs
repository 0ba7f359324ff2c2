//! Native → foreign marshalling for call arguments

use rbridge_core::{
    Column, ColumnData, ForeignColumn, ForeignTable, ForeignValue, ForeignVector, NamedList,
    NativeValue, RowIndex, Table, Value, VectorData, NA_INTEGER,
};

/// Values that can be passed to a foreign function
pub trait ToForeign {
    fn to_foreign(&self) -> ForeignValue;
}

impl ToForeign for Table {
    fn to_foreign(&self) -> ForeignValue {
        ForeignValue::DataFrame(table_to_frame(self))
    }
}

impl ToForeign for Value {
    fn to_foreign(&self) -> ForeignValue {
        match self {
            Value::Int(i) => match i32::try_from(*i) {
                Ok(small) if small != NA_INTEGER => ForeignValue::from(small),
                _ => ForeignValue::from(*i as f64),
            },
            Value::Float(f) if !f.is_nan() => ForeignValue::from(*f),
            Value::Bool(b) => ForeignValue::from(*b),
            Value::Str(s) => ForeignValue::from(s.as_str()),
            Value::Datetime(_) => ForeignValue::from(self.to_string()),
            // A logical NA is the foreign runtime's untyped missing value.
            Value::Missing | Value::Float(_) => {
                ForeignValue::Vector(ForeignVector::new(VectorData::Logical(vec![None])))
            }
        }
    }
}

impl ToForeign for NativeValue {
    fn to_foreign(&self) -> ForeignValue {
        match self {
            NativeValue::Map(map) => ForeignValue::List(NamedList {
                names: Some(map.keys().map(|k| Some(k.to_string())).collect()),
                values: map.iter().map(|(_, v)| v.to_foreign()).collect(),
            }),
            NativeValue::Seq(items) => ForeignValue::List(NamedList::unnamed(
                items.iter().map(ToForeign::to_foreign).collect(),
            )),
            NativeValue::Table(table) => table.to_foreign(),
            NativeValue::Scalar(value) => value.to_foreign(),
            NativeValue::Foreign(value) => value.clone(),
        }
    }
}

/// Convert a native table into a foreign data frame
pub fn table_to_frame(table: &Table) -> ForeignTable {
    let row_names = match table.index() {
        RowIndex::Range(n) => (1..=*n).map(|i| i.to_string()).collect(),
        other => other.labels(),
    };

    ForeignTable {
        columns: table.columns().iter().map(column_to_foreign).collect(),
        row_names: Some(row_names),
    }
}

fn column_to_foreign(column: &Column) -> ForeignColumn {
    match &column.data {
        ColumnData::Integer(values) => {
            let narrow: Option<Vec<i32>> = values
                .iter()
                .map(|v| match v {
                    Some(i) => i32::try_from(*i).ok().filter(|&n| n != NA_INTEGER),
                    None => Some(NA_INTEGER),
                })
                .collect();
            match narrow {
                Some(ints) => ForeignColumn::new(column.name.clone(), VectorData::Integer(ints)),
                // Too wide for the foreign integer type.
                None => ForeignColumn::new(
                    column.name.clone(),
                    VectorData::Double(values.iter().map(|v| v.map(|i| i as f64)).collect()),
                ),
            }
        }
        ColumnData::Float(values) => {
            ForeignColumn::new(column.name.clone(), VectorData::Double(values.clone()))
        }
        ColumnData::String(values) => {
            ForeignColumn::new(column.name.clone(), VectorData::Character(values.clone()))
        }
        ColumnData::Boolean(values) => {
            ForeignColumn::new(column.name.clone(), VectorData::Logical(values.clone()))
        }
        ColumnData::Datetime(data) => {
            let seconds = data
                .values
                .iter()
                .map(|v| v.map(|dt| dt.and_utc().timestamp_millis() as f64 / 1000.0))
                .collect();
            let tzone = match &data.tz {
                Some(tz) if !tz.is_utc() => tz.name(),
                _ => "UTC".to_string(),
            };
            ForeignColumn::new(column.name.clone(), VectorData::Double(seconds))
                .with_class(&["POSIXct", "POSIXt"])
                .with_tzone(tzone)
        }
    }
}
