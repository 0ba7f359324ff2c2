//! Shared tables for the reconciliation tests
//!
//! `visits_frame` is what a foreign function returns for a small visit
//! listing; `visits_table` is the same data computed natively.

use chrono::{NaiveDate, NaiveDateTime};
use rbridge_core::{Column, ForeignColumn, ForeignTable, Table, VectorData, NA_INTEGER};

fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> Option<NaiveDateTime> {
    NaiveDate::from_ymd_opt(y, m, d).and_then(|date| date.and_hms_opt(h, min, 0))
}

fn chars(values: &[Option<&str>]) -> VectorData {
    VectorData::Character(values.iter().map(|v| v.map(str::to_string)).collect())
}

/// Visit listing as the foreign runtime hands it over
pub fn visits_frame() -> ForeignTable {
    ForeignTable::new(vec![
        ForeignColumn::new("Patient_ID", chars(&[Some("P1"), Some("P1"), Some("P2")])),
        ForeignColumn::new("Cycle", VectorData::Integer(vec![1, 2, NA_INTEGER])),
        ForeignColumn::new(
            "Dose_mg",
            VectorData::Double(vec![Some(100.0), Some(f64::NAN), Some(75.5)]),
        ),
        ForeignColumn::new(
            "Visit_date",
            VectorData::Double(vec![Some(19000.0), Some(19024.0), None]),
        )
        .with_class(&["Date"]),
        ForeignColumn::new(
            "Collected_at",
            VectorData::Double(vec![Some(1_677_658_500.0), None, Some(1_677_658_500.0)]),
        )
        .with_class(&["POSIXct", "POSIXt"])
        .with_tzone("+01:00"),
        ForeignColumn::new("Status", chars(&[Some("done"), Some("NA"), Some("")])),
        ForeignColumn::new("Arm", VectorData::Integer(vec![2, 1, NA_INTEGER]))
            .with_levels(vec!["A".to_string(), "B".to_string()])
            .with_class(&["factor"]),
        ForeignColumn::new(
            "Responder",
            VectorData::Logical(vec![Some(true), None, Some(false)]),
        ),
    ])
}

/// The same listing computed natively
pub fn visits_table() -> Table {
    Table::from_columns(vec![
        Column::string("Patient_ID", vec![Some("P1"), Some("P1"), Some("P2")]),
        Column::integer("Cycle", vec![Some(1), Some(2), None]),
        Column::float("Dose_mg", vec![Some(100.0), None, Some(75.5)]),
        Column::datetime("Visit_date", vec![at(2022, 1, 8, 0, 0), at(2022, 2, 1, 0, 0), None]),
        Column::datetime(
            "Collected_at",
            vec![at(2023, 3, 1, 9, 15), None, at(2023, 3, 1, 9, 15)],
        ),
        Column::string("Status", vec![Some("done"), None, None]),
        Column::string("Arm", vec![Some("B"), Some("A"), None]),
        Column::boolean("Responder", vec![Some(true), None, Some(false)]),
    ])
    .expect("fixture columns have equal lengths")
}
