//! rbridge core
//!
//! Shared data model for the foreign-function bridge and the table
//! reconciliation pipeline: raw foreign values, native values, tables,
//! diff reports and configuration.

pub mod config;
pub mod foreign;
pub mod native;
pub mod report;
pub mod table;
pub mod timezone;
pub mod value;

pub use config::{CompareConfig, Config, ConfigError, HostConfig, RepairConfig, DEFAULT_NA_TOKENS};
pub use foreign::{
    ForeignColumn, ForeignScalar, ForeignTable, ForeignValue, ForeignVector, NamedList, VectorData,
    NA_INTEGER,
};
pub use native::{NativeMap, NativeValue};
pub use report::{DiffReport, RowDiff};
pub use table::{Column, ColumnData, ColumnType, DatetimeData, RowIndex, Table, TableError};
pub use timezone::Timezone;
pub use value::Value;
