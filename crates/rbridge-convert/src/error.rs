//! Conversion errors
//!
//! These never escape [`crate::ValueConverter::convert`]; a failed data frame
//! conversion degrades to the pass-through variant instead.

use rbridge_core::TableError;

#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    #[error("Factor column '{0}' has no levels")]
    MissingLevels(String),

    #[error("Factor column '{column}' has out-of-range code {code}")]
    InvalidFactorCode { column: String, code: i32 },

    #[error("Column '{column}' holds a timestamp out of range: {seconds}")]
    TimestampOutOfRange { column: String, seconds: f64 },

    #[error("Unsupported timezone: {0}")]
    UnsupportedTimezone(String),

    #[error("Invalid table: {0}")]
    Table(#[from] TableError),
}
