//! Foreign value conversion
//!
//! Recursive descent from raw foreign values into native structures, plus
//! the reverse direction used to marshal call arguments.
//!
//! ## Example
//!
//! ```rust,ignore
//! use rbridge_convert::ValueConverter;
//!
//! let native = ValueConverter::new().convert(raw_result);
//! let df = native.get("df").and_then(|v| v.as_table());
//! ```

pub mod converter;
pub mod error;
pub mod frame;
pub mod marshal;

pub use converter::ValueConverter;
pub use error::ConversionError;
pub use frame::{FrameConverter, TableConverter};
pub use marshal::{table_to_frame, ToForeign};
