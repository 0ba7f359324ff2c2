//! Table reconciliation engine
//!
//! Repairs tables converted from the foreign runtime, aligns dtypes between
//! a native and a foreign table and produces a [`DiffReport`].
//!
//! ## Example
//!
//! ```rust,ignore
//! use rbridge_engine::{CompareOptions, TableComparator};
//!
//! let report = TableComparator::new(CompareOptions::default()).compare(&native, &foreign);
//! if !report.is_equivalent() {
//!     println!("{}", report.to_json()?);
//! }
//! ```
//!
//! [`DiffReport`]: rbridge_core::DiffReport

pub mod cleaning;
pub mod coerce;
pub mod compare;
pub mod normalize;
pub mod repair;

pub use cleaning::{
    correct_time_points, set_plot_indication, CleaningError, TimePointColumns,
    PLOT_INDICATION_COLUMN,
};
pub use compare::{compare_tables, CompareOptions, TableComparator};
pub use normalize::{align_dtypes, coerce_numeric_first, common_columns, normalize_dtypes};
pub use repair::{
    normalize_string_na, renumber_index, repair_epoch_days, repair_integer_sentinels,
    repair_table, strip_timezone,
};
