//! Native table model: typed columns plus a row index

use crate::timezone::Timezone;
use crate::value::Value;
use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::HashSet;

/// Semantic column type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    /// Integer column
    Integer,

    /// Floating point column
    Float,

    /// Text (object) column
    String,

    /// Boolean column
    Boolean,

    /// Timestamp column
    Datetime,
}

impl ColumnType {
    /// Integer and float columns
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Integer | Self::Float)
    }
}

impl std::fmt::Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Integer => write!(f, "integer"),
            Self::Float => write!(f, "float"),
            Self::String => write!(f, "string"),
            Self::Boolean => write!(f, "boolean"),
            Self::Datetime => write!(f, "datetime"),
        }
    }
}

/// Datetime column storage
///
/// With a timezone, values are UTC instants; without one they are wall-clock values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatetimeData {
    /// Timestamps (`None` is missing)
    pub values: Vec<Option<NaiveDateTime>>,

    /// Timezone, if the column is timezone-aware
    pub tz: Option<Timezone>,
}

impl DatetimeData {
    /// Naive wall-clock datetimes
    pub fn naive(values: Vec<Option<NaiveDateTime>>) -> Self {
        Self { values, tz: None }
    }

    /// Timezone-aware datetimes stored as UTC instants
    pub fn with_tz(values: Vec<Option<NaiveDateTime>>, tz: impl Into<Timezone>) -> Self {
        Self {
            values,
            tz: Some(tz.into()),
        }
    }

    /// Local wall-clock value at `row`
    ///
    /// The offset is resolved per value, so named zones follow daylight saving.
    pub fn local(&self, row: usize) -> Option<NaiveDateTime> {
        let utc = self.values.get(row).copied().flatten()?;
        match &self.tz {
            Some(tz) => tz.to_local(&utc),
            None => Some(utc),
        }
    }
}

/// Column-major typed storage
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "values", rename_all = "lowercase")]
pub enum ColumnData {
    /// 64-bit integers
    Integer(Vec<Option<i64>>),

    /// 64-bit floats
    Float(Vec<Option<f64>>),

    /// Text
    String(Vec<Option<String>>),

    /// Booleans
    Boolean(Vec<Option<bool>>),

    /// Timestamps
    Datetime(DatetimeData),
}

impl ColumnData {
    /// Number of rows
    pub fn len(&self) -> usize {
        match self {
            Self::Integer(v) => v.len(),
            Self::Float(v) => v.len(),
            Self::String(v) => v.len(),
            Self::Boolean(v) => v.len(),
            Self::Datetime(d) => d.values.len(),
        }
    }

    /// Whether the column has no rows
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Semantic type of this storage
    pub fn dtype(&self) -> ColumnType {
        match self {
            Self::Integer(_) => ColumnType::Integer,
            Self::Float(_) => ColumnType::Float,
            Self::String(_) => ColumnType::String,
            Self::Boolean(_) => ColumnType::Boolean,
            Self::Datetime(_) => ColumnType::Datetime,
        }
    }

    /// Value at `row` (datetimes in local wall-clock time)
    pub fn get(&self, row: usize) -> Value {
        match self {
            Self::Integer(v) => v.get(row).copied().flatten().map(Value::Int).into(),
            Self::Float(v) => match v.get(row).copied().flatten() {
                Some(f) if !f.is_nan() => Value::Float(f),
                _ => Value::Missing,
            },
            Self::String(v) => v.get(row).cloned().flatten().map(Value::Str).into(),
            Self::Boolean(v) => v.get(row).copied().flatten().map(Value::Bool).into(),
            Self::Datetime(d) => d.local(row).map(Value::Datetime).into(),
        }
    }

    /// Whether the value at `row` is missing
    pub fn is_missing(&self, row: usize) -> bool {
        self.get(row).is_missing()
    }

    /// Number of missing values
    pub fn missing_count(&self) -> usize {
        (0..self.len()).filter(|&row| self.is_missing(row)).count()
    }
}

/// A named column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    /// Column name (unique within a table)
    pub name: String,

    /// Column values
    pub data: ColumnData,
}

impl Column {
    /// Create a column from typed storage
    pub fn new(name: impl Into<String>, data: ColumnData) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    /// Integer column
    pub fn integer(name: impl Into<String>, values: Vec<Option<i64>>) -> Self {
        Self::new(name, ColumnData::Integer(values))
    }

    /// Float column; NaN entries are stored as missing
    pub fn float(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        let values = values
            .into_iter()
            .map(|v| v.filter(|f| !f.is_nan()))
            .collect();
        Self::new(name, ColumnData::Float(values))
    }

    /// String column
    pub fn string<S: Into<String>>(name: impl Into<String>, values: Vec<Option<S>>) -> Self {
        let values = values.into_iter().map(|v| v.map(Into::into)).collect();
        Self::new(name, ColumnData::String(values))
    }

    /// Boolean column
    pub fn boolean(name: impl Into<String>, values: Vec<Option<bool>>) -> Self {
        Self::new(name, ColumnData::Boolean(values))
    }

    /// Naive datetime column
    pub fn datetime(name: impl Into<String>, values: Vec<Option<NaiveDateTime>>) -> Self {
        Self::new(name, ColumnData::Datetime(DatetimeData::naive(values)))
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the column has no rows
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Semantic type
    pub fn dtype(&self) -> ColumnType {
        self.data.dtype()
    }

    /// Value at `row`
    pub fn get(&self, row: usize) -> Value {
        self.data.get(row)
    }

    /// All values in row order
    pub fn values(&self) -> Vec<Value> {
        (0..self.len()).map(|row| self.get(row)).collect()
    }

    /// Replace the storage, keeping the name
    pub fn with_data(&self, data: ColumnData) -> Self {
        Self {
            name: self.name.clone(),
            data,
        }
    }
}

/// Row index
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "values", rename_all = "lowercase")]
pub enum RowIndex {
    /// Zero-based positions `0..n`
    Range(usize),

    /// Integer labels
    Integer(Vec<i64>),

    /// String labels
    Labels(Vec<String>),
}

impl RowIndex {
    /// Number of entries
    pub fn len(&self) -> usize {
        match self {
            Self::Range(n) => *n,
            Self::Integer(v) => v.len(),
            Self::Labels(v) => v.len(),
        }
    }

    /// Whether the index is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Label of `row` as text
    pub fn label(&self, row: usize) -> String {
        match self {
            Self::Range(_) => row.to_string(),
            Self::Integer(v) => v.get(row).map(|i| i.to_string()).unwrap_or_default(),
            Self::Labels(v) => v.get(row).cloned().unwrap_or_default(),
        }
    }

    /// All labels as text
    pub fn labels(&self) -> Vec<String> {
        (0..self.len()).map(|row| self.label(row)).collect()
    }
}

/// Errors raised when building a table
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum TableError {
    #[error("Column '{column}' has {actual} rows, expected {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },

    #[error("Duplicate column name: {0}")]
    DuplicateColumn(String),

    #[error("Index has {actual} entries, expected {expected}")]
    IndexLength { expected: usize, actual: usize },
}

/// An ordered collection of named, equally long columns with a row index
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    columns: Vec<Column>,
    index: RowIndex,
}

impl Table {
    /// Build a table, validating column names and lengths against the index
    pub fn new(columns: Vec<Column>, index: RowIndex) -> Result<Self, TableError> {
        let expected = index.len();
        let mut seen = HashSet::new();

        for column in &columns {
            if !seen.insert(column.name.as_str()) {
                return Err(TableError::DuplicateColumn(column.name.clone()));
            }
            if column.len() != expected {
                return Err(TableError::LengthMismatch {
                    column: column.name.clone(),
                    expected,
                    actual: column.len(),
                });
            }
        }

        Ok(Self { columns, index })
    }

    /// Build a table with a positional index sized by the first column
    pub fn from_columns(columns: Vec<Column>) -> Result<Self, TableError> {
        let rows = columns.first().map(Column::len).unwrap_or(0);
        Self::new(columns, RowIndex::Range(rows))
    }

    /// Empty table
    pub fn empty() -> Self {
        Self {
            columns: Vec::new(),
            index: RowIndex::Range(0),
        }
    }

    /// Number of rows
    pub fn n_rows(&self) -> usize {
        self.index.len()
    }

    /// Number of columns
    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    /// `(rows, columns)`
    pub fn shape(&self) -> (usize, usize) {
        (self.n_rows(), self.n_cols())
    }

    /// Columns in order
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Row index
    pub fn index(&self) -> &RowIndex {
        &self.index
    }

    /// Find a column by name
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Get column names
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Copy of this table with a different index of the same length
    pub fn with_index(&self, index: RowIndex) -> Result<Self, TableError> {
        if index.len() != self.n_rows() {
            return Err(TableError::IndexLength {
                expected: self.n_rows(),
                actual: index.len(),
            });
        }
        Ok(Self {
            columns: self.columns.clone(),
            index,
        })
    }

    /// Copy of this table with `f` applied to every column
    ///
    /// `f` must preserve column lengths and names.
    pub fn map_columns<F>(&self, mut f: F) -> Self
    where
        F: FnMut(&Column) -> Column,
    {
        let columns = self
            .columns
            .iter()
            .map(|c| {
                let mapped = f(c);
                debug_assert_eq!(mapped.len(), c.len());
                mapped
            })
            .collect();
        Self {
            columns,
            index: self.index.clone(),
        }
    }

    /// Copy of this table with the named column replaced or appended
    pub fn with_column(&self, column: Column) -> Result<Self, TableError> {
        let actual = column.len();
        if actual != self.n_rows() {
            return Err(TableError::LengthMismatch {
                column: column.name,
                expected: self.n_rows(),
                actual,
            });
        }
        let mut columns = self.columns.clone();
        match columns.iter_mut().find(|c| c.name == column.name) {
            Some(existing) => *existing = column,
            None => columns.push(column),
        }
        Ok(Self {
            columns,
            index: self.index.clone(),
        })
    }
}

impl Default for Table {
    fn default() -> Self {
        Self::empty()
    }
}
