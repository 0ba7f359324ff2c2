//! Raw values as returned by the foreign (R) runtime
//!
//! These types mirror the shapes the foreign runtime hands back before any
//! conversion: named lists, atomic vectors, data frames and opaque objects.
//! They serialize with an internally tagged `type` field, which is also the
//! wire format spoken by the Rscript driver.

use serde::{Deserialize, Serialize};

/// The foreign runtime's missing-integer sentinel
pub const NA_INTEGER: i32 = i32::MIN;

/// Atomic vector payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "values", rename_all = "lowercase")]
pub enum VectorData {
    /// Integer vector; missing entries hold [`NA_INTEGER`]
    Integer(Vec<i32>),

    /// Double vector
    Double(Vec<Option<f64>>),

    /// Logical vector
    Logical(Vec<Option<bool>>),

    /// Character vector
    Character(Vec<Option<String>>),
}

impl VectorData {
    /// Number of elements
    pub fn len(&self) -> usize {
        match self {
            Self::Integer(v) => v.len(),
            Self::Double(v) => v.len(),
            Self::Logical(v) => v.len(),
            Self::Character(v) => v.len(),
        }
    }

    /// Whether the vector is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Short type name as the foreign runtime reports it
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Integer(_) => "integer",
            Self::Double(_) => "double",
            Self::Logical(_) => "logical",
            Self::Character(_) => "character",
        }
    }
}

/// Single foreign scalar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum ForeignScalar {
    Integer(i32),
    Double(f64),
    Logical(bool),
    Character(String),
}

/// Atomic vector with optional parallel names
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForeignVector {
    /// Elements
    pub data: VectorData,

    /// Element names, parallel to `data`
    #[serde(default)]
    pub names: Option<Vec<Option<String>>>,
}

impl ForeignVector {
    /// Unnamed vector
    pub fn new(data: VectorData) -> Self {
        Self { data, names: None }
    }

    /// Named vector
    pub fn named(data: VectorData, names: Vec<Option<String>>) -> Self {
        Self {
            data,
            names: Some(names),
        }
    }
}

/// Generic (possibly named) list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedList {
    /// Entry names, parallel to `values`; `None` when the list has no names
    #[serde(default)]
    pub names: Option<Vec<Option<String>>>,

    /// Entries
    pub values: Vec<ForeignValue>,
}

impl NamedList {
    /// Unnamed list
    pub fn unnamed(values: Vec<ForeignValue>) -> Self {
        Self {
            names: None,
            values,
        }
    }

    /// Named list from `(name, value)` pairs
    pub fn from_pairs<K: Into<String>>(pairs: Vec<(K, ForeignValue)>) -> Self {
        let (names, values) = pairs
            .into_iter()
            .map(|(k, v)| (Some(k.into()), v))
            .unzip();
        Self {
            names: Some(names),
            values,
        }
    }
}

/// A data frame column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForeignColumn {
    /// Column name
    pub name: String,

    /// Column values
    pub data: VectorData,

    /// Class attribute (`Date`, `POSIXct`, `factor`, ...)
    #[serde(default)]
    pub class: Vec<String>,

    /// `tzone` attribute of date-time columns
    #[serde(default)]
    pub tzone: Option<String>,

    /// Levels of factor columns
    #[serde(default)]
    pub levels: Option<Vec<String>>,
}

impl ForeignColumn {
    /// Plain column without class attributes
    pub fn new(name: impl Into<String>, data: VectorData) -> Self {
        Self {
            name: name.into(),
            data,
            class: Vec::new(),
            tzone: None,
            levels: None,
        }
    }

    /// Set the class attribute
    pub fn with_class(mut self, class: &[&str]) -> Self {
        self.class = class.iter().map(|c| c.to_string()).collect();
        self
    }

    /// Set the timezone attribute
    pub fn with_tzone(mut self, tzone: impl Into<String>) -> Self {
        self.tzone = Some(tzone.into());
        self
    }

    /// Set factor levels
    pub fn with_levels(mut self, levels: Vec<String>) -> Self {
        self.levels = Some(levels);
        self
    }

    /// Check the class attribute
    pub fn inherits(&self, class: &str) -> bool {
        self.class.iter().any(|c| c == class)
    }
}

/// A data frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForeignTable {
    /// Columns in order
    pub columns: Vec<ForeignColumn>,

    /// Row names (the foreign runtime's default is `"1".."n"`)
    #[serde(default)]
    pub row_names: Option<Vec<String>>,
}

impl ForeignTable {
    /// Data frame with default row names `"1".."n"`
    pub fn new(columns: Vec<ForeignColumn>) -> Self {
        let rows = columns.first().map(|c| c.data.len()).unwrap_or(0);
        Self {
            columns,
            row_names: Some((1..=rows).map(|i| i.to_string()).collect()),
        }
    }

    /// Number of rows according to the first column
    pub fn n_rows(&self) -> usize {
        self.columns.first().map(|c| c.data.len()).unwrap_or(0)
    }
}

/// Any value returned by the foreign runtime
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ForeignValue {
    /// NULL
    Null,

    /// Length-one value
    Scalar { value: ForeignScalar },

    /// Atomic vector
    Vector(ForeignVector),

    /// Generic list (named or not)
    List(NamedList),

    /// Data frame
    DataFrame(ForeignTable),

    /// Anything else (functions, environments, S4 objects)
    Opaque { class: Vec<String>, repr: String },
}

impl ForeignValue {
    /// Short description of the value's shape
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "NULL",
            Self::Scalar { .. } => "scalar",
            Self::Vector(_) => "vector",
            Self::List(_) => "list",
            Self::DataFrame(_) => "data.frame",
            Self::Opaque { .. } => "opaque",
        }
    }
}

impl From<&str> for ForeignValue {
    fn from(value: &str) -> Self {
        Self::Scalar {
            value: ForeignScalar::Character(value.to_string()),
        }
    }
}

impl From<String> for ForeignValue {
    fn from(value: String) -> Self {
        Self::Scalar {
            value: ForeignScalar::Character(value),
        }
    }
}

impl From<i32> for ForeignValue {
    fn from(value: i32) -> Self {
        Self::Scalar {
            value: ForeignScalar::Integer(value),
        }
    }
}

impl From<f64> for ForeignValue {
    fn from(value: f64) -> Self {
        Self::Scalar {
            value: ForeignScalar::Double(value),
        }
    }
}

impl From<bool> for ForeignValue {
    fn from(value: bool) -> Self {
        Self::Scalar {
            value: ForeignScalar::Logical(value),
        }
    }
}

impl From<Vec<String>> for ForeignValue {
    fn from(values: Vec<String>) -> Self {
        Self::Vector(ForeignVector::new(VectorData::Character(
            values.into_iter().map(Some).collect(),
        )))
    }
}

impl From<Vec<f64>> for ForeignValue {
    fn from(values: Vec<f64>) -> Self {
        Self::Vector(ForeignVector::new(VectorData::Double(
            values.into_iter().map(Some).collect(),
        )))
    }
}

impl From<Vec<i32>> for ForeignValue {
    fn from(values: Vec<i32>) -> Self {
        Self::Vector(ForeignVector::new(VectorData::Integer(values)))
    }
}

impl From<ForeignTable> for ForeignValue {
    fn from(table: ForeignTable) -> Self {
        Self::DataFrame(table)
    }
}
