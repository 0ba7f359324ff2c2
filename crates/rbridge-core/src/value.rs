//! Scalar cell values shared by tables, native values and diff reports

use chrono::NaiveDateTime;
use serde::Serialize;

/// Format used when a datetime is rendered as text
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Format used when a datetime falls exactly on midnight
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A single scalar value
///
/// `Missing` is the one missing-value marker used across the workspace.
/// Floating point NaN is treated as missing by [`Value::is_missing`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// Missing value
    Missing,

    /// Boolean value
    Bool(bool),

    /// Integer value
    Int(i64),

    /// Floating point value
    Float(f64),

    /// Text value
    Str(String),

    /// Naive (wall-clock) datetime
    Datetime(NaiveDateTime),
}

impl Value {
    /// Check whether this value is missing (including NaN)
    pub fn is_missing(&self) -> bool {
        match self {
            Self::Missing => true,
            Self::Float(f) => f.is_nan(),
            _ => false,
        }
    }

    /// Numeric view of this value, if it has one
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) if !f.is_nan() => Some(*f),
            _ => None,
        }
    }

    /// Text rendering used for textual comparison
    ///
    /// Returns `None` for missing values.
    pub fn render(&self) -> Option<String> {
        match self {
            Self::Missing => None,
            Self::Float(f) if f.is_nan() => None,
            Self::Bool(b) => Some(if *b { "True".to_string() } else { "False".to_string() }),
            Self::Int(i) => Some(i.to_string()),
            Self::Float(f) => Some(f.to_string()),
            Self::Str(s) => Some(s.clone()),
            Self::Datetime(dt) => Some(render_datetime(dt)),
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.render() {
            Some(text) => write!(f, "{}", text),
            None => write!(f, "<NA>"),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(value: NaiveDateTime) -> Self {
        Self::Datetime(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Self::Missing)
    }
}

/// Render a datetime as a date when it sits on midnight, full timestamp otherwise
pub fn render_datetime(dt: &NaiveDateTime) -> String {
    if dt.time() == chrono::NaiveTime::MIN {
        dt.format(DATE_FORMAT).to_string()
    } else {
        dt.format(DATETIME_FORMAT).to_string()
    }
}
