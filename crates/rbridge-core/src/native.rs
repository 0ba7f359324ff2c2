//! Native structures produced by converting foreign values

use crate::foreign::ForeignValue;
use crate::table::Table;
use crate::value::Value;
use serde::Serialize;

/// Ordered mapping with unique keys
///
/// Keys keep their first insertion position; inserting an existing key
/// replaces its value in place.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NativeMap {
    entries: Vec<(String, NativeValue)>,
}

impl NativeMap {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, returning the previous one for this key
    pub fn insert(&mut self, key: impl Into<String>, value: NativeValue) -> Option<NativeValue> {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => Some(std::mem::replace(existing, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Look up a key
    pub fn get(&self, key: &str) -> Option<&NativeValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Remove a key, returning its value
    pub fn remove(&mut self, key: &str) -> Option<NativeValue> {
        let pos = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(pos).1)
    }

    /// Keys in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &NativeValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl IntoIterator for NativeMap {
    type Item = (String, NativeValue);
    type IntoIter = std::vec::IntoIter<(String, NativeValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl Serialize for NativeMap {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// A converted value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum NativeValue {
    /// Named container
    Map(NativeMap),

    /// Unnamed container or vector
    Seq(Vec<NativeValue>),

    /// Data frame
    Table(Table),

    /// Single value
    Scalar(Value),

    /// A foreign value that could not be converted, passed through unchanged
    Foreign(ForeignValue),
}

impl NativeValue {
    /// Borrow as a map
    pub fn as_map(&self) -> Option<&NativeMap> {
        match self {
            Self::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Borrow as a sequence
    pub fn as_seq(&self) -> Option<&[NativeValue]> {
        match self {
            Self::Seq(s) => Some(s),
            _ => None,
        }
    }

    /// Borrow as a table
    pub fn as_table(&self) -> Option<&Table> {
        match self {
            Self::Table(t) => Some(t),
            _ => None,
        }
    }

    /// Borrow as a scalar
    pub fn as_scalar(&self) -> Option<&Value> {
        match self {
            Self::Scalar(v) => Some(v),
            _ => None,
        }
    }

    /// Take the table out of this value
    pub fn into_table(self) -> Option<Table> {
        match self {
            Self::Table(t) => Some(t),
            _ => None,
        }
    }

    /// Whether this is the pass-through variant
    pub fn is_foreign(&self) -> bool {
        matches!(self, Self::Foreign(_))
    }

    /// Look up a key when this is a map
    pub fn get(&self, key: &str) -> Option<&NativeValue> {
        self.as_map().and_then(|m| m.get(key))
    }

    /// Length of a map, sequence or table; 1 for scalars
    pub fn len(&self) -> usize {
        match self {
            Self::Map(m) => m.len(),
            Self::Seq(s) => s.len(),
            Self::Table(t) => t.n_rows(),
            Self::Scalar(_) | Self::Foreign(_) => 1,
        }
    }

    /// Whether a container holds no entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
