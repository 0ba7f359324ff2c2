//! Call arguments

use rbridge_convert::ToForeign;
use rbridge_core::ForeignValue;
use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Serialize, Serializer};

/// Positional and named arguments for one foreign call
///
/// ```rust,ignore
/// let args = CallArgs::new().arg("6236-001").named("assay", "all");
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallArgs {
    pub positional: Vec<ForeignValue>,
    pub named: Vec<(String, ForeignValue)>,
}

impl CallArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a positional argument
    pub fn arg(mut self, value: impl Into<ForeignValue>) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Set a named argument, replacing an earlier one with the same name
    pub fn named(mut self, name: impl Into<String>, value: impl Into<ForeignValue>) -> Self {
        let name = name.into();
        let value = value.into();
        match self.named.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = value,
            None => self.named.push((name, value)),
        }
        self
    }

    /// Append a native value (table, scalar, map) as a positional argument
    pub fn native_arg<T: ToForeign + ?Sized>(self, value: &T) -> Self {
        self.arg(value.to_foreign())
    }

    /// Set a native value as a named argument
    pub fn native_named<T: ToForeign + ?Sized>(self, name: impl Into<String>, value: &T) -> Self {
        self.named(name, value.to_foreign())
    }

    /// Look up a named argument
    pub fn get_named(&self, name: &str) -> Option<&ForeignValue> {
        self.named.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.positional.len() + self.named.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

struct NamedArgs<'a>(&'a [(String, ForeignValue)]);

impl Serialize for NamedArgs<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

// Named arguments go out as an object so the driver sees a named list.
impl Serialize for CallArgs {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("CallArgs", 2)?;
        state.serialize_field("positional", &self.positional)?;
        state.serialize_field("named", &NamedArgs(&self.named))?;
        state.end()
    }
}
