//! Recursive foreign → native conversion

use crate::frame::{FrameConverter, TableConverter};
use rbridge_core::{
    ForeignScalar, ForeignValue, ForeignVector, NamedList, NativeMap, NativeValue, Value,
    VectorData,
};

/// Converts foreign values into native structures
///
/// Data frames go through the injected [`TableConverter`]; when it fails the
/// original foreign value is handed back as [`NativeValue::Foreign`].
#[derive(Debug, Clone, Default)]
pub struct ValueConverter<C = FrameConverter> {
    tables: C,
}

impl ValueConverter<FrameConverter> {
    /// Converter using the default data frame conversion
    pub fn new() -> Self {
        Self {
            tables: FrameConverter::new(),
        }
    }
}

impl<C: TableConverter> ValueConverter<C> {
    /// Converter using a custom data frame conversion
    pub fn with_table_converter(tables: C) -> Self {
        Self { tables }
    }

    /// Convert a foreign value
    pub fn convert(&self, value: ForeignValue) -> NativeValue {
        match value {
            ForeignValue::List(list) => self.convert_list(list),
            ForeignValue::Vector(vector) => convert_vector(vector),
            ForeignValue::Scalar { value } => NativeValue::Scalar(scalar_value(value)),
            ForeignValue::DataFrame(frame) => match self.tables.to_table(&frame) {
                Ok(table) => NativeValue::Table(table),
                Err(e) => {
                    tracing::warn!("Data frame conversion failed, passing through: {}", e);
                    NativeValue::Foreign(ForeignValue::DataFrame(frame))
                }
            },
            other @ (ForeignValue::Null | ForeignValue::Opaque { .. }) => {
                NativeValue::Foreign(other)
            }
        }
    }

    fn convert_list(&self, list: NamedList) -> NativeValue {
        match list.names {
            Some(names) => {
                let mut map = NativeMap::new();
                for (name, value) in names.into_iter().zip(list.values) {
                    // Unnamed entries have no key to live under and are dropped.
                    if let Some(name) = usable_name(name) {
                        map.insert(name, self.convert(value));
                    }
                }
                NativeValue::Map(map)
            }
            None => NativeValue::Seq(list.values.into_iter().map(|v| self.convert(v)).collect()),
        }
    }
}

fn convert_vector(vector: ForeignVector) -> NativeValue {
    let values = vector_values(vector.data);
    match vector.names {
        Some(names) => {
            let mut map = NativeMap::new();
            for (name, value) in names.into_iter().zip(values) {
                if let Some(name) = usable_name(name) {
                    map.insert(name, NativeValue::Scalar(value));
                }
            }
            NativeValue::Map(map)
        }
        None => NativeValue::Seq(values.into_iter().map(NativeValue::Scalar).collect()),
    }
}

fn usable_name(name: Option<String>) -> Option<String> {
    name.filter(|n| !n.is_empty())
}

/// Elements of an atomic vector as native values
///
/// Integer elements are kept as-is, sentinel included.
pub fn vector_values(data: VectorData) -> Vec<Value> {
    match data {
        VectorData::Integer(v) => v.into_iter().map(|i| Value::Int(i64::from(i))).collect(),
        VectorData::Double(v) => v.into_iter().map(Value::from).collect(),
        VectorData::Logical(v) => v.into_iter().map(Value::from).collect(),
        VectorData::Character(v) => v.into_iter().map(Value::from).collect(),
    }
}

fn scalar_value(scalar: ForeignScalar) -> Value {
    match scalar {
        ForeignScalar::Integer(i) => Value::Int(i64::from(i)),
        ForeignScalar::Double(f) => Value::Float(f),
        ForeignScalar::Logical(b) => Value::Bool(b),
        ForeignScalar::Character(s) => Value::Str(s),
    }
}
