//! Dynamic property values.
//!
//! A [`Value`] is whatever a property slot may hold: scalars, containers, and
//! the array-like types from [`crate::array`] and [`crate::column`].
//! Sequence payloads are reference-counted so that cloning a value hands out
//! the same instance, which [`Value::same_instance`] can observe.

use std::sync::Arc;

use indexmap::IndexMap;
use serde::Serialize;

use crate::array::{NdArray, int_eq_float};
use crate::column::{Column, RowIndex};

/// String-keyed, insertion-ordered mapping.
pub type ValueMap = IndexMap<String, Value>;

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    /// Ordered, list-like sequence.
    Seq(Arc<[Value]>),
    /// Fixed, tuple-like sequence.
    Tuple(Arc<[Value]>),
    Map(ValueMap),
    Array(NdArray),
    Column(Column),
    Index(RowIndex),
}

/// Coarse classification of a [`Value`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Null,
    Bool,
    Int,
    Float,
    Str,
    Seq,
    Tuple,
    Map,
    Array,
    Column,
    Index,
}

impl ValueKind {
    pub fn name(self) -> &'static str {
        match self {
            ValueKind::Null => "null",
            ValueKind::Bool => "bool",
            ValueKind::Int => "int",
            ValueKind::Float => "float",
            ValueKind::Str => "str",
            ValueKind::Seq => "list",
            ValueKind::Tuple => "tuple",
            ValueKind::Map => "dict",
            ValueKind::Array => "ndarray",
            ValueKind::Column => "column",
            ValueKind::Index => "index",
        }
    }
}

impl core::fmt::Display for ValueKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

impl Value {
    pub fn seq(items: impl IntoIterator<Item = Value>) -> Self {
        Value::Seq(items.into_iter().collect())
    }

    pub fn tuple(items: impl IntoIterator<Item = Value>) -> Self {
        Value::Tuple(items.into_iter().collect())
    }

    pub fn map<K: Into<String>>(entries: impl IntoIterator<Item = (K, Value)>) -> Self {
        Value::Map(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// `[start, start + 1, ..., stop - 1]` as a plain sequence of ints.
    pub fn int_range(start: i64, stop: i64) -> Self {
        Value::seq((start..stop).map(Value::Int))
    }

    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Bool,
            Value::Int(_) => ValueKind::Int,
            Value::Float(_) => ValueKind::Float,
            Value::Str(_) => ValueKind::Str,
            Value::Seq(_) => ValueKind::Seq,
            Value::Tuple(_) => ValueKind::Tuple,
            Value::Map(_) => ValueKind::Map,
            Value::Array(_) => ValueKind::Array,
            Value::Column(_) => ValueKind::Column,
            Value::Index(_) => ValueKind::Index,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Arrays, columns and row indexes.
    pub fn is_array_like(&self) -> bool {
        matches!(self, Value::Array(_) | Value::Column(_) | Value::Index(_))
    }

    pub fn as_map(&self) -> Option<&ValueMap> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Items of a `Seq` or `Tuple`.
    pub fn as_items(&self) -> Option<&[Value]> {
        match self {
            Value::Seq(items) | Value::Tuple(items) => Some(&**items),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(n) => Some(*n as f64),
            Value::Float(x) => Some(*x),
            _ => None,
        }
    }

    fn as_int(&self) -> Option<i64> {
        match self {
            Value::Bool(b) => Some(i64::from(*b)),
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Numeric equality across `Bool`, `Int` and `Float`, with booleans as 0
    /// and 1 the way array elements compare. Int/float pairs compare exactly.
    ///
    /// `None` unless both sides are numbers.
    pub fn numeric_eq(&self, other: &Value) -> Option<bool> {
        match (self, other) {
            (Value::Float(x), Value::Float(y)) => Some(x == y),
            (Value::Float(x), n) | (n, Value::Float(x)) => Some(int_eq_float(n.as_int()?, *x)),
            _ => Some(self.as_int()? == other.as_int()?),
        }
    }

    /// Whether `self` and `other` are the same instance.
    ///
    /// True for the same reference, and for sequences sharing one allocation
    /// (clones of each other).
    pub fn same_instance(&self, other: &Value) -> bool {
        if core::ptr::eq(self, other) {
            return true;
        }
        match (self, other) {
            (Value::Seq(a), Value::Seq(b)) | (Value::Tuple(a), Value::Tuple(b)) => {
                Arc::ptr_eq(a, b)
            }
            _ => false,
        }
    }

    /// Shape of [`Value::to_array`], computed without building the array.
    ///
    /// `None` exactly when there is no array form, except that a sequence
    /// mixing strings and numbers still reports a shape.
    pub fn array_shape(&self) -> Option<Vec<usize>> {
        match self {
            Value::Null | Value::Map(_) => None,
            Value::Bool(_) | Value::Int(_) | Value::Float(_) | Value::Str(_) => Some(Vec::new()),
            Value::Seq(items) | Value::Tuple(items) => {
                let mut inner = Vec::new();
                for (i, item) in items.iter().enumerate() {
                    let shape = item.array_shape()?;
                    if i == 0 {
                        inner = shape;
                    } else if shape != inner {
                        return None;
                    }
                }
                let mut shape = Vec::with_capacity(inner.len() + 1);
                shape.push(items.len());
                shape.extend(inner);
                Some(shape)
            }
            Value::Array(a) => Some(a.shape().to_vec()),
            Value::Column(c) => Some(c.values().shape().to_vec()),
            Value::Index(idx) => Some(vec![idx.len()]),
        }
    }

    /// Coerce to an array, the way array-aware comparison sees the value.
    ///
    /// Scalars become 0-d arrays, columns yield their values, indexes their
    /// labels, and rectangular nested sequences of scalars stack into n-d
    /// arrays. `Null`, mappings, ragged or mixed string/number sequences have no
    /// array form.
    pub fn to_array(&self) -> Option<NdArray> {
        match self {
            Value::Null | Value::Map(_) => None,
            Value::Bool(b) => Some(NdArray::scalar_bool(*b)),
            Value::Int(n) => Some(NdArray::scalar_int(*n)),
            Value::Float(x) => Some(NdArray::scalar_float(*x)),
            Value::Str(s) => Some(NdArray::scalar_str(s.clone())),
            Value::Seq(items) | Value::Tuple(items) => {
                let parts = items
                    .iter()
                    .map(Value::to_array)
                    .collect::<Option<Vec<_>>>()?;
                NdArray::stack(&parts)
            }
            Value::Array(a) => Some(a.clone()),
            Value::Column(c) => Some(c.values().clone()),
            Value::Index(idx) => Some(idx.to_array()),
        }
    }
}

impl core::fmt::Display for Value {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Value::Null => f.write_str("None"),
            Value::Bool(true) => f.write_str("True"),
            Value::Bool(false) => f.write_str("False"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(x) => write!(f, "{x:?}"),
            Value::Str(s) => f.write_str(s),
            Value::Seq(items) => {
                f.write_str("[")?;
                write_items(f, items)?;
                f.write_str("]")
            }
            Value::Tuple(items) => {
                f.write_str("(")?;
                write_items(f, items)?;
                if items.len() == 1 {
                    f.write_str(",")?;
                }
                f.write_str(")")
            }
            Value::Map(map) => {
                f.write_str("{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "'{k}': {v}")?;
                }
                f.write_str("}")
            }
            Value::Array(a) => write!(f, "{a}"),
            Value::Column(c) => match c.name() {
                Some(name) => write!(f, "Column({name}, {})", c.values()),
                None => write!(f, "Column({})", c.values()),
            },
            Value::Index(idx) => match idx {
                RowIndex::Range { start, stop, step } => {
                    write!(f, "RangeIndex(start={start}, stop={stop}, step={step})")
                }
                RowIndex::Labels(labels) => write!(f, "Index({labels})"),
            },
        }
    }
}

fn write_items(f: &mut core::fmt::Formatter<'_>, items: &[Value]) -> core::fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        match item {
            Value::Str(s) => write!(f, "'{s}'")?,
            other => write!(f, "{other}")?,
        }
    }
    Ok(())
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(i64::from(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<NdArray> for Value {
    fn from(value: NdArray) -> Self {
        Value::Array(value)
    }
}

impl From<Column> for Value {
    fn from(value: Column) -> Self {
        Value::Column(value)
    }
}

impl From<RowIndex> for Value {
    fn from(value: RowIndex) -> Self {
        Value::Index(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => n.as_f64().map(Value::Float).unwrap_or(Value::Null),
            },
            serde_json::Value::String(s) => Value::Str(s),
            serde_json::Value::Array(items) => Value::seq(items.into_iter().map(Value::from)),
            serde_json::Value::Object(entries) => {
                Value::map(entries.into_iter().map(|(k, v)| (k, Value::from(v))))
            }
        }
    }
}
